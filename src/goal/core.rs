//! The financial goal: target income, expenditure and savings.

use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    money::{MONEY_DECIMAL_PLACES, to_cents},
};

/// Targets to compare actual income, expenditure and savings against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalConfig {
    /// The income to earn, at least zero.
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    /// The most that should be spent, at least zero.
    #[serde(with = "rust_decimal::serde::float")]
    pub expenditure: Decimal,
    /// The amount to save, may be negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_save: Decimal,
}

impl GoalConfig {
    /// Check the goal can be stored.
    ///
    /// # Errors
    ///
    /// Returns an:
    /// - [Error::NegativeGoal] if the income or expenditure goal is negative,
    /// - [Error::TooManyDecimalPlaces] if any target has fractional cents,
    /// - [Error::AmountOutOfRange] if any target is too large to store.
    pub fn validate(&self) -> Result<(), Error> {
        if self.income.is_sign_negative() && !self.income.is_zero() {
            return Err(Error::NegativeGoal("income"));
        }

        if self.expenditure.is_sign_negative() && !self.expenditure.is_zero() {
            return Err(Error::NegativeGoal("expenditure"));
        }

        for value in [self.income, self.expenditure, self.total_save] {
            if value.normalize().scale() > MONEY_DECIMAL_PLACES {
                return Err(Error::TooManyDecimalPlaces(value));
            }

            if to_cents(value).is_none() {
                return Err(Error::AmountOutOfRange(value));
            }
        }

        Ok(())
    }
}

/// Get the saved goal, or `None` if a goal has never been saved.
pub fn get_goal(connection: &Connection) -> Result<Option<GoalConfig>, Error> {
    connection
        .query_row(
            "SELECT income, expenditure, total_save FROM goal WHERE id = 1",
            [],
            |row| {
                Ok(GoalConfig {
                    income: cents_to_decimal(row.get(0)?),
                    expenditure: cents_to_decimal(row.get(1)?),
                    total_save: cents_to_decimal(row.get(2)?),
                })
            },
        )
        .optional()
        .map_err(|error| error.into())
}

/// Replace the saved goal with `goal`.
///
/// # Errors
///
/// Returns the errors from [GoalConfig::validate], or an [Error::SqlError] if
/// the goal could not be written.
pub fn save_goal(goal: GoalConfig, connection: &Connection) -> Result<GoalConfig, Error> {
    goal.validate()?;

    let cents = |value: Decimal| to_cents(value).ok_or(Error::AmountOutOfRange(value));

    connection.execute(
        "INSERT INTO goal (id, income, expenditure, total_save) VALUES (1, ?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
            income = excluded.income,
            expenditure = excluded.expenditure,
            total_save = excluded.total_save",
        (
            cents(goal.income)?,
            cents(goal.expenditure)?,
            cents(goal.total_save)?,
        ),
    )?;

    Ok(goal)
}

/// Initialize the goal table, which holds at most one row.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            income INTEGER NOT NULL,
            expenditure INTEGER NOT NULL,
            total_save INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_DECIMAL_PLACES).normalize()
}
