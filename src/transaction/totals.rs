//! Totals of all stored transactions by direction.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, direction::Direction, money::Amount};

/// The sum of all income and all expenditure ever recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// The sum of all income.
    pub income: Amount,
    /// The sum of all expenditure.
    pub expenditure: Amount,
}

/// Sum the amounts of every transaction, grouped by direction.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the query fails.
pub fn get_totals(connection: &Connection) -> Result<Totals, Error> {
    let mut totals = Totals::default();

    let sums = connection
        .prepare("SELECT direction, SUM(amount) FROM \"transaction\" GROUP BY direction")?
        .query_map([], |row| {
            let direction: Direction = row.get(0)?;
            let cents: i64 = row.get(1)?;

            Ok((direction, cents))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (direction, cents) in sums {
        match direction {
            Direction::Income => totals.income = Amount::from_cents(cents),
            Direction::Expenditure => totals.expenditure = Amount::from_cents(cents),
        }
    }

    Ok(totals)
}
