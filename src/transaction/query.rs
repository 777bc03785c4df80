//! Filtering and sorting transactions for the transaction listing.

use rusqlite::{Connection, ToSql, params_from_iter};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    direction::Direction,
    money::to_cents,
    timestamp::Timestamp,
    transaction::{
        Transaction,
        core::{SELECT_TRANSACTION, map_transaction_row},
    },
};

/// The field to sort transactions by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Sort by when the transaction happened.
    #[default]
    Timestamp,
    /// Sort by the amount of money.
    Amount,
    /// Sort by category name.
    Category,
    /// Sort by direction, "Expenditure" before "Income" in ascending order.
    Direction,
    /// Sort by the order transactions were created in.
    Id,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::Timestamp => "t.timestamp",
            SortField::Amount => "t.amount",
            SortField::Category => "c.name",
            SortField::Direction => "t.direction",
            SortField::Id => "t.id",
        }
    }
}

fn default_reverse() -> bool {
    true
}

/// Filters and sort order for listing transactions.
///
/// Every filter that is set must match. Amount and date bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionQuery {
    /// Only include transactions in the category with exactly this name.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Only include income or only expenditure.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// The smallest amount to include.
    #[serde(default)]
    pub min_amount: Option<Decimal>,
    /// The largest amount to include.
    #[serde(default)]
    pub max_amount: Option<Decimal>,
    /// The earliest timestamp to include.
    #[serde(default)]
    pub start: Option<Timestamp>,
    /// The latest timestamp to include.
    #[serde(default)]
    pub end: Option<Timestamp>,
    /// Only include transactions whose note contains this text, ignoring case.
    #[serde(default)]
    pub note_keyword: Option<String>,
    /// The field to sort by.
    #[serde(default)]
    pub sort_by: SortField,
    /// Sort in descending order when true.
    #[serde(default = "default_reverse")]
    pub reverse: bool,
    /// The maximum number of transactions to return.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            category_name: None,
            direction: None,
            min_amount: None,
            max_amount: None,
            start: None,
            end: None,
            note_keyword: None,
            sort_by: SortField::default(),
            reverse: default_reverse(),
            limit: None,
        }
    }
}

impl TransactionQuery {
    /// Check that the bounds of the query are consistent.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmountRange] if the minimum amount is greater
    /// than the maximum amount, or an [Error::InvalidDateRange] if the start is
    /// after the end.
    pub fn validate(&self) -> Result<(), Error> {
        match (self.min_amount, self.max_amount) {
            (Some(min), Some(max)) if min > max => {
                return Err(Error::InvalidAmountRange { min, max });
            }
            _ => {}
        }

        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(Error::InvalidDateRange { start, end }),
            _ => Ok(()),
        }
    }
}

/// Get the transactions matching `query`, sorted by `query.sort_by` and then
/// by ID in the same direction.
///
/// # Errors
///
/// Returns the validation errors of [TransactionQuery::validate], an
/// [Error::AmountOutOfRange] if an amount bound is too large, or an
/// [Error::SqlError] if the query fails.
pub fn get_filtered_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query.validate()?;

    let mut conditions: Vec<&str> = Vec::new();
    let mut parameters: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(category_name) = &query.category_name {
        conditions.push("c.name = ?");
        parameters.push(Box::new(category_name.trim().to_owned()));
    }

    if let Some(direction) = query.direction {
        conditions.push("t.direction = ?");
        parameters.push(Box::new(direction));
    }

    if let Some(min_amount) = query.min_amount {
        conditions.push("t.amount >= ?");
        parameters.push(Box::new(bound_to_cents(min_amount)?));
    }

    if let Some(max_amount) = query.max_amount {
        conditions.push("t.amount <= ?");
        parameters.push(Box::new(bound_to_cents(max_amount)?));
    }

    if let Some(start) = query.start {
        conditions.push("t.timestamp >= ?");
        parameters.push(Box::new(start));
    }

    if let Some(end) = query.end {
        conditions.push("t.timestamp <= ?");
        parameters.push(Box::new(end));
    }

    if let Some(keyword) = &query.note_keyword {
        conditions.push("instr(lower(t.note), lower(?)) > 0");
        parameters.push(Box::new(keyword.to_owned()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let order = if query.reverse { "DESC" } else { "ASC" };
    let mut sql = format!(
        "{SELECT_TRANSACTION}{where_clause} ORDER BY {} {order}, t.id {order}",
        query.sort_by.column()
    );

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        parameters.push(Box::new(limit));
    }

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(parameters.iter()), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

fn bound_to_cents(value: Decimal) -> Result<i64, Error> {
    to_cents(value).ok_or(Error::AmountOutOfRange(value))
}
