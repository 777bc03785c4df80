//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    category::{CategoryName, get_category_by_name},
    database_id::{CategoryId, TransactionId},
    direction::Direction,
    money::Amount,
    timestamp::{DateRange, Timestamp},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned, never negative.
    pub amount: Amount,
    /// Whether the money was earned or spent.
    pub direction: Direction,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The name of the category the transaction belongs to.
    pub category_name: CategoryName,
    /// A free text description of what the transaction was for.
    pub note: String,
    /// When the transaction happened.
    pub timestamp: Timestamp,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: Amount, category_name: &str) -> TransactionBuilder {
        TransactionBuilder {
            category_name: category_name.to_owned(),
            amount,
            direction: None,
            note: String::new(),
            timestamp: None,
        }
    }
}

/// A builder for creating or replacing [Transaction]s.
///
/// This is also the JSON body for creating and editing a transaction, the
/// optional fields may be left out of the request.
///
/// # Examples
///
/// ```ignore
/// use rust_decimal::Decimal;
///
/// use crate::{direction::Direction, money::Amount, transaction::Transaction};
///
/// let builder = Transaction::build(Amount::new(Decimal::new(4599, 2))?, "Food")
///     .direction(Direction::Expenditure)
///     .note("Lunch");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBuilder {
    /// The name of an existing category.
    pub category_name: String,

    /// The amount of money spent or earned.
    pub amount: Amount,

    /// Whether the money was earned or spent.
    ///
    /// Defaults to the default direction of the category.
    #[serde(default)]
    pub direction: Option<Direction>,

    /// A free text description of the transaction, may be empty.
    #[serde(default)]
    pub note: String,

    /// When the transaction happened.
    ///
    /// Defaults to the current time for new transactions and to the existing
    /// timestamp when editing a transaction.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl TransactionBuilder {
    /// Set the direction of the transaction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Set the note for the transaction.
    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_owned();
        self
    }

    /// Set when the transaction happened.
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownCategory] if there is no category named `builder.category_name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = get_category_by_name(builder.category_name.trim(), connection)?;
    let direction = builder.direction.unwrap_or(category.default_direction);
    let timestamp = builder.timestamp.unwrap_or_else(Timestamp::now);

    let id = connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, direction, category_id, note, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )?
        .query_row(
            (
                builder.amount.cents(),
                direction,
                category.id,
                &builder.note,
                timestamp,
            ),
            |row| row.get(0),
        )?;

    Ok(Transaction {
        id,
        amount: builder.amount,
        direction,
        category_id: category.id,
        category_name: category.name,
        note: builder.note,
        timestamp,
    })
}

/// Retrieve a transaction in the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let query = format!("{SELECT_TRANSACTION} WHERE t.id = :id");

    connection
        .prepare(&query)?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Replace the fields of the transaction `id` with those in `builder`.
///
/// The direction defaults to the category's default direction and the
/// timestamp to the transaction's current timestamp.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownCategory] if there is no category named `builder.category_name`,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = get_category_by_name(builder.category_name.trim(), connection)?;
    let direction = builder.direction.unwrap_or(category.default_direction);

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET amount = ?1, direction = ?2, category_id = ?3, note = ?4,
             timestamp = COALESCE(?5, timestamp)
         WHERE id = ?6",
        (
            builder.amount.cents(),
            direction,
            category.id,
            &builder.note,
            builder.timestamp,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    get_transaction(id, connection)
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the transactions with timestamps in `range`, including both ends.
///
/// Transactions are ordered by timestamp and then ID.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_transactions_in_range(
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = format!(
        "{SELECT_TRANSACTION} WHERE t.timestamp BETWEEN ?1 AND ?2 \
         ORDER BY t.timestamp ASC, t.id ASC"
    );

    connection
        .prepare(&query)?
        .query_map([range.start, range.end], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Initialize the transaction table and indexes.
///
/// The category table must be created first.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount INTEGER NOT NULL CHECK (amount >= 0),
            direction TEXT NOT NULL CHECK (direction IN ('Income', 'Expenditure')),
            category_id INTEGER NOT NULL,
            note TEXT NOT NULL DEFAULT '',
            timestamp TEXT NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_timestamp ON \"transaction\"(timestamp);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

/// The columns read by [map_transaction_row], in order.
pub(crate) const SELECT_TRANSACTION: &str =
    "SELECT t.id, t.amount, t.direction, t.category_id, c.name, t.note, t.timestamp \
     FROM \"transaction\" t INNER JOIN category c ON t.category_id = c.id";

/// Map a database row from [SELECT_TRANSACTION] to a Transaction.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category_name: String = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        amount: Amount::from_cents(row.get(1)?),
        direction: row.get(2)?,
        category_id: row.get(3)?,
        category_name: CategoryName::new_unchecked(&raw_category_name),
        note: row.get(5)?,
        timestamp: row.get(6)?,
    })
}
