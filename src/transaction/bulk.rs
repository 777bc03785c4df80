//! Deleting and editing many transactions at once.
//!
//! Each bulk operation runs in a single SQLite transaction, so either every
//! listed transaction is changed or none are.

use std::collections::BTreeSet;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error, category::get_category_by_name, database_id::TransactionId, direction::Direction,
    transaction::delete_transaction,
};

/// The request body for deleting several transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkDelete {
    /// The IDs of the transactions to delete.
    pub ids: Vec<TransactionId>,
}

/// The request body for editing several transactions.
///
/// Fields that are left out are not changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdate {
    /// The IDs of the transactions to edit.
    pub ids: Vec<TransactionId>,
    /// Move the transactions into the category with this name.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Set the direction of the transactions.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Replace the note of the transactions.
    #[serde(default)]
    pub note: Option<String>,
}

/// The number of transactions changed by a bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResult {
    /// How many transactions were deleted or edited.
    pub count: usize,
}

/// Delete every transaction in `ids`.
///
/// Duplicate IDs are only counted once.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingTransaction] if any ID does not refer to a
/// transaction, in which case no transactions are deleted.
pub fn bulk_delete_transactions(
    ids: &[TransactionId],
    connection: &mut Connection,
) -> Result<usize, Error> {
    let ids: BTreeSet<TransactionId> = ids.iter().copied().collect();

    if ids.is_empty() {
        return Ok(0);
    }

    let transaction = connection.transaction()?;

    for id in &ids {
        delete_transaction(*id, &transaction)?;
    }

    transaction.commit()?;

    Ok(ids.len())
}

/// Apply the changes in `update` to every transaction in `update.ids`.
///
/// Duplicate IDs are only counted once.
///
/// # Errors
///
/// Returns an:
/// - [Error::UnknownCategory] if `update.category_name` is not a category,
/// - [Error::UpdateMissingTransaction] if any ID does not refer to a
///   transaction, in which case no transactions are changed.
pub fn bulk_update_transactions(
    update: &BulkUpdate,
    connection: &mut Connection,
) -> Result<usize, Error> {
    let ids: BTreeSet<TransactionId> = update.ids.iter().copied().collect();

    if ids.is_empty() {
        return Ok(0);
    }

    let transaction = connection.transaction()?;

    let category_id = match &update.category_name {
        Some(name) => Some(get_category_by_name(name.trim(), &transaction)?.id),
        None => None,
    };

    {
        let mut statement = transaction.prepare(
            "UPDATE \"transaction\"
             SET category_id = COALESCE(?1, category_id),
                 direction = COALESCE(?2, direction),
                 note = COALESCE(?3, note)
             WHERE id = ?4",
        )?;

        for id in &ids {
            let rows_affected =
                statement.execute((category_id, update.direction, &update.note, id))?;

            if rows_affected == 0 {
                return Err(Error::UpdateMissingTransaction);
            }
        }
    }

    transaction.commit()?;

    Ok(ids.len())
}

#[cfg(test)]
mod bulk_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{CategoryName, create_category},
        direction::Direction,
        test_utils::{amount, get_test_connection},
        transaction::{Transaction, create_transaction, get_transaction},
    };

    use super::{BulkUpdate, bulk_delete_transactions, bulk_update_transactions};

    fn get_connection_with_transactions() -> Connection {
        let connection = get_test_connection();
        for name in ["Food", "Transport"] {
            create_category(
                CategoryName::new_unchecked(name),
                Direction::Expenditure,
                &connection,
            )
            .unwrap();
        }
        for i in 1..=3 {
            create_transaction(
                Transaction::build(amount(&i.to_string()), "Food").note("original"),
                &connection,
            )
            .unwrap();
        }
        connection
    }

    fn count_transactions(connection: &Connection) -> i64 {
        connection
            .query_row(
                "SELECT COUNT(id) FROM \"transaction\"",
                [],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn delete_removes_all_listed_transactions() {
        let mut connection = get_connection_with_transactions();

        let count = bulk_delete_transactions(&[1, 3, 3], &mut connection).unwrap();

        assert_eq!(count, 2);
        assert_eq!(count_transactions(&connection), 1);
        assert!(get_transaction(2, &connection).is_ok());
    }

    #[test]
    fn delete_is_all_or_nothing() {
        let mut connection = get_connection_with_transactions();

        let result = bulk_delete_transactions(&[1, 42], &mut connection);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(count_transactions(&connection), 3);
    }

    #[test]
    fn delete_empty_list_is_a_no_op() {
        let mut connection = get_connection_with_transactions();

        assert_eq!(bulk_delete_transactions(&[], &mut connection), Ok(0));
        assert_eq!(count_transactions(&connection), 3);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut connection = get_connection_with_transactions();
        let update = BulkUpdate {
            ids: vec![1, 2],
            category_name: Some("Transport".to_owned()),
            direction: None,
            note: None,
        };

        let count = bulk_update_transactions(&update, &mut connection).unwrap();

        assert_eq!(count, 2);
        for id in [1, 2] {
            let transaction = get_transaction(id, &connection).unwrap();
            assert_eq!(transaction.category_name.as_ref(), "Transport");
            assert_eq!(transaction.direction, Direction::Expenditure);
            assert_eq!(transaction.note, "original");
        }
        let untouched = get_transaction(3, &connection).unwrap();
        assert_eq!(untouched.category_name.as_ref(), "Food");
    }

    #[test]
    fn update_sets_direction_and_note() {
        let mut connection = get_connection_with_transactions();
        let update = BulkUpdate {
            ids: vec![3],
            category_name: None,
            direction: Some(Direction::Income),
            note: Some("refund".to_owned()),
        };

        bulk_update_transactions(&update, &mut connection).unwrap();

        let transaction = get_transaction(3, &connection).unwrap();
        assert_eq!(transaction.direction, Direction::Income);
        assert_eq!(transaction.note, "refund");
    }

    #[test]
    fn update_is_all_or_nothing() {
        let mut connection = get_connection_with_transactions();
        let update = BulkUpdate {
            ids: vec![1, 99],
            category_name: None,
            direction: None,
            note: Some("changed".to_owned()),
        };

        let result = bulk_update_transactions(&update, &mut connection);

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
        assert_eq!(get_transaction(1, &connection).unwrap().note, "original");
    }

    #[test]
    fn update_rejects_unknown_category() {
        let mut connection = get_connection_with_transactions();
        let update = BulkUpdate {
            ids: vec![1],
            category_name: Some("Holidays".to_owned()),
            direction: None,
            note: None,
        };

        assert_eq!(
            bulk_update_transactions(&update, &mut connection),
            Err(Error::UnknownCategory("Holidays".to_owned()))
        );
    }
}
