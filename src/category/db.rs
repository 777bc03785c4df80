//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::CategoryId,
    direction::Direction,
};

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::DuplicateCategoryName] if another category already has
/// `name`, or an [Error::SqlError] for other SQL errors.
pub fn create_category(
    name: CategoryName,
    default_direction: Direction,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, default_direction) VALUES (?1, ?2);",
            (name.as_ref(), default_direction),
        )
        .map_err(|error| map_duplicate_name_error(error, &name))?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        default_direction,
    })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, default_direction FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve a single category by its exact name.
///
/// # Errors
///
/// Returns an [Error::UnknownCategory] if no category has the name `name`.
pub fn get_category_by_name(name: &str, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, default_direction FROM category WHERE name = :name;")?
        .query_row(&[(":name", &name)], map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UnknownCategory(name.to_owned()),
            error => error.into(),
        })
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, default_direction FROM category ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Rename a category and set its default direction.
///
/// Transactions refer to categories by ID, so renaming a category renames it
/// for all of its transactions.
///
/// # Errors
///
/// Returns an [Error::UpdateMissingCategory] if the category does not exist,
/// or an [Error::DuplicateCategoryName] if the new name is taken.
pub fn update_category(
    category_id: CategoryId,
    name: CategoryName,
    default_direction: Direction,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, default_direction = ?2 WHERE id = ?3",
            (name.as_ref(), default_direction, category_id),
        )
        .map_err(|error| map_duplicate_name_error(error, &name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(Category {
        id: category_id,
        name,
        default_direction,
    })
}

/// Delete a category by ID.
///
/// # Errors
///
/// Returns an:
/// - [Error::DeleteMissingCategory] if the category does not exist,
/// - [Error::CategoryInUse] if any transaction still belongs to the category.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let category = match get_category(category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    };

    let transaction_count = count_transactions_in_category(category_id, connection)?;

    if transaction_count > 0 {
        return Err(Error::CategoryInUse {
            name: category.name.to_string(),
            transaction_count,
        });
    }

    let rows_affected = connection
        .execute("DELETE FROM category WHERE id = ?1", [category_id])
        .map_err(|error| match error {
            // A transaction was added between the count and the delete.
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::CategoryInUse {
                name: category.name.to_string(),
                transaction_count: 1,
            },
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

fn count_transactions_in_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE category_id = ?1",
            [category_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            default_direction TEXT NOT NULL CHECK (default_direction IN ('Income', 'Expenditure'))
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let default_direction = row.get(2)?;

    Ok(Category {
        id,
        name,
        default_direction,
    })
}

fn map_duplicate_name_error(error: rusqlite::Error, name: &CategoryName) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateCategoryName(name.to_string()),
        error => error.into(),
    }
}

#[cfg(test)]
mod category_query_tests {
    use rust_decimal::Decimal;

    use crate::{
        Error,
        category::{
            CategoryName, create_category, delete_category, get_all_categories, get_category,
            get_category_by_name, update_category,
        },
        direction::Direction,
        money::Amount,
        test_utils::get_test_connection,
        transaction::{Transaction, create_transaction},
    };

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_connection();
        let name = CategoryName::new_unchecked("Food");

        let category = create_category(name.clone(), Direction::Expenditure, &connection)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(category.default_direction, Direction::Expenditure);
    }

    #[test]
    fn create_category_fails_on_duplicate_name() {
        let connection = get_test_connection();
        create_category(
            CategoryName::new_unchecked("Food"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();

        let result = create_category(
            CategoryName::new_unchecked("Food"),
            Direction::Income,
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateCategoryName("Food".to_owned())));
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_test_connection();

        assert_eq!(get_category(42, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_category_by_name_returns_unknown_category() {
        let connection = get_test_connection();

        assert_eq!(
            get_category_by_name("Rent", &connection),
            Err(Error::UnknownCategory("Rent".to_owned()))
        );
    }

    #[test]
    fn get_all_categories_orders_by_name() {
        let connection = get_test_connection();
        for name in ["Transport", "Food", "Salary"] {
            create_category(
                CategoryName::new_unchecked(name),
                Direction::Expenditure,
                &connection,
            )
            .unwrap();
        }

        let names: Vec<String> = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();

        assert_eq!(names, ["Food", "Salary", "Transport"]);
    }

    #[test]
    fn update_category_renames_category() {
        let connection = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Food"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();

        update_category(
            category.id,
            CategoryName::new_unchecked("Groceries"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();

        let got = get_category(category.id, &connection).unwrap();
        assert_eq!(got.name.as_ref(), "Groceries");
    }

    #[test]
    fn update_category_with_invalid_id_returns_error() {
        let connection = get_test_connection();

        let result = update_category(
            999,
            CategoryName::new_unchecked("Food"),
            Direction::Income,
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }

    #[test]
    fn update_category_fails_on_duplicate_name() {
        let connection = get_test_connection();
        create_category(
            CategoryName::new_unchecked("Food"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();
        let rent = create_category(
            CategoryName::new_unchecked("Rent"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();

        let result = update_category(
            rent.id,
            CategoryName::new_unchecked("Food"),
            Direction::Expenditure,
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateCategoryName("Food".to_owned())));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Food"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();

        delete_category(category.id, &connection).unwrap();

        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_category_returns_error() {
        let connection = get_test_connection();

        assert_eq!(
            delete_category(123, &connection),
            Err(Error::DeleteMissingCategory)
        );
    }

    #[test]
    fn delete_category_in_use_fails() {
        let connection = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Food"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();
        for _ in 0..2 {
            create_transaction(
                Transaction::build(Amount::new(Decimal::new(10, 0)).unwrap(), "Food"),
                &connection,
            )
            .unwrap();
        }

        let result = delete_category(category.id, &connection);

        assert_eq!(
            result,
            Err(Error::CategoryInUse {
                name: "Food".to_owned(),
                transaction_count: 2
            })
        );
        assert!(get_category(category.id, &connection).is_ok());
    }
}
