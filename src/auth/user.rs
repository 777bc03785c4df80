//! Storage for the password of the single user of the server.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, auth::PasswordHash};

/// Create the user table, which holds at most one row.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            password TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Get the stored password hash, or `None` if no password has been set.
pub fn get_password_hash(connection: &Connection) -> Result<Option<PasswordHash>, Error> {
    connection
        .query_row("SELECT password FROM user WHERE id = 1", [], |row| {
            let raw_password_hash: String = row.get(0)?;
            Ok(PasswordHash::new_unchecked(&raw_password_hash))
        })
        .optional()
        .map_err(|error| error.into())
}

/// Set the password hash, replacing any existing password.
pub fn set_password_hash(
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO user (id, password) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET password = excluded.password",
        (password_hash.as_ref(),),
    )?;

    Ok(())
}

#[cfg(test)]
mod user_tests {
    use crate::{
        auth::{PasswordHash, get_password_hash, set_password_hash},
        test_utils::get_test_connection,
    };

    #[test]
    fn password_is_none_before_it_is_set() {
        let connection = get_test_connection();

        assert_eq!(get_password_hash(&connection), Ok(None));
    }

    #[test]
    fn set_password_replaces_previous_password() {
        let connection = get_test_connection();
        set_password_hash(&PasswordHash::new_unchecked("first"), &connection).unwrap();

        set_password_hash(&PasswordHash::new_unchecked("second"), &connection).unwrap();

        assert_eq!(
            get_password_hash(&connection),
            Ok(Some(PasswordHash::new_unchecked("second")))
        );
    }
}
