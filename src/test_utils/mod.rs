//! Helpers shared by the unit tests.

use std::str::FromStr;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{db::initialize, money::Amount};

/// An in-memory database with all the tables created.
#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("could not open in-memory database");
    initialize(&connection).expect("could not initialize test database");

    connection
}

/// Parse a decimal string such as "12.50" into an [Amount].
#[track_caller]
pub(crate) fn amount(value: &str) -> Amount {
    let value = Decimal::from_str(value).expect("invalid decimal string");

    Amount::new(value).expect("invalid amount")
}
