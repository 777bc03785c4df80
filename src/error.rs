//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::json;

use crate::timestamp::Timestamp;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The password in a log in request did not match the stored password.
    #[error("invalid password")]
    InvalidCredentials,

    /// No password has been set up yet, so nobody can log in.
    ///
    /// Run the `reset_password` binary to set one.
    #[error("no password has been set for this server")]
    PasswordNotSet,

    /// The session cookie is missing, could not be decrypted or has expired.
    #[error("not logged in")]
    NotAuthenticated,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The category name is already used by another category.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// A category cannot be deleted while transactions still refer to it.
    #[error("the category \"{name}\" is still used by {transaction_count} transaction(s)")]
    CategoryInUse {
        /// The name of the category that could not be deleted.
        name: String,
        /// How many transactions refer to the category.
        transaction_count: u32,
    },

    /// A transaction referred to a category name that does not exist.
    #[error("there is no category named \"{0}\"")]
    UnknownCategory(String),

    /// A direction string other than "Income" or "Expenditure" was read.
    #[error("\"{0}\" is not a valid direction, expected \"Income\" or \"Expenditure\"")]
    InvalidDirection(String),

    /// Transaction amounts must not be negative.
    #[error("{0} is negative, amounts must be zero or greater")]
    NegativeAmount(Decimal),

    /// Amounts are stored as whole cents.
    #[error("{0} has more than two decimal places")]
    TooManyDecimalPlaces(Decimal),

    /// The amount does not fit into the range supported by the database.
    #[error("{0} is too large to be stored")]
    AmountOutOfRange(Decimal),

    /// The lower amount bound of a query is larger than the upper bound.
    #[error("the minimum amount {min} is greater than the maximum amount {max}")]
    InvalidAmountRange {
        /// The lower bound.
        min: Decimal,
        /// The upper bound.
        max: Decimal,
    },

    /// The start of a date range is after its end.
    #[error("the start date {start} is after the end date {end}")]
    InvalidDateRange {
        /// The start of the range.
        start: Timestamp,
        /// The end of the range.
        end: Timestamp,
    },

    /// A month string could not be parsed, expected "YYYY-MM".
    #[error("\"{0}\" is not a valid month, expected the format YYYY-MM")]
    InvalidMonth(String),

    /// A goal target that must not be negative was negative.
    #[error("the {0} goal must not be negative")]
    NegativeGoal(&'static str),

    /// A goal report was requested before any goal was saved.
    #[error("no financial goal has been set")]
    GoalNotConfigured,

    /// The request body could not be read.
    #[error("could not read the request body: {0}")]
    InvalidRequestBody(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A timestamp could not be formatted or is out of the supported range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The session token could not be created or encoded for the auth cookie.
    #[error("could not create the session token: {0}")]
    TokenError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::NotAuthenticated | Error::PasswordNotSet => {
                StatusCode::UNAUTHORIZED
            }
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::DuplicateCategoryName(_) | Error::CategoryInUse { .. } => StatusCode::CONFLICT,
            Error::TooWeak(_)
            | Error::EmptyCategoryName
            | Error::UnknownCategory(_)
            | Error::InvalidDirection(_)
            | Error::NegativeAmount(_)
            | Error::TooManyDecimalPlaces(_)
            | Error::AmountOutOfRange(_)
            | Error::InvalidAmountRange { .. }
            | Error::InvalidDateRange { .. }
            | Error::InvalidMonth(_)
            | Error::NegativeGoal(_)
            | Error::GoalNotConfigured
            | Error::InvalidRequestBody(_)
            | Error::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
            Error::HashingError(_)
            | Error::InvalidTimezoneError(_)
            | Error::TokenError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // The details of internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use crate::Error;

    async fn get_body_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn category_in_use_is_a_conflict() {
        let (status, body) = get_body_json(Error::CategoryInUse {
            name: "Food".to_owned(),
            transaction_count: 2,
        })
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "the category \"Food\" is still used by 2 transaction(s)"
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let error = Error::SqlError(rusqlite::Error::InvalidColumnName("secret".to_owned()));

        let (status, body) = get_body_json(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn token_errors_are_internal() {
        let (status, body) = get_body_json(Error::TokenError("key".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("key"));
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, _) = get_body_json(Error::NotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
