//! Transaction endpoints for listing, creating, editing and deleting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{
        BulkDelete, BulkResult, BulkUpdate, Totals, Transaction, TransactionBuilder,
        TransactionQuery, bulk_delete_transactions, bulk_update_transactions, create_transaction,
        delete_transaction, get_filtered_transactions, get_totals, get_transaction,
        update_transaction,
    },
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the transactions matching the filters in the query string.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_filtered_transactions(&query, &connection).map(Json)
}

/// Create a transaction, responding with 201 and the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<impl IntoResponse, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(builder, &connection)?;
    tracing::debug!("Created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Get a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, &connection).map(Json)
}

/// Replace a transaction with the fields in the request body.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_transaction(transaction_id, builder, &connection).map(Json)
}

/// Delete a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete all the listed transactions, or none of them if any is missing.
pub async fn bulk_delete_endpoint(
    State(state): State<TransactionState>,
    Json(request): Json<BulkDelete>,
) -> Result<Json<BulkResult>, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let count = bulk_delete_transactions(&request.ids, &mut connection)?;
    tracing::info!("Deleted {count} transactions");

    Ok(Json(BulkResult { count }))
}

/// Edit all the listed transactions, or none of them if any is missing.
pub async fn bulk_update_endpoint(
    State(state): State<TransactionState>,
    Json(request): Json<BulkUpdate>,
) -> Result<Json<BulkResult>, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let count = bulk_update_transactions(&request, &mut connection)?;
    tracing::info!("Updated {count} transactions");

    Ok(Json(BulkResult { count }))
}

/// Get the total income and expenditure over all transactions.
pub async fn get_totals_endpoint(
    State(state): State<TransactionState>,
) -> Result<Json<Totals>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_totals(&connection).map(Json)
}

#[cfg(test)]
mod transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
    };

    use crate::{
        Error,
        category::{CategoryName, create_category},
        direction::Direction,
        test_utils::{amount, get_test_connection},
        transaction::{BulkDelete, Transaction, TransactionQuery},
    };

    use super::{
        TransactionState, bulk_delete_endpoint, create_transaction_endpoint,
        delete_transaction_endpoint, get_totals_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    };

    fn get_transaction_state() -> TransactionState {
        let connection = get_test_connection();
        create_category(
            CategoryName::new_unchecked("Food"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();

        TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn create_returns_created() {
        let state = get_transaction_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Json(Transaction::build(amount("12.5"), "Food")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let Json(transaction) = get_transaction_endpoint(State(state), Path(1))
            .await
            .unwrap();
        assert_eq!(transaction.amount, amount("12.5"));
    }

    #[tokio::test]
    async fn create_with_unknown_category_returns_bad_request() {
        let state = get_transaction_state();

        let response = create_transaction_endpoint(
            State(state),
            Json(Transaction::build(amount("1"), "Rent")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_missing_transaction_returns_not_found() {
        let state = get_transaction_state();

        let response = get_transaction_endpoint(State(state), Path(7))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_changes_transaction() {
        let state = get_transaction_state();
        create_transaction_endpoint(
            State(state.clone()),
            Json(Transaction::build(amount("1"), "Food")),
        )
        .await
        .unwrap();

        let Json(updated) = update_transaction_endpoint(
            State(state),
            Path(1),
            Json(Transaction::build(amount("2"), "Food").note("edited")),
        )
        .await
        .unwrap();

        assert_eq!(updated.amount, amount("2"));
        assert_eq!(updated.note, "edited");
    }

    #[tokio::test]
    async fn delete_then_list_is_empty() {
        let state = get_transaction_state();
        create_transaction_endpoint(
            State(state.clone()),
            Json(Transaction::build(amount("1"), "Food")),
        )
        .await
        .unwrap();

        let status = delete_transaction_endpoint(State(state.clone()), Path(1))
            .await
            .unwrap();
        let Json(transactions) =
            list_transactions_endpoint(State(state), Query(TransactionQuery::default()))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn bulk_delete_reports_count() {
        let state = get_transaction_state();
        for _ in 0..3 {
            create_transaction_endpoint(
                State(state.clone()),
                Json(Transaction::build(amount("1"), "Food")),
            )
            .await
            .unwrap();
        }

        let Json(result) = bulk_delete_endpoint(
            State(state.clone()),
            Json(BulkDelete { ids: vec![1, 2] }),
        )
        .await
        .unwrap();

        assert_eq!(result.count, 2);
        let Json(totals) = get_totals_endpoint(State(state)).await.unwrap();
        assert_eq!(totals.expenditure, amount("1"));
    }

    #[tokio::test]
    async fn bulk_delete_with_missing_id_returns_not_found() {
        let state = get_transaction_state();

        let result = bulk_delete_endpoint(State(state), Json(BulkDelete { ids: vec![5] })).await;

        assert_eq!(result.err(), Some(Error::DeleteMissingTransaction));
    }
}
