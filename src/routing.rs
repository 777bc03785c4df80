//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::Uri,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::{
    AppState, Error,
    auth::{auth_guard, post_log_in, post_log_out},
    category::{
        create_category_endpoint, delete_category_endpoint, list_categories_endpoint,
        update_category_endpoint,
    },
    endpoints,
    goal::{get_goal_endpoint, get_goal_report_endpoint, put_goal_endpoint},
    report::{get_monthly_report_endpoint, post_report_endpoint},
    transaction::{
        bulk_delete_endpoint, bulk_update_endpoint, create_transaction_endpoint,
        delete_transaction_endpoint, get_totals_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT_API, post(post_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BULK_DELETE_TRANSACTIONS,
            post(bulk_delete_endpoint),
        )
        .route(
            endpoints::BULK_UPDATE_TRANSACTIONS,
            post(bulk_update_endpoint),
        )
        .route(endpoints::TOTALS, get(get_totals_endpoint))
        .route(endpoints::REPORT, post(post_report_endpoint))
        .route(endpoints::MONTHLY_REPORT, get(get_monthly_report_endpoint))
        .route(
            endpoints::GOAL_SETTINGS,
            get(get_goal_endpoint).put(put_goal_endpoint),
        )
        .route(endpoints::GOAL_REPORT, get(get_goal_report_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {uri}");

    Error::NotFound.into_response()
}
