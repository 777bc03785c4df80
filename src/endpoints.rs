//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}', use
//! [format_endpoint].

/// The route for logging in.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to end its session.
pub const LOG_OUT_API: &str = "/api/log_out";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to update or delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to delete many transactions at once.
pub const BULK_DELETE_TRANSACTIONS: &str = "/api/transactions/bulk_delete";
/// The route to edit many transactions at once.
pub const BULK_UPDATE_TRANSACTIONS: &str = "/api/transactions/bulk_update";
/// The route for income and expenditure totals over all transactions.
pub const TOTALS: &str = "/api/totals";
/// The route for a report over an arbitrary date range.
pub const REPORT: &str = "/api/report";
/// The route for a report over a calendar month.
pub const MONTHLY_REPORT: &str = "/api/report/monthly";
/// The route to read and replace the financial goal.
pub const GOAL_SETTINGS: &str = "/api/settings/goal";
/// The route for comparing a date range against the financial goal.
pub const GOAL_REPORT: &str = "/api/goal/report";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/categories/{category_id}', '{category_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
