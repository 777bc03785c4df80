//! Endpoints for computing reports over a date range or a calendar month.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    db::lock_connection,
    report::{Report, ReportConfig, compute_report},
    timestamp::{DateRange, Timestamp},
    timezone::get_local_offset_or_error,
    transaction::{Transaction, get_transactions_in_range},
};

/// The state needed for the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// How reports are computed and formatted.
    pub report_config: ReportConfig,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            report_config: state.report_config,
        }
    }
}

/// The request body for a report over an arbitrary range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    /// The first instant to include.
    pub start_date_time: Timestamp,
    /// The last instant to include.
    pub end_date_time: Timestamp,
}

/// The query string for a monthly report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyReportQuery {
    /// The month in the format "YYYY-MM", defaults to the current month.
    #[serde(default)]
    pub month: Option<String>,
}

/// Compute a report over the range in the request body.
pub async fn post_report_endpoint(
    State(state): State<ReportState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<Report>, Error> {
    let range = DateRange::new(request.start_date_time, request.end_date_time)?;

    report_for_range(&state, range).map(Json)
}

/// Compute a report over a calendar month in the server's local timezone.
pub async fn get_monthly_report_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<Json<Report>, Error> {
    let local_offset = get_local_offset_or_error(&state.local_timezone)?;

    let range = match query.month.as_deref() {
        Some(month) => DateRange::parse_month(month, local_offset)?,
        None => DateRange::current_month(Timestamp::now(), local_offset)?,
    };

    report_for_range(&state, range).map(Json)
}

fn report_for_range(state: &ReportState, range: DateRange) -> Result<Report, Error> {
    let transactions = load_transactions(&state.db_connection, range)?;

    tracing::debug!(
        "Computing report for {} transactions from {} to {}",
        transactions.len(),
        range.start,
        range.end
    );

    Ok(compute_report(&transactions, range, &state.report_config))
}

/// Read the transactions in `range`, holding the database lock only for the read.
fn load_transactions(
    db_connection: &Mutex<Connection>,
    range: DateRange,
) -> Result<Vec<Transaction>, Error> {
    let connection = lock_connection(db_connection)?;

    get_transactions_in_range(range, &connection)
}
