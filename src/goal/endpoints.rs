//! Endpoints for the goal settings and the goal report.

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
    goal::{GoalConfig, GoalReport, compute_goal_report, get_goal, save_goal},
    timestamp::{DateRange, RangeBound},
    timezone::get_local_offset_or_error,
    transaction::get_transactions_in_range,
};

/// The state needed for the goal endpoints.
#[derive(Debug, Clone)]
pub struct GoalState {
    /// The database connection for reading the goal and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for a goal report.
///
/// Each bound is either an RFC3339 timestamp or a day such as "2025-10-31",
/// which covers that whole day in the local timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalReportQuery {
    /// The start of the range.
    pub start_date: RangeBound,
    /// The end of the range.
    pub end_date: RangeBound,
}

/// Get the current goal, zeros if none has been saved.
pub async fn get_goal_endpoint(
    State(state): State<GoalState>,
) -> Result<Json<GoalConfig>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    Ok(Json(get_goal(&connection)?.unwrap_or_default()))
}

/// Replace the goal.
pub async fn put_goal_endpoint(
    State(state): State<GoalState>,
    Json(goal): Json<GoalConfig>,
) -> Result<Json<GoalConfig>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let goal = save_goal(goal, &connection)?;
    tracing::info!("Updated goal to {goal:?}");

    Ok(Json(goal))
}

/// Compare the transactions in the requested range against the goal.
pub async fn get_goal_report_endpoint(
    State(state): State<GoalState>,
    Query(query): Query<GoalReportQuery>,
) -> Result<Json<GoalReport>, Error> {
    let local_offset = get_local_offset_or_error(&state.local_timezone)?;
    let range = DateRange::from_bounds(query.start_date, query.end_date, local_offset)?;

    let (goal, transactions) = {
        let connection = lock_connection(&state.db_connection)?;
        let goal = get_goal(&connection)?.ok_or(Error::GoalNotConfigured)?;
        let transactions = get_transactions_in_range(range, &connection)?;

        (goal, transactions)
    };

    Ok(Json(compute_goal_report(&goal, &transactions, range)))
}
