//! Financial goals and how the actual numbers compare to them.

mod attainment;
mod core;
mod endpoints;

pub use attainment::{GoalMetric, GoalReport, compute_goal_report};
pub use core::{GoalConfig, create_goal_table, get_goal, save_goal};
pub use endpoints::{
    GoalReportQuery, get_goal_endpoint, get_goal_report_endpoint, put_goal_endpoint,
};
