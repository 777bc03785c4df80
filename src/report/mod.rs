//! Monthly analysis reports: totals, savings rate, spending by category and anomalies.

mod aggregator;
mod endpoints;
mod models;

pub use aggregator::compute_report;
pub(crate) use aggregator::sum_by_direction;
pub use endpoints::{
    MonthlyReportQuery, ReportRequest, get_monthly_report_endpoint, post_report_endpoint,
};
pub use models::{
    Anomaly, CategoryFrequencies, CategoryShare, ConsumptionBehavior, Metrics, Report,
    ReportConfig,
};
