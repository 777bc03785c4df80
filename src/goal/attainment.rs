//! Compares actual income, expenditure and savings in a period against the goal.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    goal::GoalConfig, money::round_half_up, report::sum_by_direction, timestamp::DateRange,
    transaction::Transaction,
};

/// How one measure compares against its goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalMetric {
    /// The target.
    #[serde(with = "rust_decimal::serde::float")]
    pub goal: Decimal,
    /// What actually happened in the period.
    #[serde(with = "rust_decimal::serde::float")]
    pub actual: Decimal,
    /// Whether the goal was met.
    pub achieved: bool,
    /// `actual - goal`.
    #[serde(with = "rust_decimal::serde::float")]
    pub diff: Decimal,
    /// The difference as a percentage of the goal, rounded to two decimal
    /// places, or zero when the goal is zero.
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

impl GoalMetric {
    fn new(goal: Decimal, actual: Decimal, achieved: bool) -> Self {
        let diff = actual - goal;
        let percentage = if goal.is_zero() {
            Decimal::ZERO
        } else {
            round_half_up(diff * Decimal::ONE_HUNDRED / goal, 2).normalize()
        };

        Self {
            goal,
            actual,
            achieved,
            diff,
            percentage,
        }
    }
}

/// Progress towards the goal over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalReport {
    /// The inclusive range of time covered by the report.
    pub period: DateRange,
    /// Income compared to the income goal, achieved when at least the goal.
    pub income: GoalMetric,
    /// Expenditure compared to the spending limit, achieved when at most the goal.
    pub expenditure: GoalMetric,
    /// Income minus expenditure compared to the savings goal, achieved when at
    /// least the goal.
    pub total_save: GoalMetric,
}

/// Compare `transactions`, which should already be limited to `period`,
/// against `goal`.
pub fn compute_goal_report(
    goal: &GoalConfig,
    transactions: &[Transaction],
    period: DateRange,
) -> GoalReport {
    let (income, expenditure) = sum_by_direction(transactions);
    let total_save = income - expenditure;

    GoalReport {
        period,
        income: GoalMetric::new(goal.income, income, income >= goal.income),
        expenditure: GoalMetric::new(
            goal.expenditure,
            expenditure,
            expenditure <= goal.expenditure,
        ),
        total_save: GoalMetric::new(goal.total_save, total_save, total_save >= goal.total_save),
    }
}
