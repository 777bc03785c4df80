//! The report returned by the monthly analysis and the settings that shape it.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::timestamp::DateRange;

/// Settings for how a report is computed and formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// The number of decimal places shown in percentage strings.
    pub percentage_precision: u32,
    /// An expenditure is an anomaly when it is larger than this many times the
    /// mean expenditure.
    pub anomaly_multiplier: Decimal,
    /// How many categories to list in the high frequency categories.
    pub top_categories: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            percentage_precision: 1,
            anomaly_multiplier: Decimal::TWO,
            top_categories: 3,
        }
    }
}

/// A summary of the transactions in a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The inclusive range of time covered by the report.
    pub period: DateRange,
    /// Income, expenditure and savings totals.
    pub metrics: Metrics,
    /// Expenditure broken down by category, largest first.
    pub expenditure_structure: Vec<CategoryShare>,
    /// Statistics about spending habits.
    pub consumption_behavior: ConsumptionBehavior,
    /// Unusually large expenditures, largest first.
    pub anomalies: Vec<Anomaly>,
}

/// The headline numbers of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// The sum of all income.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    /// The sum of all expenditure.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    /// Income minus expenditure, may be negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_savings: Decimal,
    /// Net savings as a percentage of income, e.g. "40%".
    pub savings_rate: String,
}

/// The total expenditure in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    /// The category name.
    pub category: String,
    /// The sum of expenditure in the category.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// The share of total expenditure, e.g. "83.3%".
    pub percentage: String,
}

/// Statistics about how money is spent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionBehavior {
    /// The mean amount over all transactions in either direction.
    #[serde(with = "rust_decimal::serde::float")]
    pub average_transaction: Decimal,
    /// The categories with the most expenditure transactions.
    pub high_frequency_categories: CategoryFrequencies,
}

/// Category names with their number of expenditure transactions, most
/// frequent first.
///
/// Serialized as a JSON object that keeps this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFrequencies(pub Vec<(String, u32)>);

impl Serialize for CategoryFrequencies {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (category, count) in &self.0 {
            map.serialize_entry(category, count)?;
        }

        map.end()
    }
}

/// An expenditure that is much larger than usual.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    /// The category of the transaction.
    pub category: String,
    /// The note of the transaction.
    pub note: String,
    /// The amount spent.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}
