//! Computes a [Report] from a snapshot of transactions.
//!
//! Everything here is a pure function of its inputs, the caller loads the
//! transactions and releases the database before calling [compute_report].

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{
    direction::Direction,
    money::{MONEY_DECIMAL_PLACES, format_percentage, round_half_up},
    report::{
        Anomaly, CategoryFrequencies, CategoryShare, ConsumptionBehavior, Metrics, Report,
        ReportConfig,
    },
    timestamp::DateRange,
    transaction::Transaction,
};

/// Summarise `transactions`, which should already be limited to `period`.
///
/// An empty slice gives a report of zeros with empty lists.
pub fn compute_report(
    transactions: &[Transaction],
    period: DateRange,
    config: &ReportConfig,
) -> Report {
    let (total_income, total_expense) = sum_by_direction(transactions);
    let net_savings = total_income - total_expense;

    Report {
        period,
        metrics: Metrics {
            total_income,
            total_expense,
            net_savings,
            savings_rate: percentage_of(net_savings, total_income, config.percentage_precision),
        },
        expenditure_structure: expenditure_structure(
            transactions,
            total_expense,
            config.percentage_precision,
        ),
        consumption_behavior: ConsumptionBehavior {
            average_transaction: average_transaction(transactions),
            high_frequency_categories: high_frequency_categories(
                transactions,
                config.top_categories,
            ),
        },
        anomalies: find_anomalies(transactions, total_expense, config.anomaly_multiplier),
    }
}

/// The total income and total expenditure of `transactions`.
pub(crate) fn sum_by_direction(transactions: &[Transaction]) -> (Decimal, Decimal) {
    transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expense), transaction| match transaction.direction {
            Direction::Income => (income + transaction.amount.as_decimal(), expense),
            Direction::Expenditure => (income, expense + transaction.amount.as_decimal()),
        },
    )
}

/// `part` as a percentage of `whole`, or "0%" when `whole` is zero.
fn percentage_of(part: Decimal, whole: Decimal, precision: u32) -> String {
    if whole.is_zero() {
        return "0%".to_owned();
    }

    format_percentage(part * Decimal::ONE_HUNDRED / whole, precision)
}

fn expenditures(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(|transaction| transaction.direction == Direction::Expenditure)
}

fn expenditure_structure(
    transactions: &[Transaction],
    total_expense: Decimal,
    precision: u32,
) -> Vec<CategoryShare> {
    if total_expense.is_zero() {
        return Vec::new();
    }

    let mut amount_by_category: BTreeMap<&str, Decimal> = BTreeMap::new();

    for transaction in expenditures(transactions) {
        *amount_by_category
            .entry(transaction.category_name.as_ref())
            .or_default() += transaction.amount.as_decimal();
    }

    let mut shares: Vec<CategoryShare> = amount_by_category
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category: category.to_owned(),
            amount,
            percentage: percentage_of(amount, total_expense, precision),
        })
        .collect();

    // Stable sort, so equal amounts stay in name order from the BTreeMap.
    shares.sort_by(|a, b| b.amount.cmp(&a.amount));

    shares
}

fn average_transaction(transactions: &[Transaction]) -> Decimal {
    if transactions.is_empty() {
        return Decimal::ZERO;
    }

    let total: Decimal = transactions
        .iter()
        .map(|transaction| transaction.amount.as_decimal())
        .sum();

    round_half_up(
        total / Decimal::from(transactions.len()),
        MONEY_DECIMAL_PLACES,
    )
    .normalize()
}

fn high_frequency_categories(
    transactions: &[Transaction],
    top_categories: usize,
) -> CategoryFrequencies {
    let mut count_by_category: BTreeMap<&str, u32> = BTreeMap::new();

    for transaction in expenditures(transactions) {
        *count_by_category
            .entry(transaction.category_name.as_ref())
            .or_default() += 1;
    }

    let mut counts: Vec<(String, u32)> = count_by_category
        .into_iter()
        .map(|(category, count)| (category.to_owned(), count))
        .collect();

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top_categories);

    CategoryFrequencies(counts)
}

fn find_anomalies(
    transactions: &[Transaction],
    total_expense: Decimal,
    multiplier: Decimal,
) -> Vec<Anomaly> {
    let expenditure_count = expenditures(transactions).count();

    if expenditure_count == 0 {
        return Vec::new();
    }

    // No amount can exceed a threshold too large to represent.
    let Some(scaled_total) = multiplier.checked_mul(total_expense) else {
        return Vec::new();
    };
    let threshold = scaled_total / Decimal::from(expenditure_count);

    let mut anomalies: Vec<&Transaction> = expenditures(transactions)
        .filter(|transaction| transaction.amount.as_decimal() > threshold)
        .collect();

    anomalies.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.id.cmp(&b.id)));

    anomalies
        .into_iter()
        .map(|transaction| Anomaly {
            category: transaction.category_name.to_string(),
            note: transaction.note.clone(),
            amount: transaction.amount.as_decimal(),
        })
        .collect()
}
