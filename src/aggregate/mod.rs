//! Summaries computed from a loaded [`Table`].
//!
//! Every function here is pure and total: an empty table gives empty or zero
//! results, and rows whose type is neither Income nor Expense are left out of
//! anything that splits by type. Categories are grouped exactly as stored,
//! so `Food` and `food` are separate groups.
//!
//! Sums use checked arithmetic. A row that would push a total past what a
//! [`Decimal`] can hold is skipped instead of aborting the process.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{Table, TransactionType};

/// Summed amount per transaction type. Types with no rows are absent.
pub(crate) fn totals_by_type(table: &Table) -> BTreeMap<TransactionType, Decimal> {
    let mut totals = BTreeMap::new();
    for record in table.records() {
        if let Some(kind) = record.transaction_type() {
            add_to(totals.entry(kind).or_insert(Decimal::ZERO), record.amount);
        }
    }
    totals
}

/// Summed amount per category across all rows, largest first.
/// Equal totals are ordered by category name.
pub(crate) fn totals_by_category(table: &Table) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = sum_by_category(table, None).into_iter().collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

/// Summed amount per `(month, type)`, ordered by month then type.
pub(crate) fn monthly_totals(table: &Table) -> Vec<(String, TransactionType, Decimal)> {
    let mut totals: BTreeMap<(String, TransactionType), Decimal> = BTreeMap::new();
    for record in table.records() {
        if let Some(kind) = record.transaction_type() {
            add_to(
                totals.entry((record.month(), kind)).or_insert(Decimal::ZERO),
                record.amount,
            );
        }
    }
    totals
        .into_iter()
        .map(|((month, kind), total)| (month, kind, total))
        .collect()
}

/// `(month, income, expense)` for every month that has at least one typed
/// row, oldest first. A month with only one side reports zero for the other.
pub(crate) fn monthly_trend(table: &Table) -> Vec<(String, Decimal, Decimal)> {
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for (month, kind, total) in monthly_totals(table) {
        let entry = months.entry(month).or_default();
        match kind {
            TransactionType::Income => add_to(&mut entry.0, total),
            TransactionType::Expense => add_to(&mut entry.1, total),
        }
    }
    months
        .into_iter()
        .map(|(month, (income, expense))| (month, income, expense))
        .collect()
}

/// Category with the largest summed expense.
///
/// Ties go to the category that sorts first by name.
pub(crate) fn top_expense_category(table: &Table) -> Option<(String, Decimal)> {
    let mut top: Option<(String, Decimal)> = None;
    for (category, total) in sum_by_category(table, Some(TransactionType::Expense)) {
        let better = match &top {
            Some((_, best)) => total > *best,
            None => true,
        };
        if better {
            top = Some((category, total));
        }
    }
    top
}

/// `(total_income, total_expense, net)` where `net = income - expense`,
/// saturating at the bounds of [`Decimal`].
pub(crate) fn income_expense_totals(table: &Table) -> (Decimal, Decimal, Decimal) {
    let totals = totals_by_type(table);
    let income = totals
        .get(&TransactionType::Income)
        .copied()
        .unwrap_or_default();
    let expense = totals
        .get(&TransactionType::Expense)
        .copied()
        .unwrap_or_default();
    (income, expense, income.saturating_sub(expense))
}

/// Expenses as a percentage of income, or `None` when there is no income or
/// the percentage is too large to represent.
pub(crate) fn expense_to_income_ratio(table: &Table) -> Option<Decimal> {
    let (income, expense, _) = income_expense_totals(table);
    if income <= Decimal::ZERO {
        return None;
    }
    expense
        .checked_div(income)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

fn sum_by_category(table: &Table, only: Option<TransactionType>) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for record in table.records() {
        if only.is_some_and(|kind| record.transaction_type() != Some(kind)) {
            continue;
        }
        add_to(
            totals.entry(record.category.clone()).or_insert(Decimal::ZERO),
            record.amount,
        );
    }
    totals
}

/// Add `amount` to `total`, leaving `total` untouched if the sum overflows.
fn add_to(total: &mut Decimal, amount: Decimal) {
    match total.checked_add(amount) {
        Some(sum) => *total = sum,
        None => tracing::warn!("Skipped amount {amount}: total would overflow"),
    }
}
