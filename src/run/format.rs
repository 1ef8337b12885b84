use rust_decimal::Decimal;

use crate::aggregate;
use crate::models::Table;

const RULE_WIDTH: usize = 44;
const CATEGORY_WIDTH: usize = 24;

/// Dollar amount with thousand separators and two decimals,
/// e.g. `-1234.5` → `"-$1,234.50"`.
pub(crate) fn format_amount(val: Decimal) -> String {
    let text = format!("{:.2}", val.abs());
    let (int_part, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if val < Decimal::ZERO && !val.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{frac}")
}

pub(crate) fn format_percent(val: Decimal) -> String {
    format!("{val:.2}%")
}

/// Truncate to `max` characters, ending with "…" when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max - 1).collect();
    format!("{kept}…")
}

/// Text version of the dashboard: headline metrics, per-type and
/// per-category totals, and month-by-month income against expenses.
pub(crate) fn render_summary(table: &Table) -> String {
    let (income, expense, net) = aggregate::income_expense_totals(table);
    let ratio = aggregate::expense_to_income_ratio(table)
        .map(format_percent)
        .unwrap_or_else(|| "n/a (no income)".into());
    let top = aggregate::top_expense_category(table)
        .map(|(name, total)| format!("{name} ({})", format_amount(total)))
        .unwrap_or_else(|| "no expense data".into());

    let mut lines = vec![
        "Personal Finance Summary".to_string(),
        "─".repeat(RULE_WIDTH),
        format!("  Total Income:   {}", format_amount(income)),
        format!("  Total Expense:  {}", format_amount(expense)),
        format!("  Net Balance:    {}", format_amount(net)),
        format!("  Expense Ratio:  {ratio}"),
        format!("  Top Expense:    {top}"),
    ];

    lines.push(String::new());
    lines.push("By Type:".into());
    for (kind, total) in aggregate::totals_by_type(table) {
        lines.push(format!(
            "  {:<width$} {:>14}",
            kind.as_str(),
            format_amount(total),
            width = CATEGORY_WIDTH
        ));
    }

    let by_category = aggregate::totals_by_category(table);
    if !by_category.is_empty() {
        lines.push(String::new());
        lines.push("By Category:".into());
        for (name, total) in &by_category {
            lines.push(format!(
                "  {:<width$} {:>14}",
                truncate(name, CATEGORY_WIDTH),
                format_amount(*total),
                width = CATEGORY_WIDTH
            ));
        }
    }

    let trend = aggregate::monthly_trend(table);
    if !trend.is_empty() {
        lines.push(String::new());
        lines.push("Monthly Income vs Expenses:".into());
        lines.push(format!("  {:<9} {:>14} {:>14}", "Month", "Income", "Expense"));
        for (month, income, expense) in &trend {
            lines.push(format!(
                "  {:<9} {:>14} {:>14}",
                month,
                format_amount(*income),
                format_amount(*expense)
            ));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// One line per record, in table order.
pub(crate) fn render_transactions(table: &Table) -> String {
    let mut lines = vec![
        format!(
            "{:<10}  {:<width$} {:>14}  Type",
            "Date",
            "Category",
            "Amount",
            width = CATEGORY_WIDTH
        ),
        "─".repeat(10 + 2 + CATEGORY_WIDTH + 1 + 14 + 2 + 7),
    ];
    for record in table.records() {
        lines.push(format!(
            "{:<10}  {:<width$} {:>14}  {}",
            record.date,
            truncate(&record.category, CATEGORY_WIDTH),
            format_amount(record.amount),
            record.kind,
            width = CATEGORY_WIDTH
        ));
    }
    lines.push(format!("{} transaction(s)", table.len()));
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
