//! Report formatting for terminal output
//!
//! Overview blocks, per-period averages, trend bars and category breakdowns.

use crate::models::{Currency, Money};
use crate::services::aggregation::{AverageData, TrendBucket, WholeAverageData};
use crate::services::report::{CategoryLine, Overview};

const BAR_WIDTH: usize = 24;

/// Percentage with precision that scales with magnitude
pub fn format_percentage(pct: f64) -> String {
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// A horizontal bar scaled against `max_value`
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

pub fn format_overview(overview: &Overview, label: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", label));
    output.push_str(&format!("{}\n", separator(36)));
    output.push_str(&format!("  Income:       {:>20}\n", overview.income.formatted));
    output.push_str(&format!("  Expense:      {:>20}\n", overview.expense.formatted));
    output.push_str(&format!("  Net:          {:>20}\n", overview.net.formatted));
    output.push_str(&format!("  Transactions: {:>20}\n", overview.transaction_count));

    output
}

fn average_line(name: &str, data: &AverageData) -> String {
    format!(
        "  {:<8} {:>14} {:>14} {:>14}\n",
        name, data.per_day.formatted, data.per_week.formatted, data.per_month.formatted
    )
}

pub fn format_averages(averages: &WholeAverageData) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "  {:<8} {:>14} {:>14} {:>14}\n",
        "", "Per day", "Per week", "Per month"
    ));
    output.push_str(&average_line("Income", &averages.income));
    output.push_str(&average_line("Expense", &averages.expense));
    output
}

/// One line per bucket with income and expense bars
pub fn format_trend(buckets: &[TrendBucket], currency: &Currency) -> String {
    if buckets.is_empty() {
        return "No transactions in this period.\n".to_string();
    }

    let max = buckets
        .iter()
        .map(|b| b.totals.income.max(b.totals.expense))
        .max()
        .unwrap_or_else(Money::zero)
        .as_f64();

    let mut output = String::new();
    for bucket in buckets {
        output.push_str(&format!(
            "{:<10} in  {} {:>14}\n",
            bucket.label,
            format_bar(bucket.totals.income.as_f64(), max, BAR_WIDTH),
            currency.format(bucket.totals.income)
        ));
        output.push_str(&format!(
            "{:<10} out {} {:>14}\n",
            "",
            format_bar(bucket.totals.expense.as_f64(), max, BAR_WIDTH),
            currency.format(bucket.totals.expense)
        ));
    }
    output
}

pub fn format_category_lines(lines: &[CategoryLine]) -> String {
    if lines.is_empty() {
        return "No transactions in this period.\n".to_string();
    }

    let mut output = String::new();
    for line in lines {
        output.push_str(&format!(
            "  {:<20} {} {:>6} {:>14}  ({})\n",
            line.name,
            format_bar(line.percent, 100.0, BAR_WIDTH),
            format_percentage(line.percent),
            line.amount.formatted,
            line.count
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregation::Totals;
    use chrono::NaiveDate;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "0.05%");
        assert_eq!(format_percentage(5.5), "5.5%");
        assert_eq!(format_percentage(50.0), "50%");
    }

    #[test]
    fn test_format_bar() {
        let bar = format_bar(50.0, 100.0, 10);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(format_bar(0.0, 100.0, 4), "    ");
    }

    #[test]
    fn test_trend_scales_to_largest_bucket() {
        let currency = Currency::default();
        let buckets = vec![TrendBucket {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            label: "Mar 2024".into(),
            totals: Totals {
                income: Money::from_units(100),
                expense: Money::from_units(50),
                transfer: Money::zero(),
            },
        }];

        let output = format_trend(&buckets, &currency);
        assert!(output.contains("Mar 2024"));
        assert!(output.contains("$100.00"));
        assert_eq!(
            output.lines().next().unwrap().chars().filter(|c| *c == '█').count(),
            BAR_WIDTH
        );
    }

    #[test]
    fn test_category_lines() {
        let currency = Currency::default();
        let output = format_category_lines(&[CategoryLine {
            name: "Food".into(),
            amount: currency.amount(Money::from_units(30)),
            count: 3,
            percent: 75.0,
        }]);
        assert!(output.contains("Food"));
        assert!(output.contains("75%"));
        assert!(output.contains("(3)"));
    }
}
