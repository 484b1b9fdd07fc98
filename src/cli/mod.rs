//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod backup;
pub mod budget;
pub mod category;
pub mod currency;
pub mod export;
pub mod filter;
pub mod report;
pub mod transaction;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::config::settings::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{DateRangeModel, Money};
use crate::preferences::PreferenceStore;
use crate::services::date_range;

pub use account::{handle_account_command, AccountCommands};
pub use backup::{handle_backup_command, BackupCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use currency::{handle_currency_command, CurrencyCommands};
pub use export::{handle_export_command, ExportArgs};
pub use filter::{handle_filter_command, FilterCommands};
pub use report::{handle_dashboard_command, handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

/// Parse a user-entered amount such as "12.50" or "1,200"
pub(crate) fn parse_money(input: &str, field: &str) -> ExpenseResult<Money> {
    Money::parse(input).map_err(|e| {
        ExpenseError::Validation(format!(
            "Invalid {} '{}'. Use a format like '12.50' or '12': {}",
            field, input, e
        ))
    })
}

/// Parse a `YYYY-MM-DD` date
pub(crate) fn parse_date(input: &str) -> ExpenseResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        ExpenseError::Validation(format!(
            "Invalid date '{}'. Use YYYY-MM-DD format",
            input
        ))
    })
}

/// `date` at the current local time of day, so same-day entries keep their order
pub(crate) fn on_date(date: NaiveDate, now: DateTime<Utc>) -> DateTime<Utc> {
    let naive = date.and_time(now.with_timezone(&Local).time());
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| date_range::local_midnight(date))
}

/// The window selected by the stored date-range filter
pub(crate) fn active_range(
    prefs: &PreferenceStore,
    settings: &Settings,
    now: DateTime<Utc>,
) -> ExpenseResult<DateRangeModel> {
    Ok(date_range::resolve(
        prefs.filter_type()?,
        prefs.custom_range()?,
        now,
        settings.week_start(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("12.50", "amount").unwrap(), Money::from_cents(1250));
        assert!(parse_money("twelve", "amount").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
        );
        assert!(parse_date("15/03/2026").is_err());
    }

    #[test]
    fn test_on_date_keeps_calendar_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let instant = on_date(date, Utc::now());
        assert_eq!(instant.with_timezone(&Local).date_naive(), date);
    }
}
