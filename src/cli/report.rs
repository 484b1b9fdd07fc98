//! Report and dashboard CLI commands

use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::dashboard::Dashboard;
use crate::display::budget::format_budget_list;
use crate::display::report::{format_averages, format_category_lines, format_overview, format_trend};
use crate::display::transaction::format_day_groups;
use crate::display::NameLookup;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{GroupType, TransactionType};
use crate::preferences::PreferenceStore;
use crate::services::{date_range, ReportService, TransactionQuery};
use crate::storage::Storage;

use super::active_range;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income, expense and averages for the active range
    Overview,
    /// Income and expense per day, month or year
    Trend {
        /// Bucket size (day, month, year); follows the range if omitted
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Breakdown by category
    Categories {
        /// Transaction type (income, expense)
        #[arg(short = 't', long, default_value = "expense")]
        transaction_type: String,
    },
}

fn parse_group(input: &str) -> ExpenseResult<GroupType> {
    match input.to_lowercase().as_str() {
        "day" | "daily" => Ok(GroupType::Day),
        "month" | "monthly" => Ok(GroupType::Month),
        "year" | "yearly" => Ok(GroupType::Year),
        _ => Err(ExpenseError::Validation(format!(
            "Invalid group '{}'. Valid groups: day, month, year",
            input
        ))),
    }
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    prefs: &PreferenceStore,
    settings: &Settings,
    cmd: ReportCommands,
) -> ExpenseResult<()> {
    let service = ReportService::new(storage);
    let currency = prefs.currency(settings)?;
    let range = active_range(prefs, settings, Utc::now())?;
    let query = TransactionQuery::from_preferences(prefs, &range)?;
    let label = date_range::label(&range, &settings.date_format);

    match cmd {
        ReportCommands::Overview => {
            let overview = service.overview(
                &query,
                &range,
                &currency,
                settings.week_start(),
                &settings.date_format,
            )?;
            print!("{}", format_overview(&overview, &label));
            println!();
            println!("Averages");
            print!("{}", format_averages(&overview.averages));
        }

        ReportCommands::Trend { group } => {
            let group_type = match group {
                Some(g) => parse_group(&g)?,
                None => date_range::group_type(range.range_type),
            };
            println!("{} by {}", label, group_type);
            println!();
            print!("{}", format_trend(&service.trend(&query, group_type)?, &currency));
        }

        ReportCommands::Categories { transaction_type } => {
            let transaction_type = TransactionType::parse(&transaction_type)
                .filter(|t| !t.is_transfer())
                .ok_or_else(|| {
                    ExpenseError::Validation(format!(
                        "Invalid type '{}'. Valid types: income, expense",
                        transaction_type
                    ))
                })?;
            println!("{} by category: {}", transaction_type, label);
            println!();
            print!(
                "{}",
                format_category_lines(&service.categories(&query, transaction_type, &currency)?)
            );
        }
    }

    Ok(())
}

/// Print the dashboard: totals, this month's budgets and recent days
pub fn handle_dashboard_command(
    storage: Arc<Storage>,
    prefs: Arc<PreferenceStore>,
    settings: &Settings,
    json: bool,
) -> ExpenseResult<()> {
    let names = NameLookup::from_storage(&storage)?;
    let dashboard = Dashboard::new(storage, prefs, settings.clone());
    let snapshot = dashboard.snapshot(Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let currency = &snapshot.currency;
    println!("{}", snapshot.label);
    println!("  Income:  {}", currency.format(snapshot.totals.income));
    println!("  Expense: {}", currency.format(snapshot.totals.expense));
    println!("  Net:     {}", currency.format(snapshot.totals.net()));
    println!();

    if !snapshot.budgets.is_empty() {
        println!("Budgets");
        print!("{}", format_budget_list(&snapshot.budgets));
        println!();
    }

    print!("{}", format_day_groups(&snapshot.groups, &names, currency));
    Ok(())
}
