//! Filter CLI commands
//!
//! The date range, account, category and type filters are stored as
//! preferences and shared by every listing and report.

use chrono::{Duration, Utc};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{DateRangeType, Selection, TransactionType};
use crate::preferences::PreferenceStore;
use crate::services::{date_range, AccountService, CategoryService};
use crate::storage::Storage;

use super::{active_range, parse_date};

/// Filter subcommands
#[derive(Subcommand)]
pub enum FilterCommands {
    /// Show the active filters
    Show,
    /// Select a preset range (today, week, month, year, all)
    Range {
        range: String,
    },
    /// Select a custom range; both dates are inclusive
    Custom {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: String,
    },
    /// Limit to transaction types; none means all
    Types {
        types: Vec<String>,
    },
    /// Limit to accounts; none means all
    Accounts {
        accounts: Vec<String>,
    },
    /// Limit to categories; none means all
    Categories {
        categories: Vec<String>,
    },
    /// Clear account, category and type selections
    Reset,
}

/// Handle a filter command
pub fn handle_filter_command(
    storage: &Storage,
    prefs: &PreferenceStore,
    settings: &Settings,
    cmd: FilterCommands,
) -> ExpenseResult<()> {
    match cmd {
        FilterCommands::Show => {
            let range = active_range(prefs, settings, Utc::now())?;
            println!("Range:      {}", date_range::label(&range, &settings.date_format));
            println!("Types:      {}", describe_types(&prefs.transaction_types()?));

            let accounts = prefs.selected_accounts()?;
            let accounts = if accounts.is_all() {
                "All".to_string()
            } else {
                let service = AccountService::new(storage);
                accounts
                    .items()
                    .iter()
                    .map(|id| {
                        service
                            .get(*id)
                            .ok()
                            .flatten()
                            .map_or_else(|| id.to_string(), |a| a.name)
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            println!("Accounts:   {}", accounts);

            let categories = prefs.selected_categories()?;
            let categories = if categories.is_all() {
                "All".to_string()
            } else {
                let service = CategoryService::new(storage);
                categories
                    .items()
                    .iter()
                    .map(|id| {
                        service
                            .get(*id)
                            .ok()
                            .flatten()
                            .map_or_else(|| id.to_string(), |c| c.name)
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            println!("Categories: {}", categories);
        }

        FilterCommands::Range { range } => {
            let range_type = DateRangeType::parse(&range)
                .filter(|t| *t != DateRangeType::Custom)
                .ok_or_else(|| {
                    ExpenseError::Validation(format!(
                        "Invalid range '{}'. Valid ranges: today, week, month, year, all",
                        range
                    ))
                })?;
            prefs.set_filter_type(range_type)?;
            println!("Range set to {}", range_type);
        }

        FilterCommands::Custom { from, to } => {
            let start = date_range::local_midnight(parse_date(&from)?);
            let end = date_range::local_midnight(parse_date(&to)? + Duration::days(1))
                - Duration::milliseconds(1);

            prefs.set_custom_range(start, end)?;
            prefs.set_filter_type(DateRangeType::Custom)?;

            let range = active_range(prefs, settings, Utc::now())?;
            println!("Range set to {}", date_range::label(&range, &settings.date_format));
        }

        FilterCommands::Types { types } => {
            let parsed = types
                .iter()
                .map(|t| {
                    TransactionType::parse(t).ok_or_else(|| {
                        ExpenseError::Validation(format!(
                            "Invalid transaction type: '{}'. Valid types: income, expense, transfer",
                            t
                        ))
                    })
                })
                .collect::<ExpenseResult<Vec<_>>>()?;
            let selection = Selection::from_items(parsed);
            prefs.set_transaction_types(&selection)?;
            println!("Types: {}", describe_types(&selection));
        }

        FilterCommands::Accounts { accounts } => {
            let service = AccountService::new(storage);
            let ids = accounts
                .iter()
                .map(|a| service.resolve(a).map(|found| found.id))
                .collect::<ExpenseResult<Vec<_>>>()?;
            let count = ids.len();
            prefs.set_selected_accounts(&Selection::from_items(ids))?;
            if count == 0 {
                println!("Showing all accounts.");
            } else {
                println!("Showing {} account(s).", count);
            }
        }

        FilterCommands::Categories { categories } => {
            let service = CategoryService::new(storage);
            let ids = categories
                .iter()
                .map(|c| service.resolve(c).map(|found| found.id))
                .collect::<ExpenseResult<Vec<_>>>()?;
            let count = ids.len();
            prefs.set_selected_categories(&Selection::from_items(ids))?;
            if count == 0 {
                println!("Showing all categories.");
            } else {
                println!("Showing {} categories.", count);
            }
        }

        FilterCommands::Reset => {
            prefs.set_transaction_types(&Selection::All)?;
            prefs.set_selected_accounts(&Selection::All)?;
            prefs.set_selected_categories(&Selection::All)?;
            println!("Filters cleared.");
        }
    }

    Ok(())
}

fn describe_types(types: &Selection<TransactionType>) -> String {
    if types.is_all() {
        "All".to_string()
    } else {
        types
            .items()
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
