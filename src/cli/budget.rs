//! Budget CLI commands
//!
//! Budgets are monthly spending limits over a set of accounts and
//! categories. Listing evaluates spend against today's date.

use chrono::Local;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::budget::{format_budget_details, format_budget_list};
use crate::display::NameLookup;
use crate::error::ExpenseResult;
use crate::models::{AccountId, CategoryId, Selection};
use crate::preferences::PreferenceStore;
use crate::services::{AccountService, BudgetService, BudgetUpdate, CategoryService};
use crate::storage::Storage;

use super::parse_money;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a budget
    Create {
        /// Budget name
        name: String,
        /// Spending limit (e.g., "400")
        amount: String,
        /// Month as MM-YYYY, current month if omitted
        #[arg(short, long)]
        month: Option<String>,
        /// Accounts to include, comma-separated (all if omitted)
        #[arg(short, long, value_delimiter = ',')]
        accounts: Vec<String>,
        /// Expense categories to include, comma-separated (all if omitted)
        #[arg(short, long, value_delimiter = ',')]
        categories: Vec<String>,
    },
    /// List budgets with spend
    List {
        /// Only budgets for this month (MM-YYYY)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show one budget
    Show {
        /// Budget name or ID
        budget: String,
    },
    /// Edit a budget
    Edit {
        /// Budget name or ID
        budget: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short, long)]
        month: Option<String>,
        #[arg(short, long, value_delimiter = ',', conflicts_with = "all_accounts")]
        accounts: Vec<String>,
        /// Track every account again
        #[arg(long)]
        all_accounts: bool,
        #[arg(short, long, value_delimiter = ',', conflicts_with = "all_categories")]
        categories: Vec<String>,
        /// Track every category again
        #[arg(long)]
        all_categories: bool,
    },
    /// Delete a budget
    Delete {
        /// Budget name or ID
        budget: String,
    },
}

fn account_selection(storage: &Storage, names: &[String]) -> ExpenseResult<Selection<AccountId>> {
    let service = AccountService::new(storage);
    let ids = names
        .iter()
        .map(|n| service.resolve(n).map(|a| a.id))
        .collect::<ExpenseResult<Vec<_>>>()?;
    Ok(Selection::from_items(ids))
}

fn category_selection(storage: &Storage, names: &[String]) -> ExpenseResult<Selection<CategoryId>> {
    let service = CategoryService::new(storage);
    let ids = names
        .iter()
        .map(|n| service.resolve(n).map(|c| c.id))
        .collect::<ExpenseResult<Vec<_>>>()?;
    Ok(Selection::from_items(ids))
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    prefs: &PreferenceStore,
    settings: &Settings,
    cmd: BudgetCommands,
) -> ExpenseResult<()> {
    let service = BudgetService::new(storage);
    let currency = prefs.currency(settings)?;
    let today = Local::now().date_naive();

    match cmd {
        BudgetCommands::Create {
            name,
            amount,
            month,
            accounts,
            categories,
        } => {
            let month = month.unwrap_or_else(BudgetService::current_month);
            let budget = service.create(
                &name,
                parse_money(&amount, "amount")?,
                &month,
                account_selection(storage, &accounts)?,
                category_selection(storage, &categories)?,
            )?;

            println!("Created budget: {}", budget.name);
            println!("  Month: {}", budget.selected_month);
            println!("  Limit: {}", currency.format(budget.amount));
            println!("  ID: {}", budget.id);
        }

        BudgetCommands::List { month } => {
            let summaries = service.evaluate_all(month.as_deref(), &currency, today)?;
            print!("{}", format_budget_list(&summaries));
        }

        BudgetCommands::Show { budget } => {
            let found = service.resolve(&budget)?;
            let summary = service.evaluate(&found, &currency, today);
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_budget_details(&summary, &names));
        }

        BudgetCommands::Edit {
            budget,
            name,
            amount,
            month,
            accounts,
            all_accounts,
            categories,
            all_categories,
        } => {
            let found = service.resolve(&budget)?;

            let accounts = if all_accounts {
                Some(Selection::All)
            } else if accounts.is_empty() {
                None
            } else {
                Some(account_selection(storage, &accounts)?)
            };
            let categories = if all_categories {
                Some(Selection::All)
            } else if categories.is_empty() {
                None
            } else {
                Some(category_selection(storage, &categories)?)
            };

            let changes = BudgetUpdate {
                name,
                amount: amount
                    .as_deref()
                    .map(|a| parse_money(a, "amount"))
                    .transpose()?,
                selected_month: month,
                accounts,
                categories,
            };

            let updated = service.update(found.id, changes)?;
            println!("Updated budget: {}", updated.name);
        }

        BudgetCommands::Delete { budget } => {
            let found = service.resolve(&budget)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted budget: {}", deleted.name);
        }
    }

    Ok(())
}
