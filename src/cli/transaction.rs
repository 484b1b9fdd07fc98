//! Transaction CLI commands
//!
//! Listing honours the stored filters; add and edit fall back to the default
//! account and categories.

use chrono::Utc;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::transaction::{format_day_groups, format_transaction_details};
use crate::display::NameLookup;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{AccountId, CategoryId, TransactionType};
use crate::preferences::PreferenceStore;
use crate::services::aggregation::group_by_day;
use crate::services::{
    date_range, AccountService, CategoryService, NewTransaction, TransactionQuery,
    TransactionService, TransactionUpdate,
};
use crate::storage::Storage;

use super::{active_range, on_date, parse_date, parse_money};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Amount (e.g., "12.50")
        amount: String,
        /// Transaction type (income, expense, transfer)
        #[arg(short = 't', long, default_value = "expense")]
        transaction_type: String,
        /// Category name or ID (default category if omitted)
        #[arg(short, long)]
        category: Option<String>,
        /// Account name or ID (default account if omitted)
        #[arg(short, long)]
        account: Option<String>,
        /// Destination account, transfers only
        #[arg(long)]
        to: Option<String>,
        /// Date (YYYY-MM-DD), today if omitted
        #[arg(short, long)]
        date: Option<String>,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List transactions in the active filter, grouped by day
    List {
        /// Number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show transaction details
    Show {
        /// Transaction ID
        transaction: String,
    },
    /// Edit a transaction
    Edit {
        /// Transaction ID
        transaction: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short = 't', long)]
        transaction_type: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        account: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        transaction: String,
    },
}

fn parse_transaction_type(input: &str) -> ExpenseResult<TransactionType> {
    TransactionType::parse(input).ok_or_else(|| {
        ExpenseError::Validation(format!(
            "Invalid transaction type: '{}'. Valid types: income, expense, transfer",
            input
        ))
    })
}

fn resolve_account(storage: &Storage, identifier: Option<&str>) -> ExpenseResult<Option<AccountId>> {
    identifier
        .map(|a| AccountService::new(storage).resolve(a).map(|found| found.id))
        .transpose()
}

fn resolve_category(storage: &Storage, identifier: Option<&str>) -> ExpenseResult<Option<CategoryId>> {
    identifier
        .map(|c| CategoryService::new(storage).resolve(c).map(|found| found.id))
        .transpose()
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    prefs: &PreferenceStore,
    settings: &Settings,
    cmd: TransactionCommands,
) -> ExpenseResult<()> {
    let service = TransactionService::new(storage).with_preferences(prefs);
    let currency = prefs.currency(settings)?;
    let now = Utc::now();

    match cmd {
        TransactionCommands::Add {
            amount,
            transaction_type,
            category,
            account,
            to,
            date,
            notes,
        } => {
            let transaction_type = parse_transaction_type(&transaction_type)?;
            let created_on = match date {
                Some(d) => on_date(parse_date(&d)?, now),
                None => now,
            };

            let mut input = NewTransaction::new(
                transaction_type,
                parse_money(&amount, "amount")?,
                created_on,
            );
            input.category_id = resolve_category(storage, category.as_deref())?;
            input.from_account_id = resolve_account(storage, account.as_deref())?;
            input.to_account_id = resolve_account(storage, to.as_deref())?;
            input.notes = notes;

            let txn = service.create(input)?;
            println!(
                "Recorded {} of {}",
                txn.transaction_type.to_string().to_lowercase(),
                currency.format(txn.amount)
            );
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List { limit } => {
            let range = active_range(prefs, settings, now)?;
            let query = TransactionQuery::from_preferences(prefs, &range)?;
            let transactions = service.list(&query, limit)?;
            let names = NameLookup::from_storage(storage)?;

            println!("{}", date_range::label(&range, &settings.date_format));
            println!();
            let groups = group_by_day(&transactions, &currency, &settings.date_format);
            print!("{}", format_day_groups(&groups, &names, &currency));
        }

        TransactionCommands::Show { transaction } => {
            let txn = service.resolve(&transaction)?;
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_transaction_details(&txn, &names, &currency));
        }

        TransactionCommands::Edit {
            transaction,
            amount,
            transaction_type,
            category,
            account,
            to,
            date,
            notes,
        } => {
            let txn = service.resolve(&transaction)?;

            let changes = TransactionUpdate {
                transaction_type: transaction_type
                    .as_deref()
                    .map(parse_transaction_type)
                    .transpose()?,
                amount: amount
                    .as_deref()
                    .map(|a| parse_money(a, "amount"))
                    .transpose()?,
                category_id: resolve_category(storage, category.as_deref())?,
                from_account_id: resolve_account(storage, account.as_deref())?,
                to_account_id: resolve_account(storage, to.as_deref())?.map(Some),
                created_on: date
                    .as_deref()
                    .map(|d| parse_date(d).map(|d| on_date(d, now)))
                    .transpose()?,
                notes,
            };

            let updated = service.update(txn.id, changes)?;
            println!("Updated transaction: {}", updated.id);
        }

        TransactionCommands::Delete { transaction } => {
            let txn = service.resolve(&transaction)?;
            let deleted = service.delete(txn.id)?;
            println!(
                "Deleted {} of {}",
                deleted.transaction_type.to_string().to_lowercase(),
                currency.format(deleted.amount)
            );
        }
    }

    Ok(())
}
