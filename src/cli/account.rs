//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::account::{format_account_details, format_account_list};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::AccountType;
use crate::preferences::PreferenceStore;
use crate::services::{AccountService, AccountUpdate};
use crate::storage::Storage;

use super::parse_money;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account type (regular, bank, credit)
        #[arg(short = 't', long, default_value = "regular")]
        account_type: String,
        /// Starting balance (e.g., "1000.00" or "1000")
        #[arg(short, long, default_value = "0")]
        balance: String,
        /// Credit limit, credit cards only
        #[arg(long)]
        limit: Option<String>,
    },
    /// List all accounts with balances
    List,
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Edit an account
    Edit {
        /// Account name or ID
        account: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New account type
        #[arg(short = 't', long)]
        account_type: Option<String>,
        /// New credit limit
        #[arg(long)]
        limit: Option<String>,
        /// Remove the credit limit
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
    },
    /// Delete an account with no transactions
    Delete {
        /// Account name or ID
        account: String,
    },
    /// Set or clear the account used when none is given
    Default {
        /// Account name or ID; omit to clear
        account: Option<String>,
    },
    /// Reorder accounts
    Reorder {
        /// Account names or IDs in the new order
        #[arg(required = true)]
        accounts: Vec<String>,
    },
}

fn parse_account_type(input: &str) -> ExpenseResult<AccountType> {
    AccountType::parse(input).ok_or_else(|| {
        ExpenseError::Validation(format!(
            "Invalid account type: '{}'. Valid types: regular, bank, credit",
            input
        ))
    })
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    prefs: &PreferenceStore,
    settings: &Settings,
    cmd: AccountCommands,
) -> ExpenseResult<()> {
    let service = AccountService::new(storage);
    let currency = prefs.currency(settings)?;

    match cmd {
        AccountCommands::Create {
            name,
            account_type,
            balance,
            limit,
        } => {
            let account_type = parse_account_type(&account_type)?;
            let starting_balance = parse_money(&balance, "balance")?;
            let credit_limit = limit
                .as_deref()
                .map(|l| parse_money(l, "credit limit"))
                .transpose()?;

            let account = service.create(&name, account_type, starting_balance, credit_limit)?;

            println!("Created account: {}", account.name);
            println!("  Type: {}", account.account_type);
            println!(
                "  Starting Balance: {}",
                currency.format(account.starting_balance)
            );
            println!("  ID: {}", account.id);
        }

        AccountCommands::List => {
            let summaries = service.list_with_balances()?;
            print!("{}", format_account_list(&summaries, &currency));
        }

        AccountCommands::Show { account } => {
            let found = service.resolve(&account)?;
            let summary = service.get_summary(&found)?;
            print!("{}", format_account_details(&summary, &currency));
        }

        AccountCommands::Edit {
            account,
            name,
            account_type,
            limit,
            no_limit,
        } => {
            let found = service.resolve(&account)?;

            let credit_limit = if no_limit {
                Some(None)
            } else {
                limit
                    .as_deref()
                    .map(|l| parse_money(l, "credit limit").map(Some))
                    .transpose()?
            };
            let changes = AccountUpdate {
                name,
                account_type: account_type.as_deref().map(parse_account_type).transpose()?,
                credit_limit,
                ..Default::default()
            };

            if changes.name.is_none()
                && changes.account_type.is_none()
                && changes.credit_limit.is_none()
            {
                println!("No changes specified. Use --name, --type or --limit.");
                return Ok(());
            }

            let updated = service.update(found.id, changes)?;
            println!("Updated account: {}", updated.name);
        }

        AccountCommands::Delete { account } => {
            let found = service.resolve(&account)?;
            let deleted = service.delete(found.id)?;

            if prefs.default_account()? == Some(deleted.id) {
                prefs.set_default_account(None)?;
            }
            println!("Deleted account: {}", deleted.name);
        }

        AccountCommands::Default { account } => match account {
            Some(account) => {
                let found = service.resolve(&account)?;
                prefs.set_default_account(Some(found.id))?;
                println!("Default account: {}", found.name);
            }
            None => {
                prefs.set_default_account(None)?;
                println!("Default account cleared.");
            }
        },

        AccountCommands::Reorder { accounts } => {
            let order = accounts
                .iter()
                .map(|a| service.resolve(a).map(|found| found.id))
                .collect::<ExpenseResult<Vec<_>>>()?;
            let reordered = service.reorder(&order)?;

            println!("Account order:");
            for (i, account) in reordered.iter().enumerate() {
                println!("  {}. {}", i + 1, account.name);
            }
        }
    }

    Ok(())
}
