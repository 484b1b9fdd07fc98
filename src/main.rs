use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use expense_cli::cli::{
    handle_account_command, handle_backup_command, handle_budget_command, handle_category_command,
    handle_currency_command, handle_dashboard_command, handle_export_command,
    handle_filter_command, handle_report_command, handle_transaction_command,
};
use expense_cli::config::{paths::ExpensePaths, settings::Settings};
use expense_cli::logging;
use expense_cli::preferences::PreferenceStore;
use expense_cli::storage::{init::initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "expense",
    version,
    about = "Terminal-based personal expense tracker",
    long_about = "Track income, expenses and transfers across accounts, set monthly \
                  budgets, and summarise spending over any date range."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals, budgets and transactions for the active range
    Dashboard {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Account management commands
    #[command(subcommand)]
    Account(expense_cli::cli::AccountCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(expense_cli::cli::CategoryCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(expense_cli::cli::TransactionCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(expense_cli::cli::BudgetCommands),

    /// Date range, account, category and type filters
    #[command(subcommand)]
    Filter(expense_cli::cli::FilterCommands),

    /// Reports over the active filters
    #[command(subcommand)]
    Report(expense_cli::cli::ReportCommands),

    /// Currency selection
    #[command(subcommand)]
    Currency(expense_cli::cli::CurrencyCommands),

    /// Export transactions to CSV or PDF
    Export(expense_cli::cli::ExportArgs),

    /// Backup and restore
    #[command(subcommand)]
    Backup(expense_cli::cli::BackupCommands),

    /// Create default categories and a Cash account
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let paths = ExpensePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let storage = Arc::new(Storage::new(paths.clone())?);
    storage.load_all()?;
    let prefs = Arc::new(PreferenceStore::open(paths.preferences_file())?);

    match cli.command {
        Some(Commands::Dashboard { json }) => {
            handle_dashboard_command(storage, prefs, &settings, json)?;
        }
        Some(Commands::Account(cmd)) => {
            handle_account_command(&storage, &prefs, &settings, cmd)?;
        }
        Some(Commands::Category(cmd)) => {
            handle_category_command(&storage, &prefs, cmd)?;
        }
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&storage, &prefs, &settings, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&storage, &prefs, &settings, cmd)?;
        }
        Some(Commands::Filter(cmd)) => {
            handle_filter_command(&storage, &prefs, &settings, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, &prefs, &settings, cmd)?;
        }
        Some(Commands::Currency(cmd)) => {
            handle_currency_command(&prefs, &settings, cmd)?;
        }
        Some(Commands::Export(args)) => {
            handle_export_command(&storage, &prefs, &settings, args)?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&storage, &prefs, &settings, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing expense-cli at: {}", paths.base_dir().display());
            let seeded = if prefs.is_preloaded()? {
                paths.ensure_directories()?;
                false
            } else {
                initialize_storage(&paths)?
            };
            settings.save(&paths)?;
            storage.load_all()?;
            prefs.set_preloaded(true)?;
            prefs.set_onboarding_completed(true)?;

            if seeded {
                println!("Default categories and a Cash account have been created.");
            } else {
                println!("Existing data left unchanged.");
            }
            println!("Run 'expense category list' to see all categories.");
        }
        Some(Commands::Config) => {
            println!("expense-cli configuration");
            println!("=========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!();
            println!("Settings:");
            println!("  Date format:      {}", settings.date_format);
            println!("  Week starts:      {}", settings.week_start());
            println!("  Default currency: {}", settings.default_currency);
            println!("  Currency:         {}", prefs.currency(&settings)?.code);
        }
        None => {
            println!("expense-cli - personal expense tracker");
            println!();
            println!("Run 'expense --help' for usage information.");
            if !prefs.is_onboarding_completed()? {
                println!("Run 'expense init' to get started.");
            }
        }
    }

    Ok(())
}
