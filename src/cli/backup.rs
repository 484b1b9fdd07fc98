//! Backup CLI commands
//!
//! Create, inspect, restore and prune JSON backup archives.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use tabled::Tabled;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::settings::Settings;
use crate::display::render_table;
use crate::error::{ExpenseError, ExpenseResult};
use crate::preferences::PreferenceStore;
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create,

    /// List all available backups, newest first
    List,

    /// Restore from a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip the confirmation step
        #[arg(short, long)]
        force: bool,
    },

    /// Show what a backup contains
    Info {
        /// Backup filename or path
        backup: String,
    },

    /// Delete backups beyond the retention policy
    Prune,
}

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    prefs: &PreferenceStore,
    settings: &Settings,
    cmd: BackupCommands,
) -> ExpenseResult<()> {
    let manager = BackupManager::new(storage.paths().clone(), settings.backup_retention.clone());

    match cmd {
        BackupCommands::Create => {
            let (backup_path, pruned) = manager.create_backup_with_retention()?;
            println!("Backup created: {}", backup_path.display());
            if !pruned.is_empty() {
                println!("Pruned {} old backup(s).", pruned.len());
            }
        }

        BackupCommands::List => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: expense backup create");
                return Ok(());
            }

            let now = Utc::now();
            let rows = backups
                .iter()
                .enumerate()
                .map(|(i, b)| BackupRow {
                    index: i + 1,
                    filename: b.filename.clone(),
                    age: format_age(now.signed_duration_since(b.created_at)),
                    size: format_size(b.size_bytes),
                    monthly: if b.is_monthly { "yes".into() } else { String::new() },
                })
                .collect();
            print!("{}", render_table::<BackupRow>(rows));
        }

        BackupCommands::Restore { backup, force } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let restorer = RestoreManager::new(storage, prefs);
            let validation = restorer.validate_backup(&backup_path)?;

            println!("File:    {}", backup_path.display());
            println!(
                "Created: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Status:  {}", validation.summary());

            if !force {
                println!();
                println!("This will overwrite ALL current data.");
                println!("To proceed, run again with --force:");
                println!("  expense backup restore {} --force", backup);
                return Ok(());
            }

            let safety = manager.create_backup()?;
            println!("Saved current data to {}", safety.display());

            let result = restorer.restore_from_file(&backup_path)?;
            println!("{}", result.summary());
            if !result.all_restored() {
                println!("Sections missing from the backup were left untouched.");
            }
        }

        BackupCommands::Info { backup } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let validation = RestoreManager::new(storage, prefs).validate_backup(&backup_path)?;
            let size = std::fs::metadata(&backup_path)?.len();
            let yes_no = |present: bool| if present { "Yes" } else { "No" };

            println!("File:           {}", backup_path.display());
            println!("Size:           {}", format_size(size));
            println!(
                "Created:        {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Schema version: {}", validation.schema_version);
            println!("Accounts:       {}", yes_no(validation.has_accounts));
            println!("Categories:     {}", yes_no(validation.has_categories));
            println!("Transactions:   {}", yes_no(validation.has_transactions));
            println!("Budgets:        {}", yes_no(validation.has_budgets));
            println!("Preferences:    {}", yes_no(validation.has_preferences));
        }

        BackupCommands::Prune => {
            let deleted = manager.enforce_retention()?;
            let retention = &settings.backup_retention;
            println!(
                "Deleted {} backup(s). Keeping {} daily and {} monthly.",
                deleted.len(),
                retention.daily_count,
                retention.monthly_count
            );
        }
    }

    Ok(())
}

/// Resolve 'latest', a path, or a filename in the backup directory
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> ExpenseResult<PathBuf> {
    let not_found = || ExpenseError::NotFound {
        entity_type: "Backup",
        identifier: backup.to_string(),
    };

    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(not_found);
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    for candidate in [backup.to_string(), format!("{}.json", backup)] {
        let in_dir = manager.backup_dir().join(candidate);
        if in_dir.exists() {
            return Ok(in_dir);
        }
    }

    Err(not_found())
}

fn format_age(duration: chrono::Duration) -> String {
    let minutes = duration.num_minutes();
    if minutes < 1 {
        return format!("{}s", duration.num_seconds().max(0));
    }
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        format!("{}d", days)
    } else {
        format!("{}mo", days / 30)
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
