//! Backup system for expense-cli
//!
//! Provides rolling backups with configurable retention policies and
//! restore functionality.
//!
//! # Backup Format
//!
//! Backups are JSON files named `backup-YYYYMMDD-HHMMSS-mmm.json` holding:
//! - `schema_version`: archive format version
//! - `created_at`: when the backup was taken
//! - `accounts`, `categories`, `transactions`, `budgets`: the data files
//! - `preferences`: the preference store
//!
//! A section that was never written is `null` and is skipped on restore.
//!
//! # Retention Policy
//!
//! The earliest backup of each calendar month counts as monthly; the rest
//! are daily. By default 30 daily and 12 monthly backups are kept.
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_cli::backup::{BackupManager, RestoreManager};
//!
//! let manager = BackupManager::new(paths.clone(), settings.backup_retention.clone());
//! let (backup_path, _removed) = manager.create_backup_with_retention()?;
//!
//! let result = RestoreManager::new(&storage, &prefs).restore_from_file(&backup_path)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupArchive, BackupInfo, BackupManager, ARCHIVE_SCHEMA_VERSION};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
