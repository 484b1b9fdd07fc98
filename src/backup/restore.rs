//! Backup restoration for expense-cli
//!
//! Every section of an archive is parsed before anything is written, so a
//! damaged archive leaves the current data untouched. After the files are
//! replaced, storage is reloaded and the preference store swapped in place,
//! which notifies every observer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::error::{ExpenseError, ExpenseResult};
use crate::preferences::{PreferenceStore, PreferenceValue};
use crate::storage::{
    write_json_atomic, AccountData, BudgetData, CategoryData, DataChange, Storage, TransactionData,
};

use super::manager::{BackupArchive, ARCHIVE_SCHEMA_VERSION};

/// Handles restoring from backups
pub struct RestoreManager<'a> {
    storage: &'a Storage,
    prefs: &'a PreferenceStore,
}

/// An archive whose sections all parsed
struct ParsedArchive {
    created_at: DateTime<Utc>,
    accounts: Option<AccountData>,
    categories: Option<CategoryData>,
    transactions: Option<TransactionData>,
    budgets: Option<BudgetData>,
    preferences: Option<BTreeMap<String, PreferenceValue>>,
}

fn section<T: DeserializeOwned>(name: &str, value: &serde_json::Value) -> ExpenseResult<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| ExpenseError::Json(format!("Invalid {} in backup: {}", name, e)))
}

fn read_archive(backup_path: &Path) -> ExpenseResult<BackupArchive> {
    let contents = fs::read_to_string(backup_path)
        .map_err(|e| ExpenseError::Io(format!("Failed to read backup file: {}", e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| ExpenseError::Json(format!("Failed to parse backup file: {}", e)))
}

fn parse(archive: &BackupArchive) -> ExpenseResult<ParsedArchive> {
    if archive.schema_version > ARCHIVE_SCHEMA_VERSION {
        return Err(ExpenseError::Validation(format!(
            "Backup schema v{} is newer than supported v{}",
            archive.schema_version, ARCHIVE_SCHEMA_VERSION
        )));
    }

    Ok(ParsedArchive {
        created_at: archive.created_at,
        accounts: section("accounts", &archive.accounts)?,
        categories: section("categories", &archive.categories)?,
        transactions: section("transactions", &archive.transactions)?,
        budgets: section("budgets", &archive.budgets)?,
        preferences: section("preferences", &archive.preferences)?,
    })
}

fn restore_file<T: Serialize>(data: &Option<T>, path: &Path) -> ExpenseResult<bool> {
    match data {
        Some(data) => {
            write_json_atomic(path, data)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

impl<'a> RestoreManager<'a> {
    pub fn new(storage: &'a Storage, prefs: &'a PreferenceStore) -> Self {
        Self { storage, prefs }
    }

    /// Restore data from a backup file
    ///
    /// This overwrites the current data with the backup contents. Sections
    /// missing from the archive are left as they are.
    pub fn restore_from_file(&self, backup_path: &Path) -> ExpenseResult<RestoreResult> {
        self.restore_from_archive(&read_archive(backup_path)?)
    }

    pub fn restore_from_archive(&self, archive: &BackupArchive) -> ExpenseResult<RestoreResult> {
        let parsed = parse(archive)?;
        let paths = self.storage.paths();
        paths.ensure_directories()?;

        let result = RestoreResult {
            backup_date: parsed.created_at,
            accounts_restored: restore_file(&parsed.accounts, &paths.accounts_file())?,
            categories_restored: restore_file(&parsed.categories, &paths.categories_file())?,
            transactions_restored: restore_file(&parsed.transactions, &paths.transactions_file())?,
            budgets_restored: restore_file(&parsed.budgets, &paths.budgets_file())?,
            preferences_restored: parsed.preferences.is_some(),
        };

        self.storage.load_all()?;
        self.storage.notify(DataChange::All);

        if let Some(preferences) = parsed.preferences {
            self.prefs.replace_all(preferences)?;
        }

        info!(backup_date = %result.backup_date, "{}", result.summary());
        Ok(result)
    }

    /// Validate a backup file without restoring it
    pub fn validate_backup(&self, backup_path: &Path) -> ExpenseResult<ValidationResult> {
        let archive = read_archive(backup_path)?;
        let parsed = parse(&archive)?;

        Ok(ValidationResult {
            schema_version: archive.schema_version,
            backup_date: parsed.created_at,
            has_accounts: parsed.accounts.is_some(),
            has_categories: parsed.categories.is_some(),
            has_transactions: parsed.transactions.is_some(),
            has_budgets: parsed.budgets.is_some(),
            has_preferences: parsed.preferences.is_some(),
        })
    }
}

/// Result of a restore operation
#[derive(Debug)]
pub struct RestoreResult {
    pub backup_date: DateTime<Utc>,
    pub accounts_restored: bool,
    pub categories_restored: bool,
    pub transactions_restored: bool,
    pub budgets_restored: bool,
    pub preferences_restored: bool,
}

impl RestoreResult {
    fn sections(&self) -> [(&'static str, bool); 5] {
        [
            ("accounts", self.accounts_restored),
            ("categories", self.categories_restored),
            ("transactions", self.transactions_restored),
            ("budgets", self.budgets_restored),
            ("preferences", self.preferences_restored),
        ]
    }

    pub fn all_restored(&self) -> bool {
        self.sections().iter().all(|(_, restored)| *restored)
    }

    pub fn summary(&self) -> String {
        let parts: Vec<_> = self
            .sections()
            .iter()
            .filter(|(_, restored)| *restored)
            .map(|(name, _)| *name)
            .collect();
        if parts.is_empty() {
            "Restored: nothing".to_string()
        } else {
            format!("Restored: {}", parts.join(", "))
        }
    }
}

/// Result of validating a backup
#[derive(Debug)]
pub struct ValidationResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub has_accounts: bool,
    pub has_categories: bool,
    pub has_transactions: bool,
    pub has_budgets: bool,
    pub has_preferences: bool,
}

impl ValidationResult {
    fn sections(&self) -> [(&'static str, bool); 5] {
        [
            ("accounts", self.has_accounts),
            ("categories", self.has_categories),
            ("transactions", self.has_transactions),
            ("budgets", self.has_budgets),
            ("preferences", self.has_preferences),
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.sections().iter().all(|(_, present)| *present)
    }

    pub fn summary(&self) -> String {
        let (present, missing): (Vec<_>, Vec<_>) =
            self.sections().into_iter().partition(|(_, present)| *present);

        if missing.is_empty() {
            format!("Complete backup (v{})", self.schema_version)
        } else {
            let names = |list: Vec<(&str, bool)>| {
                list.into_iter().map(|(name, _)| name).collect::<Vec<_>>().join(", ")
            };
            format!(
                "Partial backup (v{}): has {}, missing {}",
                self.schema_version,
                names(present),
                names(missing)
            )
        }
    }
}
