//! Export module for expense-cli
//!
//! Writes the transactions of a date range and an account selection to a
//! file the caller chooses:
//! - CSV: spreadsheet-compatible, one row per transaction
//! - PDF: a printable paged table

pub mod csv;
pub mod pdf;

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::settings::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{AccountId, Currency, DateRangeType, Money, Selection, Transaction};
use crate::preferences::PreferenceStore;
use crate::services::{date_range, TransactionQuery};
use crate::storage::Storage;

pub use self::csv::write_csv;
pub use self::pdf::{printable_currency, write_pdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFileType {
    Csv,
    Pdf,
}

impl ExportFileType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

/// What to export and where
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub file_type: ExportFileType,
    pub range_type: DateRangeType,
    pub accounts: Selection<AccountId>,
    pub path: PathBuf,
}

/// One transaction flattened for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "From Account")]
    pub from_account: String,
    #[serde(rename = "To Account")]
    pub to_account: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

/// Export the selected transactions, returning the path written
pub fn export_transactions(
    storage: &Storage,
    prefs: &PreferenceStore,
    settings: &Settings,
    request: &ExportRequest,
    now: DateTime<Utc>,
) -> ExpenseResult<PathBuf> {
    let range = date_range::resolve(
        request.range_type,
        prefs.custom_range()?,
        now,
        settings.week_start(),
    );
    let query = TransactionQuery {
        accounts: request.accounts.clone(),
        ..TransactionQuery::in_range(&range)
    };
    let transactions = query.fetch(&storage.transactions)?;
    let currency = match request.file_type {
        ExportFileType::Csv => prefs.currency(settings)?,
        ExportFileType::Pdf => printable_currency(&prefs.currency(settings)?),
    };
    let rows = build_rows(storage, &transactions, &currency, &settings.date_format)?;

    match request.file_type {
        ExportFileType::Csv => {
            write_atomically(&request.path, |file| write_csv(&rows, file))?;
        }
        ExportFileType::Pdf => {
            let title = format!("Transactions: {}", date_range::label(&range, &settings.date_format));
            write_atomically(&request.path, |file| write_pdf(&title, &rows, file))?;
        }
    }

    info!(
        path = %request.path.display(),
        format = %request.file_type,
        rows = rows.len(),
        "Exported transactions"
    );
    Ok(request.path.clone())
}

/// Write through a sibling temp file that replaces `path` only once the
/// write has succeeded
fn write_atomically<F>(path: &Path, write: F) -> ExpenseResult<()>
where
    F: FnOnce(&mut File) -> ExpenseResult<()>,
{
    let cannot_write =
        |e: std::io::Error| ExpenseError::Export(format!("Cannot write {}: {}", path.display(), e));

    let mut temp_name = path
        .file_name()
        .ok_or_else(|| ExpenseError::Export(format!("Not a file path: {}", path.display())))?
        .to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = File::create(&temp_path)
        .map_err(|e| ExpenseError::Export(format!("Cannot create {}: {}", path.display(), e)))?;

    let written = write(&mut file).and_then(|()| file.sync_all().map_err(cannot_write));
    drop(file);
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        cannot_write(e)
    })
}

/// Resolve names and format amounts; unknown references show as "Unknown"
pub fn build_rows(
    storage: &Storage,
    transactions: &[Transaction],
    currency: &Currency,
    date_format: &str,
) -> ExpenseResult<Vec<ExportRow>> {
    let accounts: HashMap<_, _> = storage
        .accounts
        .get_all()?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let categories: HashMap<_, _> = storage
        .categories
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let unknown = || "Unknown".to_string();

    Ok(transactions
        .iter()
        .map(|txn| ExportRow {
            date: txn
                .created_on
                .with_timezone(&Local)
                .format(date_format)
                .to_string(),
            kind: txn.transaction_type.to_string(),
            amount: currency.format(export_amount(txn)),
            category: categories
                .get(&txn.category_id)
                .cloned()
                .unwrap_or_else(unknown),
            from_account: accounts
                .get(&txn.from_account_id)
                .cloned()
                .unwrap_or_else(unknown),
            to_account: txn
                .to_account_id
                .map(|id| accounts.get(&id).cloned().unwrap_or_else(unknown))
                .unwrap_or_default(),
            notes: txn.notes.clone(),
        })
        .collect())
}

/// Transfers keep their magnitude so the row still says how much moved
fn export_amount(txn: &Transaction) -> Money {
    if txn.transaction_type.is_transfer() {
        txn.amount
    } else {
        txn.signed_amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ExpensePaths;
    use crate::models::{Account, AccountType, Category, CategoryType, TransactionType};
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage, Account, Account) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(ExpensePaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();

        let cash = Account::new("Cash", AccountType::Regular);
        let bank = Account::new("Bank", AccountType::Bank);
        let food = Category::new("Food", CategoryType::Expense);
        let now = Utc::now();

        let mut lunch = Transaction::new(TransactionType::Expense, Money::from_cents(1250), food.id, cash.id, now);
        lunch.notes = "Lunch, with \"friends\"".into();
        storage.transactions.upsert(lunch).unwrap();
        storage
            .transactions
            .upsert(Transaction::transfer(Money::from_units(100), food.id, bank.id, cash.id, now))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::new(TransactionType::Expense, Money::from_units(7), food.id, bank.id, now))
            .unwrap();

        storage.accounts.upsert(cash.clone()).unwrap();
        storage.accounts.upsert(bank.clone()).unwrap();
        storage.categories.upsert(food).unwrap();
        (temp_dir, storage, cash, bank)
    }

    #[test]
    fn test_file_type_parse() {
        assert_eq!(ExportFileType::parse("CSV"), Some(ExportFileType::Csv));
        assert_eq!(ExportFileType::parse("pdf"), Some(ExportFileType::Pdf));
        assert_eq!(ExportFileType::parse("xls"), None);
    }

    #[test]
    fn test_export_csv_for_selected_account() {
        let (temp_dir, storage, cash, _) = setup();
        let prefs = PreferenceStore::in_memory();
        let path = temp_dir.path().join("out.csv");

        let request = ExportRequest {
            file_type: ExportFileType::Csv,
            range_type: DateRangeType::ThisMonth,
            accounts: Selection::Only(vec![cash.id]),
            path: path.clone(),
        };
        let written =
            export_transactions(&storage, &prefs, &Settings::default(), &request, Utc::now()).unwrap();
        assert_eq!(written, path);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines[0], "Date,Type,Amount,Category,From Account,To Account,Notes");
        // The lunch plus the transfer into cash
        assert_eq!(lines.len(), 3);
        assert!(contents.contains("-$12.50"));
        assert!(contents.contains("\"Lunch, with \"\"friends\"\"\""));
        assert!(contents.contains("Transfer,$100.00,Food,Bank,Cash"));
    }

    #[test]
    fn test_export_pdf() {
        let (temp_dir, storage, _, _) = setup();
        let prefs = PreferenceStore::in_memory();
        let path = temp_dir.path().join("out.pdf");

        let request = ExportRequest {
            file_type: ExportFileType::Pdf,
            range_type: DateRangeType::All,
            accounts: Selection::All,
            path: path.clone(),
        };
        export_transactions(&storage, &prefs, &Settings::default(), &request, Utc::now()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        std::fs::write(&path, "previous export").unwrap();

        let result = write_atomically(&path, |file| {
            use std::io::Write;
            file.write_all(b"Date,Type")?;
            Err(ExpenseError::Export("disk full".into()))
        });

        assert!(matches!(result, Err(ExpenseError::Export(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous export");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_export_pdf_amounts_use_printable_currency() {
        let (_temp_dir, storage, _, _) = setup();
        let won = Currency::find("KRW").unwrap();
        let transactions = storage.transactions.get_all().unwrap();

        let rows = build_rows(&storage, &transactions, &printable_currency(&won), "%d/%m/%Y").unwrap();
        assert!(rows.iter().any(|r| r.amount == "-KRW 12.50"));
        assert!(rows.iter().all(|r| !r.amount.contains('₩')));
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let (temp_dir, storage, _, _) = setup();
        let prefs = PreferenceStore::in_memory();

        let request = ExportRequest {
            file_type: ExportFileType::Csv,
            range_type: DateRangeType::All,
            accounts: Selection::All,
            path: temp_dir.path().join("missing").join("out.csv"),
        };
        let result = export_transactions(&storage, &prefs, &Settings::default(), &request, Utc::now());
        assert!(matches!(result, Err(ExpenseError::Export(_))));
    }
}
