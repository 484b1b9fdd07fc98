//! CLI command for transaction export
//!
//! Writes the transactions in a range to CSV or PDF.

use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::{Args, ValueEnum};

use crate::config::settings::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::export::{export_transactions, ExportFileType, ExportRequest};
use crate::models::{DateRangeType, Selection};
use crate::preferences::PreferenceStore;
use crate::services::AccountService;
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// Printable table
    Pdf,
}

impl From<ExportFormat> for ExportFileType {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Csv => ExportFileType::Csv,
            ExportFormat::Pdf => ExportFileType::Pdf,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Range (today, week, month, year, all, custom); the active filter if omitted
    #[arg(short, long)]
    pub range: Option<String>,

    /// Accounts to include, comma-separated (all if omitted)
    #[arg(short, long, value_delimiter = ',')]
    pub accounts: Vec<String>,

    /// Output file path, `expenses-YYYYMMDD.<ext>` if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the export command
pub fn handle_export_command(
    storage: &Storage,
    prefs: &PreferenceStore,
    settings: &Settings,
    args: ExportArgs,
) -> ExpenseResult<()> {
    let file_type = ExportFileType::from(args.format);

    let range_type = match args.range {
        Some(range) => DateRangeType::parse(&range).ok_or_else(|| {
            ExpenseError::Validation(format!(
                "Invalid range '{}'. Valid ranges: today, week, month, year, all, custom",
                range
            ))
        })?,
        None => prefs.filter_type()?,
    };

    let service = AccountService::new(storage);
    let accounts = args
        .accounts
        .iter()
        .map(|a| service.resolve(a).map(|found| found.id))
        .collect::<ExpenseResult<Vec<_>>>()?;

    let path = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "expenses-{}.{}",
            Local::now().format("%Y%m%d"),
            file_type.extension()
        ))
    });

    let request = ExportRequest {
        file_type,
        range_type,
        accounts: Selection::from_items(accounts),
        path,
    };
    let written = export_transactions(storage, prefs, settings, &request, Utc::now())?;

    println!("Exported {} to {}", file_type, written.display());
    Ok(())
}
