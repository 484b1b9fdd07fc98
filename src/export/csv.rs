//! CSV export
//!
//! Writes export rows with a header line. Quoting and escaping are handled
//! by the `csv` writer.

use std::io::Write;

use crate::error::ExpenseResult;

use super::ExportRow;

/// Write rows as CSV; the header is written even when there are no rows
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> ExpenseResult<()> {
    let mut csv_writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record([
        "Date",
        "Type",
        "Amount",
        "Category",
        "From Account",
        "To Account",
        "Notes",
    ])?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
