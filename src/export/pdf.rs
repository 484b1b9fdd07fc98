//! PDF export
//!
//! Lays the export rows out as a fixed-column table on A4 pages using the
//! built-in Helvetica fonts, so no font files are needed. Those fonts only
//! draw plain ASCII reliably: currency symbols outside it are replaced by the
//! currency code and any other such character prints as `?`.

use std::io::{BufWriter, Write};

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Currency, SymbolPosition};

use super::ExportRow;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 12.0;
const LINE_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 8.0;

/// Column header, x offset (mm) and the widest text that fits
const COLUMNS: [(&str, f32, usize); 7] = [
    ("Date", MARGIN, 12),
    ("Type", 36.0, 9),
    ("Amount", 54.0, 15),
    ("Category", 82.0, 16),
    ("From", 112.0, 14),
    ("To", 139.0, 14),
    ("Notes", 166.0, 18),
];

fn export_error(e: impl std::fmt::Display) -> ExpenseError {
    ExpenseError::Export(e.to_string())
}

fn printable(c: char) -> bool {
    c == ' ' || c.is_ascii_graphic()
}

/// The currency as it should appear in a PDF cell
pub fn printable_currency(currency: &Currency) -> Currency {
    if currency.symbol.chars().all(printable) {
        return currency.clone();
    }
    let symbol = match currency.position {
        SymbolPosition::Prefix => format!("{} ", currency.code),
        SymbolPosition::Suffix => currency.code.clone(),
    };
    Currency {
        symbol,
        ..currency.clone()
    }
}

/// Shorten to `max` characters, marking the cut with "..."
fn fit(text: &str, max: usize) -> String {
    let text: String = text
        .chars()
        .map(|c| if printable(c) { c } else { '?' })
        .collect();
    if text.chars().count() <= max {
        return text;
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn cells(row: &ExportRow) -> [&str; 7] {
    [
        &row.date,
        &row.kind,
        &row.amount,
        &row.category,
        &row.from_account,
        &row.to_account,
        &row.notes,
    ]
}

struct Cursor {
    layer: PdfLayerReference,
    y: f32,
    page: usize,
}

impl Cursor {
    fn new_page(doc: &PdfDocumentReference, page: usize, bold: &IndirectFontRef) -> Self {
        let (page_index, layer_index) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}", page));
        let mut cursor = Self {
            layer: doc.get_page(page_index).get_layer(layer_index),
            y: PAGE_HEIGHT - MARGIN,
            page,
        };
        cursor.header(bold);
        cursor
    }

    fn header(&mut self, bold: &IndirectFontRef) {
        for (title, x, _) in COLUMNS {
            self.layer.use_text(title, FONT_SIZE, Mm(x), Mm(self.y), bold);
        }
        self.y -= LINE_HEIGHT;
    }

    fn has_room(&self) -> bool {
        self.y > MARGIN
    }
}

/// Render the rows as a PDF document
pub fn write_pdf<W: Write>(title: &str, rows: &[ExportRow], writer: W) -> ExpenseResult<()> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(export_error)?;

    let mut cursor = Cursor {
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - MARGIN,
        page: 1,
    };
    cursor.layer.use_text(fit(title, 90), 14.0, Mm(MARGIN), Mm(cursor.y), &bold);
    cursor.y -= LINE_HEIGHT * 2.0;
    cursor.header(&bold);

    if rows.is_empty() {
        cursor
            .layer
            .use_text("No transactions", FONT_SIZE, Mm(MARGIN), Mm(cursor.y), &regular);
    }

    for row in rows {
        if !cursor.has_room() {
            cursor = Cursor::new_page(&doc, cursor.page + 1, &bold);
        }
        for ((_, x, width), text) in COLUMNS.iter().zip(cells(row)) {
            cursor
                .layer
                .use_text(fit(text, *width), FONT_SIZE, Mm(*x), Mm(cursor.y), &regular);
        }
        cursor.y -= LINE_HEIGHT;
    }

    let mut out = BufWriter::new(writer);
    doc.save(&mut out).map_err(export_error)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    #[test]
    fn test_fit() {
        assert_eq!(fit("Food", 10), "Food");
        assert_eq!(fit("Entertainment", 8), "Enter...");
        assert_eq!(fit("Café ₩", 10), "Caf? ?");
    }

    #[test]
    fn test_printable_currency_uses_code_for_symbols_the_font_lacks() {
        let won = Currency::find("KRW").unwrap();
        assert_eq!(
            printable_currency(&won).format(Money::from_cents(-1250)),
            "-KRW 12.50"
        );

        let rupee = Currency::find("INR").unwrap().with_position(SymbolPosition::Suffix);
        assert_eq!(printable_currency(&rupee).format(Money::from_units(5)), "5.00 INR");

        let dollar = Currency::default();
        assert_eq!(printable_currency(&dollar), dollar);
    }

    #[test]
    fn test_many_rows_span_pages() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("long.pdf");
        let rows: Vec<_> = (0..120)
            .map(|i| ExportRow {
                date: "01/10/2026".into(),
                kind: "Expense".into(),
                amount: format!("-${}.00", i),
                category: "Groceries".into(),
                from_account: "Cash".into(),
                to_account: String::new(),
                notes: String::new(),
            })
            .collect();

        write_pdf("October", &rows, std::fs::File::create(&path).unwrap()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
