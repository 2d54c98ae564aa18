// Excel/ODS import and shared xlsx writing helpers

use std::path::Path;

use bomrecon_recon::model::{CellValue, RawDataset};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Worksheet, XlsxError};

use crate::error::IoError;
use crate::{clean_headers, drop_blank_rows, is_identifier_header, text_cell};

/// Widest auto-sized column, in Excel character units.
pub const MAX_COLUMN_WIDTH: f64 = 50.0;

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Import the first worksheet of a workbook (xlsx, xlsm, xls, ods).
///
/// The first row holds the headers. Numbers in identifier-like columns are
/// rendered as text (`12345.0` → `"12345"`); other numbers stay numeric.
pub fn import(path: &Path) -> Result<RawDataset, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IoError::read(path, e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(first) = sheet_names.first() else {
        return Err(IoError::parse(path, "workbook contains no sheets"));
    };
    if sheet_names.len() > 1 {
        log::debug!("{}: reading first sheet '{first}' of {}", path.display(), sheet_names.len());
    }

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| IoError::parse(path, format!("sheet '{first}': {e}")))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => clean_headers(header_row.iter().map(header_text)),
        None => Vec::new(),
    };
    let identifier: Vec<bool> = headers.iter().map(|h| is_identifier_header(h)).collect();

    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| convert_cell(cell, identifier.get(i).copied().unwrap_or(false)))
                .collect()
        })
        .collect();

    Ok(RawDataset::new(headers, drop_blank_rows(rows))?)
}

fn header_text(cell: &Data) -> String {
    match convert_cell(cell, true) {
        CellValue::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(cell: &Data, as_text: bool) -> CellValue {
    let number = |n: f64| {
        if as_text {
            CellValue::Number(n).as_text().map_or(CellValue::Empty, CellValue::Text)
        } else {
            CellValue::Number(n)
        }
    };

    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => text_cell(s),
        Data::Float(n) => number(*n),
        Data::Int(n) => number(*n as f64),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::Error(e) => CellValue::text(format!("#{e:?}")),
        Data::DateTime(dt) => number(dt.as_f64()),
        Data::DateTimeIso(s) => text_cell(s),
        Data::DurationIso(s) => text_cell(s),
    }
}

// ---------------------------------------------------------------------------
// Export helpers
// ---------------------------------------------------------------------------

// Fills: header, status rows, operator input cells
pub(crate) const HEADER_BLUE: u32 = 0x4472C4;
pub(crate) const CORRECT_GREEN: u32 = 0xC6EFCE;
pub(crate) const SHORTAGE_RED: u32 = 0xFFC7CE;
pub(crate) const SURPLUS_AMBER: u32 = 0xFFEB9C;
pub(crate) const INPUT_SHADE: u32 = 0xFFF2CC;

pub(crate) fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_BLUE))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
}

pub(crate) fn fill_format(rgb: u32) -> Format {
    Format::new()
        .set_background_color(Color::RGB(rgb))
        .set_border(FormatBorder::Thin)
}

/// Tracks the widest content per column and applies it at the end.
pub(crate) struct ColumnWidths(Vec<usize>);

impl ColumnWidths {
    pub(crate) fn new(headers: &[String]) -> Self {
        Self(headers.iter().map(|h| h.chars().count()).collect())
    }

    pub(crate) fn observe(&mut self, col: usize, text: &str) {
        let len = text.chars().count();
        if let Some(w) = self.0.get_mut(col) {
            *w = (*w).max(len);
        }
    }

    pub(crate) fn apply(&self, worksheet: &mut Worksheet) -> Result<(), XlsxError> {
        for (col, width) in self.0.iter().enumerate() {
            let width = (*width as f64 + 2.0).min(MAX_COLUMN_WIDTH);
            worksheet.set_column_width(col as u16, width)?;
        }
        Ok(())
    }
}
