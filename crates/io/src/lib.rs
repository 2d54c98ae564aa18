// Dataset loading and report export

pub mod checklist;
pub mod csv;
pub mod error;
pub mod report;
pub mod xlsx;

use std::path::Path;

use bomrecon_recon::config::ColumnPatterns;
use bomrecon_recon::model::{CellValue, RawDataset};

pub use checklist::export_checklist;
pub use error::IoError;
pub use report::{export_report, write_rows_csv, write_summary_csv};

/// Extensions accepted by [`load_dataset`], lower-case, without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt", "xlsx", "xlsm", "xls", "ods"];

/// Load a tabular file into a dataset, choosing the reader by extension.
pub fn load_dataset(path: &Path) -> Result<RawDataset, IoError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "csv" | "txt" => self::csv::import(path)?,
        "tsv" => self::csv::import_tsv(path)?,
        "xlsx" | "xlsm" | "xls" | "ods" => xlsx::import(path)?,
        _ => return Err(IoError::UnsupportedFormat { extension }),
    };

    log::info!(
        "loaded {}: {} rows, {} columns",
        path.display(),
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Shared cell cleanup
// ---------------------------------------------------------------------------

/// Trimmed text cell; blank and the literal `nan` become empty.
pub(crate) fn text_cell(raw: &str) -> CellValue {
    let t = raw.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("nan") {
        CellValue::Empty
    } else {
        CellValue::text(t)
    }
}

/// Trimmed header names; blanks become `Unnamed: <index>`.
pub(crate) fn clean_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .enumerate()
        .map(|(i, h)| {
            let t = h.as_ref().trim();
            if t.is_empty() {
                format!("Unnamed: {i}")
            } else {
                t.to_string()
            }
        })
        .collect()
}

/// Headers that look like material identifiers, whose values must stay text.
pub(crate) fn is_identifier_header(header: &str) -> bool {
    let lower = header.trim().to_lowercase();
    ColumnPatterns::generic()
        .part_number
        .iter()
        .any(|p| lower.contains(&p.to_lowercase()))
}

/// Drop rows whose cells are all blank.
pub(crate) fn drop_blank_rows(rows: Vec<Vec<CellValue>>) -> Vec<Vec<CellValue>> {
    rows.into_iter()
        .filter(|r| r.iter().any(|c| !c.is_blank()))
        .collect()
}
