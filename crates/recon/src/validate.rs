//! Pairwise comparison primitives and dataset sanity checks.
//!
//! The comparison functions are total: malformed values degrade to a weaker
//! comparison instead of erroring.

use crate::config::UnitSynonyms;
use crate::error::ReconError;
use crate::model::{CellValue, RawDataset};
use crate::similarity::similarity;
use crate::units::normalize_unit;

/// Reject datasets the mapper cannot work with.
pub fn validate_dataset(dataset: &RawDataset, source_label: &str) -> Result<(), ReconError> {
    if dataset.columns().is_empty() {
        return Err(ReconError::NoColumns {
            source_label: source_label.to_string(),
        });
    }
    if dataset.is_empty() {
        return Err(ReconError::EmptyDataset {
            source_label: source_label.to_string(),
        });
    }
    Ok(())
}

/// Quantity agreement within a relative `tolerance` (inclusive).
///
/// Missing values count as 0. Both zero agree, exactly one zero never does.
/// When either side is non-numeric text the trimmed strings are compared instead.
pub fn validate_quantity(q1: &CellValue, q2: &CellValue, tolerance: f64) -> bool {
    let (a, b) = match (coerce(q1), coerce(q2)) {
        (Some(a), Some(b)) => (a, b),
        _ => return q1.to_string().trim() == q2.to_string().trim(),
    };

    if a == 0.0 && b == 0.0 {
        return true;
    }
    if a == 0.0 || b == 0.0 {
        return false;
    }

    let diff_pct = (a - b).abs() / a.abs().max(b.abs());
    diff_pct <= tolerance
}

/// `None` only for text that is not a number; blank counts as 0.
fn coerce(v: &CellValue) -> Option<f64> {
    if v.is_blank() {
        return Some(0.0);
    }
    v.as_number()
}

/// Units agree when their normalized forms are equal.
pub fn validate_unit(u1: &CellValue, u2: &CellValue, table: &[UnitSynonyms]) -> bool {
    normalize_unit(u1, table) == normalize_unit(u2, table)
}

/// Descriptions agree when both are missing, equal ignoring case and
/// surrounding whitespace, or similar at or above `threshold`.
pub fn validate_description(d1: Option<&str>, d2: Option<&str>, threshold: f64) -> bool {
    let d1 = d1.map(str::trim).filter(|s| !s.is_empty());
    let d2 = d2.map(str::trim).filter(|s| !s.is_empty());

    match (d1, d2) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            let a = a.to_lowercase();
            let b = b.to_lowercase();
            a == b || similarity(&a, &b) >= threshold
        }
        _ => false,
    }
}
