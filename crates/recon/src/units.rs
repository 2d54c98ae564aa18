use crate::config::UnitSynonyms;
use crate::model::CellValue;

/// Canonicalize a raw unit of measure.
///
/// Missing → `""`. Otherwise trimmed and upper-cased, then looked up in the
/// synonym table; an unknown unit is its own bucket.
pub fn normalize_unit(raw: &CellValue, table: &[UnitSynonyms]) -> String {
    match raw {
        CellValue::Empty => String::new(),
        CellValue::Number(_) => normalize_unit_str(&raw.to_string(), table),
        CellValue::Text(s) => normalize_unit_str(s, table),
    }
}

pub fn normalize_unit_str(raw: &str, table: &[UnitSynonyms]) -> String {
    let unit = raw.trim().to_uppercase();
    if unit.is_empty() {
        return unit;
    }

    for entry in table {
        let canonical = entry.canonical.trim().to_uppercase();
        if unit == canonical || entry.synonyms.iter().any(|s| s.trim().to_uppercase() == unit) {
            return canonical;
        }
    }

    unit
}
