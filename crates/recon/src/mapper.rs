use crate::config::{ColumnPatterns, ReconConfig};
use crate::error::ReconError;
use crate::model::{CanonicalField, CellValue, ColumnMapping, FieldMatch, RawDataset, StandardLine};
use crate::similarity::similarity;

/// Score awarded when a pattern and a column name contain one another.
pub const SUBSTRING_SCORE: f64 = 0.9;

// ---------------------------------------------------------------------------
// Column search
// ---------------------------------------------------------------------------

/// Pick the column that best matches any of `patterns`.
///
/// Exact (case-insensitive) match wins immediately with 1.0. Otherwise
/// substring containment in either direction scores [`SUBSTRING_SCORE`] and
/// fuzzy similarity counts only at or above `threshold`. Strictly-greater
/// comparison means ties keep the first column seen.
pub fn find_similar_column(columns: &[String], patterns: &[String], threshold: f64) -> FieldMatch {
    let mut best: Option<&str> = None;
    let mut best_score = 0.0_f64;

    for col in columns {
        let col_lower = col.trim().to_lowercase();
        if col_lower.is_empty() {
            continue;
        }

        for pattern in patterns {
            let pattern_lower = pattern.to_lowercase();
            if pattern_lower.trim().is_empty() {
                continue;
            }

            if col_lower == pattern_lower {
                return FieldMatch {
                    column: Some(col.clone()),
                    confidence: 1.0,
                };
            }

            let score = if pattern_lower.contains(&col_lower) || col_lower.contains(&pattern_lower) {
                SUBSTRING_SCORE
            } else {
                let s = similarity(&col_lower, &pattern_lower);
                if s < threshold {
                    continue;
                }
                s
            };

            if score > best_score {
                best_score = score;
                best = Some(col);
            }
        }
    }

    match best {
        Some(col) => FieldMatch {
            column: Some(col.to_string()),
            confidence: best_score,
        },
        None => FieldMatch::unmapped(),
    }
}

/// Infer the column mapping of `dataset` using the pattern set for `source_label`.
pub fn map_columns(dataset: &RawDataset, source_label: &str, config: &ReconConfig) -> ColumnMapping {
    let patterns = config.patterns_for(source_label);
    map_with_patterns(dataset, source_label, &patterns, config.matching.similarity_threshold)
}

pub fn map_with_patterns(
    dataset: &RawDataset,
    source_label: &str,
    patterns: &ColumnPatterns,
    threshold: f64,
) -> ColumnMapping {
    let columns = dataset.columns();
    let find = |field| find_similar_column(columns, patterns.for_field(field), threshold);

    let mapping = ColumnMapping::new(
        source_label,
        find(CanonicalField::PartNumber),
        find(CanonicalField::Quantity),
        find(CanonicalField::Unit),
        find(CanonicalField::Description),
    );

    for field in CanonicalField::ALL {
        let m = mapping.field(field);
        match &m.column {
            Some(col) => log::info!(
                "{source_label}: {field} -> '{col}' (confidence {:.2})",
                m.confidence
            ),
            None => log::info!("{source_label}: {field} unmapped"),
        }
    }

    mapping
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject a mapping without a part number column, or whose part number
/// confidence is below `threshold`.
pub fn validate_mapping(mapping: &ColumnMapping, threshold: f64) -> Result<(), ReconError> {
    if !mapping.is_valid {
        return Err(ReconError::UnmappedFields {
            source_label: mapping.source_label.clone(),
            missing: mapping.unmapped.clone(),
        });
    }

    let confidence = mapping.part_number.confidence;
    if confidence < threshold {
        return Err(ReconError::LowConfidence {
            source_label: mapping.source_label.clone(),
            confidence,
        });
    }

    Ok(())
}

/// Warn about mapped fields whose confidence is below `high_threshold`.
pub(crate) fn warn_weak_fields(mapping: &ColumnMapping, high_threshold: f64) {
    for field in CanonicalField::ALL {
        let m = mapping.field(field);
        if let Some(col) = &m.column {
            if m.confidence < high_threshold {
                log::warn!(
                    "{}: {} mapped to '{}' with low confidence ({:.0}%)",
                    mapping.source_label,
                    field.label(),
                    col,
                    m.confidence * 100.0
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project every row of `dataset` onto the canonical fields.
pub fn standardize(dataset: &RawDataset, mapping: &ColumnMapping) -> Vec<StandardLine> {
    let index = |field| mapping.column(field).and_then(|c| dataset.column_index(c));
    let part_idx = index(CanonicalField::PartNumber);
    let qty_idx = index(CanonicalField::Quantity);
    let unit_idx = index(CanonicalField::Unit);
    let desc_idx = index(CanonicalField::Description);

    let cell = |row: &[CellValue], idx: Option<usize>| -> CellValue {
        idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
    };

    dataset
        .rows()
        .iter()
        .map(|row| StandardLine {
            part_number: cell(row, part_idx),
            quantity: cell(row, qty_idx),
            unit: cell(row, unit_idx),
            description: cell(row, desc_idx),
            source: mapping.source_label.clone(),
        })
        .collect()
}
