use thiserror::Error;

use crate::model::CanonicalField;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (bad threshold, empty pattern list, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// Dataset has no rows.
    #[error("{source_label} dataset is empty")]
    EmptyDataset { source_label: String },

    /// Dataset has no columns.
    #[error("{source_label} dataset has no columns")]
    NoColumns { source_label: String },

    /// Two columns share the same name.
    #[error("duplicate column name '{column}'")]
    DuplicateColumn { column: String },

    /// Critical canonical fields could not be mapped to any column.
    #[error("{source_label}: could not map critical columns: {}", join_fields(.missing))]
    UnmappedFields {
        source_label: String,
        missing: Vec<CanonicalField>,
    },

    /// Part number was mapped, but with a confidence below the similarity threshold.
    #[error("{source_label}: low confidence in part number mapping ({confidence:.2})")]
    LowConfidence { source_label: String, confidence: f64 },

    /// Row edit targeted a row that does not exist.
    #[error("row index {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ReconError {
    /// True for errors that must block comparison until the mapping is fixed.
    pub fn is_mapping_error(&self) -> bool {
        matches!(self, Self::UnmappedFields { .. } | Self::LowConfidence { .. })
    }

    /// True for errors raised while validating the raw input datasets.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyDataset { .. } | Self::NoColumns { .. } | Self::DuplicateColumn { .. }
        )
    }
}
