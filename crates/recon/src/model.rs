use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single scalar cell as handed over by the loader.
///
/// Serializes untagged: `null`, a JSON number, or a JSON string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Missing, or text that is blank after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Trimmed string form, `None` when blank.
    ///
    /// Integral numbers render without a fractional part so that a
    /// numeric part number `12345.0` keys as `12345`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Number(n) => Some(format_plain_number(*n)),
            Self::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
        }
    }

    /// Strict numeric view: `Some` for finite numbers and numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Lenient numeric coercion used for grouping: anything non-numeric is 0.
    pub fn to_quantity(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) => write!(f, "{}", format_plain_number(*n)),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

fn format_plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Tabular input for one source: named columns, rows of cells.
///
/// Column names are unique. Row order is preserved but carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawDataset {
    /// Build a dataset. Short rows are padded with empty cells, long rows truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, ReconError> {
        let mut seen = std::collections::HashSet::new();
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(ReconError::DuplicateColumn { column: c.clone() });
            }
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, CellValue::Empty);
                r
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    PartNumber,
    Quantity,
    Unit,
    Description,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 4] = [
        Self::PartNumber,
        Self::Quantity,
        Self::Unit,
        Self::Description,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PartNumber => "part_number",
            Self::Quantity => "quantity",
            Self::Unit => "unit",
            Self::Description => "description",
        }
    }

    /// Title-cased label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PartNumber => "Part Number",
            Self::Quantity => "Quantity",
            Self::Unit => "Unit",
            Self::Description => "Description",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw column chosen for one canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub column: Option<String>,
    pub confidence: f64,
}

impl FieldMatch {
    pub fn unmapped() -> Self {
        Self {
            column: None,
            confidence: 0.0,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.column.is_some()
    }
}

/// Inferred column mapping for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source_label: String,
    pub part_number: FieldMatch,
    pub quantity: FieldMatch,
    pub unit: FieldMatch,
    pub description: FieldMatch,
    pub is_valid: bool,
    pub unmapped: Vec<CanonicalField>,
}

impl ColumnMapping {
    pub fn new(
        source_label: impl Into<String>,
        part_number: FieldMatch,
        quantity: FieldMatch,
        unit: FieldMatch,
        description: FieldMatch,
    ) -> Self {
        let mut mapping = Self {
            source_label: source_label.into(),
            part_number,
            quantity,
            unit,
            description,
            is_valid: false,
            unmapped: Vec::new(),
        };
        mapping.unmapped = CanonicalField::ALL
            .into_iter()
            .filter(|f| !mapping.field(*f).is_mapped())
            .collect();
        mapping.is_valid = mapping.part_number.is_mapped();
        mapping
    }

    pub fn field(&self, field: CanonicalField) -> &FieldMatch {
        match field {
            CanonicalField::PartNumber => &self.part_number,
            CanonicalField::Quantity => &self.quantity,
            CanonicalField::Unit => &self.unit,
            CanonicalField::Description => &self.description,
        }
    }

    /// Column name mapped for `field`, if any.
    pub fn column(&self, field: CanonicalField) -> Option<&str> {
        self.field(field).column.as_deref()
    }

    /// One line per canonical field for human review.
    pub fn summary_lines(&self, high_similarity_threshold: f64) -> Vec<String> {
        CanonicalField::ALL
            .iter()
            .map(|f| {
                let m = self.field(*f);
                match &m.column {
                    Some(col) => {
                        let marker = if m.confidence >= high_similarity_threshold {
                            "high"
                        } else {
                            "low"
                        };
                        format!(
                            "{:<12} <- '{}' ({:.0}% confidence, {})",
                            f.label(),
                            col,
                            m.confidence * 100.0,
                            marker
                        )
                    }
                    None => format!("{:<12} <- unmapped", f.label()),
                }
            })
            .collect()
    }
}

/// A dataset row projected onto the canonical fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardLine {
    pub part_number: CellValue,
    pub quantity: CellValue,
    pub unit: CellValue,
    pub description: CellValue,
    pub source: String,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Grouping key = (part number, normalized unit).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineKey {
    pub part_number: String,
    pub unit: String,
}

/// Rows of one source sharing the same [`LineKey`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedLine {
    pub part_number: String,
    pub unit: String,
    pub quantity: f64,
    pub description: Option<String>,
    pub row_count: usize,
}

impl GroupedLine {
    pub fn key(&self) -> LineKey {
        LineKey {
            part_number: self.part_number.clone(),
            unit: self.unit.clone(),
        }
    }
}

/// One key from the union of both sides, with at most one grouped line per side.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePair {
    pub key: LineKey,
    pub reference: Option<GroupedLine>,
    pub comparison: Option<GroupedLine>,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconStatus {
    /// Quantities agree within tolerance.
    Correct,
    /// Comparison source holds less than the reference.
    Shortage,
    /// Comparison source holds more than the reference.
    Surplus,
}

impl ReconStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Shortage => "shortage",
            Self::Surplus => "surplus",
        }
    }

    /// Human-readable label for tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::Shortage => "Shortage",
            Self::Surplus => "Surplus",
        }
    }

    pub fn is_issue(&self) -> bool {
        !matches!(self, Self::Correct)
    }
}

impl fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One reconciled (part number, unit) key.
///
/// `*_quantity` is `None` when the key never appeared on that side, which is
/// distinct from `Some(0.0)` (present with zero quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconRow {
    pub part_number: String,
    pub unit: String,
    pub status: ReconStatus,
    pub issue: String,
    pub reference_quantity: Option<f64>,
    pub comparison_quantity: Option<f64>,
    pub reference_unit: Option<String>,
    pub comparison_unit: Option<String>,
    pub reference_description: Option<String>,
    pub comparison_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub descriptions_agree: Option<bool>,
}

impl ReconRow {
    /// Reference description, falling back to the comparison one.
    pub fn display_description(&self) -> Option<&str> {
        self.reference_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(self.comparison_description.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub total: usize,
    pub correct: usize,
    pub shortage: usize,
    pub surplus: usize,
    pub total_with_issues: usize,
    pub correct_pct: f64,
    pub issues_pct: f64,
}

impl StatusReport {
    /// Ordered (label, value) pairs for a one-row tabular export.
    pub fn as_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Parts", self.total.to_string()),
            ("Correct", self.correct.to_string()),
            ("Shortages (-)", self.shortage.to_string()),
            ("Surpluses (+)", self.surplus.to_string()),
            ("Total With Issues", self.total_with_issues.to_string()),
            ("Correct %", format!("{:.2}", self.correct_pct)),
            ("Issues %", format!("{:.2}", self.issues_pct)),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub reference_label: String,
    pub comparison_label: String,
    pub quantity_tolerance: f64,
    pub engine_version: String,
    pub run_at: String,
}

/// Caller-owned result of one comparison run.
///
/// Created by [`crate::engine::run`]; a new pair of inputs means a new run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconRun {
    pub meta: RunMeta,
    pub reference_mapping: ColumnMapping,
    pub comparison_mapping: ColumnMapping,
    pub report: StatusReport,
    pub rows: Vec<ReconRow>,
}

/// Row subsets offered to table views and exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFilter {
    #[default]
    All,
    Issues,
    Shortages,
    Surpluses,
}

impl RowFilter {
    pub fn accepts(&self, status: ReconStatus) -> bool {
        match self {
            Self::All => true,
            Self::Issues => status.is_issue(),
            Self::Shortages => status == ReconStatus::Shortage,
            Self::Surpluses => status == ReconStatus::Surplus,
        }
    }
}

/// Field-level overwrite of a finalized row. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowEdit {
    pub status: Option<ReconStatus>,
    pub issue: Option<String>,
    pub reference_quantity: Option<Option<f64>>,
    pub comparison_quantity: Option<Option<f64>>,
    pub reference_unit: Option<Option<String>>,
    pub comparison_unit: Option<Option<String>>,
    pub reference_description: Option<Option<String>>,
    pub comparison_description: Option<Option<String>>,
}
