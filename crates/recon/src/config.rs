use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::CanonicalField;

/// Key in [`ReconConfig::patterns`] used for any source without its own entry.
pub const GENERIC_PATTERNS: &str = "generic";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Column name patterns keyed by source label, plus a `generic` fallback.
    #[serde(default = "default_patterns")]
    pub patterns: BTreeMap<String, ColumnPatterns>,
    /// Canonical unit table. Order matters: the first entry that matches wins.
    #[serde(default = "default_units")]
    pub units: Vec<UnitSynonyms>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            tolerance: ToleranceConfig::default(),
            matching: MatchingConfig::default(),
            patterns: default_patterns(),
            units: default_units(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Labels for the two sides. The reference side is the master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub reference: String,
    pub comparison: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            reference: "SAP".into(),
            comparison: "HPLM".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tolerance + Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// Relative quantity tolerance (0.01 = 1%).
    pub quantity: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self { quantity: 0.01 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum fuzzy score for a column candidate; also the floor for part number confidence.
    pub similarity_threshold: f64,
    /// Confidence at or above which a mapping is shown as high-confidence.
    pub high_similarity_threshold: f64,
    /// Minimum similarity for two descriptions to be considered the same.
    pub description_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            high_similarity_threshold: 0.9,
            description_threshold: 0.8,
        }
    }
}

// ---------------------------------------------------------------------------
// Column patterns
// ---------------------------------------------------------------------------

/// Accepted raw column names per canonical field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnPatterns {
    pub part_number: Vec<String>,
    pub quantity: Vec<String>,
    pub unit: Vec<String>,
    pub description: Vec<String>,
}

impl ColumnPatterns {
    fn from_lists(part_number: &[&str], quantity: &[&str], unit: &[&str], description: &[&str]) -> Self {
        let owned = |l: &[&str]| l.iter().map(|s| s.to_string()).collect();
        Self {
            part_number: owned(part_number),
            quantity: owned(quantity),
            unit: owned(unit),
            description: owned(description),
        }
    }

    pub fn for_field(&self, field: CanonicalField) -> &[String] {
        match field {
            CanonicalField::PartNumber => &self.part_number,
            CanonicalField::Quantity => &self.quantity,
            CanonicalField::Unit => &self.unit,
            CanonicalField::Description => &self.description,
        }
    }

    /// Built-in fallback set, shared by all sources without a strict set.
    pub fn generic() -> Self {
        Self::from_lists(
            &["Component number", "ERP Part Number", "material no.", "part number"],
            &["Component quantity", "Quantity", "qty"],
            &["Component UoM", "Unit Of Measure", "unit"],
            &["Description", "description"],
        )
    }
}

fn default_patterns() -> BTreeMap<String, ColumnPatterns> {
    BTreeMap::from([
        (GENERIC_PATTERNS.to_string(), ColumnPatterns::generic()),
        (
            "SAP".to_string(),
            ColumnPatterns::from_lists(
                &["Component number"],
                &["Component quantity"],
                &["Component UoM"],
                &["Description", "Material Description", "Item Description"],
            ),
        ),
        (
            "HPLM".to_string(),
            ColumnPatterns::from_lists(
                &["ERP Part Number"],
                &["Quantity"],
                &["Unit Of Measure"],
                &["Description", "Material Description"],
            ),
        ),
    ])
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSynonyms {
    pub canonical: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

fn default_units() -> Vec<UnitSynonyms> {
    let table: &[(&str, &[&str])] = &[
        ("PCS", &["PCS", "PC", "PIECE", "PIECES", "PZA", "PZAS", "PIEZA", "PIEZAS"]),
        ("KG", &["KG", "KILOGRAM", "KILOGRAMS", "KILO", "KILOS"]),
        ("M", &["M", "METER", "METERS", "METRO", "METROS"]),
        ("L", &["L", "LITER", "LITERS", "LITRO", "LITROS"]),
        ("G", &["G", "GRAM", "GRAMS", "GRAMO", "GRAMOS"]),
        ("CM", &["CM", "CENTIMETER", "CENTIMETERS", "CENTIMETRO", "CENTIMETROS"]),
        ("MM", &["MM", "MILLIMETER", "MILLIMETERS", "MILIMETRO", "MILIMETROS"]),
        ("FT", &["FT", "FOOT", "FEET", "PIE", "PIES"]),
        ("IN", &["IN", "INCH", "INCHES", "PULGADA", "PULGADAS"]),
        ("LB", &["LB", "POUND", "POUNDS", "LIBRA", "LIBRAS"]),
    ];
    table
        .iter()
        .map(|(canonical, synonyms)| UnitSynonyms {
            canonical: canonical.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    /// Pattern set for a source label, falling back to `generic`, then to the built-in set.
    pub fn patterns_for(&self, source_label: &str) -> ColumnPatterns {
        self.patterns
            .get(source_label)
            .or_else(|| self.patterns.get(GENERIC_PATTERNS))
            .cloned()
            .unwrap_or_else(ColumnPatterns::generic)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let fraction = |name: &str, v: f64| -> Result<(), ReconError> {
            if !(0.0..=1.0).contains(&v) {
                return Err(ReconError::ConfigValidation(format!(
                    "{name} must be between 0 and 1, got {v}"
                )));
            }
            Ok(())
        };
        fraction("tolerance.quantity", self.tolerance.quantity)?;
        fraction("matching.similarity_threshold", self.matching.similarity_threshold)?;
        fraction(
            "matching.high_similarity_threshold",
            self.matching.high_similarity_threshold,
        )?;
        fraction("matching.description_threshold", self.matching.description_threshold)?;

        let reference = self.sources.reference.trim();
        let comparison = self.sources.comparison.trim();
        if reference.is_empty() || comparison.is_empty() {
            return Err(ReconError::ConfigValidation(
                "source labels must not be empty".into(),
            ));
        }
        if reference == comparison {
            return Err(ReconError::ConfigValidation(format!(
                "reference and comparison labels must differ, both are '{reference}'"
            )));
        }

        for (label, set) in &self.patterns {
            if set.part_number.iter().all(|p| p.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "patterns.{label}: part_number needs at least one pattern"
                )));
            }
        }

        for (i, entry) in self.units.iter().enumerate() {
            let canonical = entry.canonical.trim().to_uppercase();
            if canonical.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "units[{i}]: canonical name must not be empty"
                )));
            }
            // A canonical name claimed as an earlier entry's synonym would never map to itself.
            for earlier in &self.units[..i] {
                if earlier
                    .synonyms
                    .iter()
                    .any(|s| s.trim().to_uppercase() == canonical)
                {
                    return Err(ReconError::ConfigValidation(format!(
                        "units[{i}]: '{canonical}' is already a synonym of '{}'",
                        earlier.canonical
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
