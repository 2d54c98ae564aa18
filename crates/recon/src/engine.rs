use crate::aggregate::group_lines;
use crate::classify::build_rows;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::mapper::{map_columns, standardize, validate_mapping, warn_weak_fields};
use crate::matcher::pair_lines;
use crate::model::{ColumnMapping, RawDataset, ReconRow, ReconRun, RowEdit, RowFilter, RunMeta};
use crate::report::summarize;
use crate::validate::validate_dataset;

/// Run the full pipeline: validate inputs, map columns, compare, summarize.
///
/// The reference dataset is the master: a shortage means the comparison
/// side holds less than the reference.
pub fn run(
    reference: &RawDataset,
    comparison: &RawDataset,
    config: &ReconConfig,
) -> Result<ReconRun, ReconError> {
    let reference_label = config.sources.reference.as_str();
    let comparison_label = config.sources.comparison.as_str();

    validate_dataset(reference, reference_label)?;
    validate_dataset(comparison, comparison_label)?;

    let reference_mapping = map_columns(reference, reference_label, config);
    let comparison_mapping = map_columns(comparison, comparison_label, config);

    let threshold = config.matching.similarity_threshold;
    validate_mapping(&reference_mapping, threshold)?;
    validate_mapping(&comparison_mapping, threshold)?;
    warn_weak_fields(&reference_mapping, config.matching.high_similarity_threshold);
    warn_weak_fields(&comparison_mapping, config.matching.high_similarity_threshold);

    let rows = compare(
        reference,
        comparison,
        &reference_mapping,
        &comparison_mapping,
        config,
    );
    let report = summarize(&rows);

    log::info!(
        "compared {} keys: {} correct, {} shortage, {} surplus",
        report.total,
        report.correct,
        report.shortage,
        report.surplus
    );

    Ok(ReconRun {
        meta: RunMeta {
            reference_label: reference_label.to_string(),
            comparison_label: comparison_label.to_string(),
            quantity_tolerance: config.tolerance.quantity,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        reference_mapping,
        comparison_mapping,
        report,
        rows,
    })
}

/// Compare two mapped datasets into one row per (part number, unit) key.
///
/// Both mappings are assumed valid; see [`crate::mapper::validate_mapping`].
pub fn compare(
    reference: &RawDataset,
    comparison: &RawDataset,
    reference_mapping: &ColumnMapping,
    comparison_mapping: &ColumnMapping,
    config: &ReconConfig,
) -> Vec<ReconRow> {
    let reference_groups = group_lines(&standardize(reference, reference_mapping), &config.units);
    let comparison_groups = group_lines(&standardize(comparison, comparison_mapping), &config.units);
    log::debug!(
        "grouped {} -> {} lines, {} -> {} lines",
        reference.len(),
        reference_groups.len(),
        comparison.len(),
        comparison_groups.len()
    );

    let pairs = pair_lines(&reference_groups, &comparison_groups);
    build_rows(
        &pairs,
        &comparison_mapping.source_label,
        config.tolerance.quantity,
        config.matching.description_threshold,
    )
}

// ---------------------------------------------------------------------------
// Run object
// ---------------------------------------------------------------------------

impl ReconRun {
    /// Rows whose status is a shortage or a surplus.
    pub fn issues(&self) -> Vec<&ReconRow> {
        self.filtered(RowFilter::Issues)
    }

    pub fn filtered(&self, filter: RowFilter) -> Vec<&ReconRow> {
        self.rows.iter().filter(|r| filter.accepts(r.status)).collect()
    }

    pub fn has_issues(&self) -> bool {
        self.rows.iter().any(|r| r.status.is_issue())
    }

    /// Overwrite fields of one finalized row. The report is left as is
    /// until [`ReconRun::refresh_report`].
    pub fn apply_edit(&mut self, index: usize, edit: RowEdit) -> Result<(), ReconError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(ReconError::RowOutOfRange { index, len })?;

        if let Some(status) = edit.status {
            row.status = status;
        }
        if let Some(issue) = edit.issue {
            row.issue = issue;
        }
        if let Some(q) = edit.reference_quantity {
            row.reference_quantity = q;
        }
        if let Some(q) = edit.comparison_quantity {
            row.comparison_quantity = q;
        }
        if let Some(u) = edit.reference_unit {
            row.reference_unit = u;
        }
        if let Some(u) = edit.comparison_unit {
            row.comparison_unit = u;
        }
        if let Some(d) = edit.reference_description {
            row.reference_description = d;
        }
        if let Some(d) = edit.comparison_description {
            row.comparison_description = d;
        }
        Ok(())
    }

    /// Recompute the status report from the current rows.
    pub fn refresh_report(&mut self) {
        self.report = summarize(&self.rows);
    }
}
