//! `bomrecon compare` and `bomrecon map`.

use std::path::PathBuf;

use bomrecon_io::{export_checklist, export_report, load_dataset, write_rows_csv, write_summary_csv};
use bomrecon_recon::classify::format_general;
use bomrecon_recon::model::{ColumnMapping, ReconRun, RowFilter};
use bomrecon_recon::{map_columns, validate_dataset, validate_mapping, ReconConfig};
use clap::{Args, ValueEnum};

use crate::exit_codes::{EXIT_CONFIG, EXIT_DISCREPANCIES};
use crate::{load_config, CliError};

#[derive(Args)]
pub struct CompareArgs {
    /// Reference (master) BOM: .xlsx, .xls, .ods, .csv, .tsv
    reference: PathBuf,

    /// Comparison BOM checked against the reference
    comparison: PathBuf,

    /// TOML config (labels, tolerance, thresholds, column patterns, units)
    #[arg(long, short = 'c', env = "BOMRECON_CONFIG")]
    config: Option<PathBuf>,

    /// Relative quantity tolerance, overriding the config (0.01 = 1%)
    #[arg(long, value_name = "FRACTION")]
    tolerance: Option<f64>,

    /// Label of the reference source (selects its column patterns)
    #[arg(long, value_name = "LABEL")]
    reference_label: Option<String>,

    /// Label of the comparison source (selects its column patterns)
    #[arg(long, value_name = "LABEL")]
    comparison_label: Option<String>,

    /// Print the run as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Write the run as JSON to a file
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write the Summary / Issues / All Data workbook
    #[arg(long, value_name = "FILE.xlsx")]
    report: Option<PathBuf>,

    /// Write the printable floor validation checklist
    #[arg(long, value_name = "FILE.xlsx")]
    checklist: Option<PathBuf>,

    /// Include correct parts in the checklist, not only issues
    #[arg(long, requires = "checklist")]
    include_correct: bool,

    /// Write shortage and surplus rows as CSV
    #[arg(long, value_name = "FILE")]
    issues_csv: Option<PathBuf>,

    /// Write the one-row status summary as CSV
    #[arg(long, value_name = "FILE")]
    summary_csv: Option<PathBuf>,

    /// Rows included in JSON output and the stderr listing
    #[arg(long, value_enum, default_value = "all")]
    filter: FilterArg,

    /// Only print errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Args)]
pub struct MapArgs {
    /// File whose columns should be mapped
    file: PathBuf,

    /// Source label selecting the column patterns (default: the reference label)
    #[arg(long, short = 's', value_name = "LABEL")]
    source: Option<String>,

    /// TOML config
    #[arg(long, short = 'c', env = "BOMRECON_CONFIG")]
    config: Option<PathBuf>,

    /// Print the mapping as JSON to stdout
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    All,
    Issues,
    Shortages,
    Surpluses,
}

impl From<FilterArg> for RowFilter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::All => RowFilter::All,
            FilterArg::Issues => RowFilter::Issues,
            FilterArg::Shortages => RowFilter::Shortages,
            FilterArg::Surpluses => RowFilter::Surpluses,
        }
    }
}

// ============================================================================
// compare
// ============================================================================

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(t) = args.tolerance {
        config.tolerance.quantity = t;
    }
    if let Some(label) = &args.reference_label {
        config.sources.reference = label.clone();
    }
    if let Some(label) = &args.comparison_label {
        config.sources.comparison = label.clone();
    }
    config
        .validate()
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;

    let reference = load_dataset(&args.reference).map_err(CliError::load)?;
    let comparison = load_dataset(&args.comparison).map_err(CliError::load)?;

    let run = bomrecon_recon::run(&reference, &comparison, &config).map_err(CliError::recon)?;
    let filter = RowFilter::from(args.filter);

    if !args.quiet {
        print_mapping(&run.reference_mapping, &config);
        print_mapping(&run.comparison_mapping, &config);
        print_summary(&run, filter);
    }

    write_exports(&args, &run, filter)?;

    if run.has_issues() {
        let r = &run.report;
        return Err(CliError::new(
            EXIT_DISCREPANCIES,
            format!("{} of {} parts have discrepancies", r.total_with_issues, r.total),
        ));
    }
    Ok(())
}

fn write_exports(args: &CompareArgs, run: &ReconRun, filter: RowFilter) -> Result<(), CliError> {
    if args.json || args.output.is_some() {
        let mut view = run.clone();
        view.rows = run.filtered(filter).into_iter().cloned().collect();
        let json = serde_json::to_string_pretty(&view)
            .map_err(|e| CliError::export(format!("JSON serialization error: {e}")))?;

        if let Some(path) = &args.output {
            std::fs::write(path, &json)
                .map_err(|e| CliError::export(format!("cannot write {}: {e}", path.display())))?;
            written(args.quiet, path);
        }
        if args.json {
            println!("{json}");
        }
    }

    if let Some(path) = &args.report {
        export_report(path, run).map_err(CliError::load)?;
        written(args.quiet, path);
    }
    if let Some(path) = &args.checklist {
        export_checklist(path, run, args.include_correct).map_err(CliError::load)?;
        written(args.quiet, path);
    }
    if let Some(path) = &args.issues_csv {
        write_rows_csv(path, &run.meta, &run.issues()).map_err(CliError::load)?;
        written(args.quiet, path);
    }
    if let Some(path) = &args.summary_csv {
        write_summary_csv(path, &run.report).map_err(CliError::load)?;
        written(args.quiet, path);
    }
    Ok(())
}

fn written(quiet: bool, path: &std::path::Path) {
    if !quiet {
        eprintln!("wrote {}", path.display());
    }
}

fn print_mapping(mapping: &ColumnMapping, config: &ReconConfig) {
    eprintln!("{} columns:", mapping.source_label);
    for line in mapping.summary_lines(config.matching.high_similarity_threshold) {
        eprintln!("  {line}");
    }
}

fn print_summary(run: &ReconRun, filter: RowFilter) {
    let r = &run.report;
    eprintln!(
        "{} vs {}: {} parts, {} correct, {} shortages, {} surpluses ({:.2}% correct, tolerance {}%)",
        run.meta.reference_label,
        run.meta.comparison_label,
        r.total,
        r.correct,
        r.shortage,
        r.surplus,
        r.correct_pct,
        format_general(run.meta.quantity_tolerance * 100.0),
    );

    let rows = run.filtered(filter);
    if rows.is_empty() {
        return;
    }
    eprintln!();
    for row in rows {
        eprintln!(
            "  {:<20} {:<6} {:<9} {}",
            row.part_number,
            row.unit,
            row.status.label(),
            row.issue
        );
    }
}

// ============================================================================
// map
// ============================================================================

pub fn cmd_map(args: MapArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let label = args
        .source
        .unwrap_or_else(|| config.sources.reference.clone());

    let dataset = load_dataset(&args.file).map_err(CliError::load)?;
    validate_dataset(&dataset, &label).map_err(CliError::recon)?;

    let mapping = map_columns(&dataset, &label, &config);

    if args.json {
        let json = serde_json::to_string_pretty(&mapping)
            .map_err(|e| CliError::export(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else {
        print_mapping(&mapping, &config);
    }

    validate_mapping(&mapping, config.matching.similarity_threshold).map_err(CliError::recon)
}
