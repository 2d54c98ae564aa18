// bomrecon - reconcile a reference BOM against a comparison BOM

mod compare;
mod config_cmd;
mod exit_codes;

use std::path::Path;
use std::process::ExitCode;

use bomrecon_io::IoError;
use bomrecon_recon::{ReconConfig, ReconError};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{io_exit_code, recon_exit_code, EXIT_CONFIG, EXIT_EXPORT, EXIT_IO, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "bomrecon")]
#[command(about = "Reconcile two bills of materials by part number and unit")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG applies otherwise.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a reference BOM against a comparison BOM (exit 0 = all correct, exit 1 = discrepancies)
    #[command(after_help = "\
Exit code 1 means at least one part is short or in surplus in the comparison BOM.
Other non-zero codes are errors (2 usage, 3 io, 4 input, 5 mapping, 6 config, 7 export).

Examples:
  bomrecon compare sap.xlsx hplm.xlsx
  bomrecon compare sap.csv hplm.csv --tolerance 0.05
  bomrecon compare sap.xlsx hplm.xlsx --report recon.xlsx --checklist floor.xlsx
  bomrecon compare erp.csv plm.csv --reference-label ERP --comparison-label PLM
  bomrecon compare sap.csv hplm.csv --json --filter issues | jq '.rows[].part_number'")]
    Compare(compare::CompareArgs),

    /// Show the inferred column mapping for one file
    #[command(after_help = "\
Examples:
  bomrecon map sap.xlsx
  bomrecon map hplm.csv --source HPLM
  bomrecon map export.csv --source ERP --config plant.recon.toml --json")]
    Map(compare::MapArgs),

    /// Validate or print configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compare(args) => compare::cmd_compare(args),
        Commands::Map(args) => compare::cmd_map(args),
        Commands::Config(cmd) => config_cmd::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::new(EXIT_EXPORT, msg)
    }

    /// Core error with its registry code and, where useful, a hint.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::UnmappedFields { source_label, .. }
            | ReconError::LowConfidence { source_label, .. } => Some(format!(
                "run `bomrecon map <FILE> --source {source_label}` to inspect the mapping, \
                 or add column patterns for '{source_label}' to the config"
            )),
            ReconError::EmptyDataset { .. } => {
                Some("check that the first sheet holds the BOM with a header row".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    /// Load/export error with its registry code.
    pub fn load(err: IoError) -> Self {
        let code = io_exit_code(&err);
        match err {
            IoError::Dataset(e) => Self::recon(e),
            other @ IoError::UnsupportedFormat { .. } => Self::new(code, other.to_string())
                .with_hint("export the BOM as .xlsx or .csv"),
            other => Self::new(code, other.to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Effective configuration: the TOML file when given, built-in defaults otherwise.
pub(crate) fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    let config = ReconConfig::from_toml(&text)
        .map_err(|e| CliError::new(EXIT_CONFIG, format!("{}: {e}", path.display())))?;
    log::debug!("config loaded from {}", path.display());
    Ok(config)
}
