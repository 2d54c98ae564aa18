//! `bomrecon config`: validate or print the effective configuration.

use std::path::PathBuf;

use bomrecon_recon::classify::format_general;
use clap::Subcommand;

use crate::exit_codes::EXIT_CONFIG;
use crate::{load_config, CliError};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a TOML config without running a comparison
    #[command(after_help = "\
Examples:
  bomrecon config validate plant.recon.toml")]
    Validate {
        /// Path to the .recon.toml file
        file: PathBuf,
    },

    /// Print the effective configuration as TOML
    #[command(after_help = "\
Examples:
  bomrecon config show > plant.recon.toml
  bomrecon config show --config plant.recon.toml")]
    Show {
        /// Config file to load (built-in defaults when omitted)
        #[arg(long, short = 'c', env = "BOMRECON_CONFIG")]
        config: Option<PathBuf>,
    },
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { file } => {
            let config = load_config(Some(&file))?;
            eprintln!(
                "valid: reference '{}', comparison '{}', tolerance {}%, {} pattern set(s), {} unit(s)",
                config.sources.reference,
                config.sources.comparison,
                format_general(config.tolerance.quantity * 100.0),
                config.patterns.len(),
                config.units.len(),
            );
            Ok(())
        }
        ConfigCommands::Show { config } => {
            let config = load_config(config.as_deref())?;
            let text = config
                .to_toml()
                .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;
            print!("{text}");
            Ok(())
        }
    }
}
