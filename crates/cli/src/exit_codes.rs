//! CLI Exit Code Registry
//!
//! Single source of truth for `bomrecon` exit codes. Scripts and CI jobs
//! branch on these, so a published code never changes meaning.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success (every part correct, or command completed)       |
//! | 1    | Discrepancies found (at least one shortage or surplus)   |
//! | 2    | Usage error (bad arguments, unsupported file extension)  |
//! | 3    | IO error (file missing, unreadable, malformed)           |
//! | 4    | Input validation error (empty dataset, duplicate column) |
//! | 5    | Column mapping error (unmapped or low-confidence fields) |
//! | 6    | Configuration error (TOML syntax or invalid values)      |
//! | 7    | Export error (report, checklist, CSV or JSON not written) |

use bomrecon_io::IoError;
use bomrecon_recon::ReconError;

/// Success - command completed; for `compare`, no discrepancies.
pub const EXIT_SUCCESS: u8 = 0;

/// Comparison completed and found shortages or surpluses.
/// Like `diff(1)`, exit 1 means "the inputs differ."
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Usage error - bad arguments, unsupported input format.
pub const EXIT_USAGE: u8 = 2;

/// Input file could not be read or parsed.
pub const EXIT_IO: u8 = 3;

/// Dataset rejected before mapping (empty, no columns, duplicate names).
pub const EXIT_INPUT: u8 = 4;

/// Column mapping failed (critical field unmapped, low part number confidence).
pub const EXIT_MAPPING: u8 = 5;

/// Configuration file could not be parsed or failed validation.
pub const EXIT_CONFIG: u8 = 6;

/// An output file could not be written.
pub const EXIT_EXPORT: u8 = 7;

/// Map a core error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        e if e.is_mapping_error() => EXIT_MAPPING,
        e if e.is_input_error() => EXIT_INPUT,
        _ => EXIT_USAGE,
    }
}

/// Map a load/export error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::UnsupportedFormat { .. } => EXIT_USAGE,
        IoError::Read { .. } | IoError::Parse { .. } => EXIT_IO,
        IoError::Write { .. } => EXIT_EXPORT,
        IoError::Dataset(e) => recon_exit_code(e),
    }
}
