use std::path::PathBuf;

use bomrecon_recon::ReconError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported file format '{extension}' (supported: {})", crate::SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedFormat { extension: String },

    /// File could not be opened or its bytes could not be read.
    #[error("cannot read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// File was read but its contents are not a usable table.
    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// The loaded table was rejected (e.g. duplicate headers).
    #[error(transparent)]
    Dataset(#[from] ReconError),
}

impl IoError {
    pub(crate) fn read(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }

    pub(crate) fn write(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }

    /// True for failures while producing an output file.
    pub fn is_export_error(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}
