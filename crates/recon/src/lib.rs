//! `bomrecon-recon`: bill-of-materials reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tabular datasets, infers their
//! column mapping, and returns per-part reconciliation rows plus a summary.
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod matcher;
pub mod model;
pub mod report;
pub mod similarity;
pub mod units;
pub mod validate;

pub use config::ReconConfig;
pub use engine::{compare, run};
pub use error::ReconError;
pub use mapper::{map_columns, standardize, validate_mapping};
pub use model::{
    CanonicalField, CellValue, ColumnMapping, RawDataset, ReconRow, ReconRun, ReconStatus,
    RowEdit, RowFilter, StatusReport,
};
pub use report::summarize;
pub use units::normalize_unit;
pub use validate::{validate_dataset, validate_description, validate_quantity, validate_unit};
