//! Error types for reconciliation.

use thiserror::Error;

use tractkey_fwf::DecodeError;
use tractkey_ingest::IngestError;

/// Errors that stop a source from being reconciled at all.
///
/// Problems with individual records are not errors; they are reported as
/// [`tractkey_model::Diagnostic`] values and processing continues.
#[derive(Debug, Error)]
pub enum ReconcileError {
    // === Setup Errors ===
    /// A built-in fixed-width layout failed validation.
    #[error("invalid record layout: {0}")]
    Layout(#[from] DecodeError),

    /// The census label pattern failed to compile.
    #[error("invalid census label pattern: {0}")]
    LabelPattern(#[from] regex::Error),

    // === Source Errors ===
    /// Reading the source file failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A delimited source lacks a column its convention needs.
    #[error("source '{name}' has no column '{column}'")]
    MissingColumn { name: String, column: String },

    /// The source format cannot be read through this entry point.
    #[error("source '{name}' with format {format} cannot be read as a single file")]
    UnsupportedFormat { name: String, format: String },

    // === Export Errors ===
    /// Building the output frame failed.
    #[error("failed to build frame: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, ReconcileError>;
