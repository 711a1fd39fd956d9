#![deny(unsafe_code)]

use std::path::PathBuf;

/// Failures while building code tables. Any of these is fatal for a run:
/// nothing is normalized against a partial table.
#[derive(Debug, thiserror::Error)]
pub enum CodeTableError {
    #[error("{table} source is empty")]
    EmptySource { table: &'static str },

    #[error("{table} lines {start}..{end} yielded no entries")]
    EmptyRange {
        table: &'static str,
        start: usize,
        end: usize,
    },

    #[error("ZIP source returned no ZIP codes for {county}, {state}")]
    NoZipCodes { county: String, state: String },

    #[error("ZIP index for {state} needs at least one county of interest")]
    NoCounties { state: String },

    #[error("unknown state abbreviation: {abbreviation}")]
    UnknownState { abbreviation: String },

    #[error("county {county} not found in the FIPS table for state {state}")]
    UnknownCounty { county: String, state: String },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("missing column {column} in {path}")]
    MissingColumn { path: PathBuf, column: String },
}

impl CodeTableError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodeTableError>;
