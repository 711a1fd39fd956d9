//! Error types for fixed-width decoding.

use thiserror::Error;

/// Errors raised while building schemas, decoding lines, or mapping files.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Line length differs from the schema record length.
    #[error("malformed record: expected {expected} characters, got {actual}")]
    MalformedRecord { expected: usize, actual: usize },

    /// Schema declared with no fields.
    #[error("schema {schema} has no fields")]
    EmptySchema { schema: String },

    /// Field declared with zero width.
    #[error("schema {schema}: field {field} has zero width")]
    ZeroWidth { schema: String, field: String },

    /// Field declared with an empty name.
    #[error("schema {schema}: field {index} has an empty name")]
    EmptyFieldName { schema: String, index: usize },

    /// Field name appears twice in one schema.
    #[error("schema {schema}: duplicate field name {field}")]
    DuplicateField { schema: String, field: String },

    /// File name maps to no schema variant, or to several.
    #[error("unmapped file {file}: {reason}")]
    UnmappedFile { file: String, reason: String },
}

impl DecodeError {
    pub fn unmapped(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnmappedFile {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for fixed-width operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DecodeError::MalformedRecord {
            expected: 145,
            actual: 144,
        };
        assert_eq!(
            err.to_string(),
            "malformed record: expected 145 characters, got 144"
        );

        let err = DecodeError::unmapped("notes.dat", "no schema token in file name");
        assert!(err.to_string().contains("notes.dat"));
    }
}
