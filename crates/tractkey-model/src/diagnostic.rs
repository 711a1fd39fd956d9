use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Non-fatal conditions collected while reconciling sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Line length did not match the schema record length.
    MalformedRecord,
    /// File name maps to no schema, or to more than one.
    UnmappedFile,
    /// An expected schema variant had no matching file.
    MissingVariant,
    /// County could not be resolved; record kept with `County::Other`.
    UnresolvedGeography,
    /// Source has no geographic fields and was not reconciled.
    NonGeographicSource,
    /// Delimited row was missing a column the convention needs.
    MissingColumn,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::MalformedRecord | DiagnosticKind::MissingColumn => Severity::Error,
            DiagnosticKind::UnmappedFile
            | DiagnosticKind::MissingVariant
            | DiagnosticKind::UnresolvedGeography => Severity::Warning,
            DiagnosticKind::NonGeographicSource => Severity::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedRecord => "malformed_record",
            DiagnosticKind::UnmappedFile => "unmapped_file",
            DiagnosticKind::MissingVariant => "missing_variant",
            DiagnosticKind::UnresolvedGeography => "unresolved_geography",
            DiagnosticKind::NonGeographicSource => "non_geographic_source",
            DiagnosticKind::MissingColumn => "missing_column",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic tied to a source and, where relevant, a 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub source: String,
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            line: None,
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{}] {}:{}: {}", self.kind, self.source, line, self.message),
            None => write!(f, "[{}] {}: {}", self.kind, self.source, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_line() {
        let diag = Diagnostic::new(DiagnosticKind::MalformedRecord, "cra_a11", "expected 145")
            .at_line(12);
        assert_eq!(diag.to_string(), "[malformed_record] cra_a11:12: expected 145");
        assert_eq!(diag.severity(), Severity::Error);
    }

    #[test]
    fn test_display_without_line() {
        let diag = Diagnostic::new(DiagnosticKind::UnmappedFile, "notes.dat", "no schema");
        assert_eq!(diag.to_string(), "[unmapped_file] notes.dat: no schema");
        assert_eq!(diag.severity(), Severity::Warning);
    }
}
