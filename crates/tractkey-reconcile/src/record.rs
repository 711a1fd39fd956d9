//! Reconciled records and per-source results.

use serde::Serialize;
use sha2::{Digest, Sha256};

use tractkey_fwf::AMOUNT_MARKER;
use tractkey_model::{
    CodeLabelCatalog, CountySource, Diagnostic, DiagnosticKind, ResolvedGeography, Tract,
};

/// Width of zero-filled respondent identifiers.
pub const RESPONDENT_ID_WIDTH: usize = 10;

/// Deterministic record id: the first 16 bytes of
/// `sha256("<source>\0<line>")`, hex encoded.
pub fn derive_record_id(source: &str, line: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0u8]);
    hasher.update(line.to_string().as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    hex::encode(&digest[..16])
}

/// One source record with its canonical geography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledRecord {
    pub source: String,
    pub record_id: String,
    /// 1-based line of the record in its source.
    pub line: usize,
    pub geography: ResolvedGeography,
    /// Decoded fields in source order, values trimmed.
    pub fields: Vec<(String, String)>,
}

impl ReconciledRecord {
    pub fn new(
        source: impl Into<String>,
        line: usize,
        geography: ResolvedGeography,
        fields: Vec<(String, String)>,
    ) -> Self {
        let source = source.into();
        let record_id = derive_record_id(&source, line);
        Self {
            source,
            record_id,
            line,
            geography,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Description of a coded field value, if the catalog knows it.
    pub fn label<'c>(&self, catalog: &'c dyn CodeLabelCatalog, name: &str) -> Option<&'c str> {
        catalog.label(name, self.field(name)?)
    }
}

/// Counts for one reconciled source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    /// Rows or lines read, including malformed ones.
    pub rows: usize,
    pub records: usize,
    pub malformed: usize,
    /// Blank lines skipped in fixed-width files; not counted in `rows`.
    pub blank_lines: usize,
    pub unresolved: usize,
    pub zip_fallback: usize,
    /// Records with an empty tract field (`0000NAN`).
    pub missing_tract: usize,
    pub chunks: usize,
}

/// Records and diagnostics from one source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciledSource {
    pub name: String,
    pub convention: String,
    pub records: Vec<ReconciledRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: SourceStats,
}

impl ReconciledSource {
    pub fn new(name: impl Into<String>, convention: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            convention: convention.into(),
            ..Self::default()
        }
    }

    /// Appends another source's records, diagnostics and counts. Record ids
    /// keep the name of the source they were read from.
    pub fn merge(&mut self, other: ReconciledSource) {
        let stats = other.stats;
        self.stats.rows += stats.rows;
        self.stats.records += stats.records;
        self.stats.malformed += stats.malformed;
        self.stats.blank_lines += stats.blank_lines;
        self.stats.unresolved += stats.unresolved;
        self.stats.zip_fallback += stats.zip_fallback;
        self.stats.missing_tract += stats.missing_tract;
        self.stats.chunks += stats.chunks;
        self.records.extend(other.records);
        self.diagnostics.extend(other.diagnostics);
    }

    pub(crate) fn push_record(&mut self, record: ReconciledRecord) {
        match record.geography.county_source {
            CountySource::Unresolved => self.stats.unresolved += 1,
            CountySource::ZipFallback => self.stats.zip_fallback += 1,
            CountySource::Direct => {}
        }
        if record
            .geography
            .key
            .tract
            .as_ref()
            .is_some_and(Tract::is_missing)
        {
            self.stats.missing_tract += 1;
        }
        self.stats.records += 1;
        self.records.push(record);
    }

    /// Adds one summary diagnostic for unresolved counties.
    pub(crate) fn finish(&mut self) {
        if self.stats.unresolved == 0 {
            return;
        }
        let first = self
            .records
            .iter()
            .find(|record| !record.geography.is_resolved())
            .map(|record| record.line);
        let mut diagnostic = Diagnostic::new(
            DiagnosticKind::UnresolvedGeography,
            self.name.clone(),
            format!(
                "{} of {} records have an unresolved county",
                self.stats.unresolved, self.stats.records
            ),
        );
        if let Some(line) = first {
            diagnostic = diagnostic.at_line(line);
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Zero-fills a respondent id to ten characters. Empty ids stay empty.
pub fn pad_respondent_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{trimmed:0>width$}", width = RESPONDENT_ID_WIDTH)
}

/// Whether a field holds an amount reported in thousands of dollars.
pub fn is_amount_field(name: &str) -> bool {
    name.contains(AMOUNT_MARKER)
}

/// Scales a thousands-of-dollars amount to dollars. Values that are not
/// whole numbers are returned unchanged.
pub fn scale_thousands(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<u64>() {
        Ok(value) => value.saturating_mul(1000).to_string(),
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tractkey_model::{County, GeographicKey, MapCatalog};

    fn geography() -> ResolvedGeography {
        ResolvedGeography {
            key: GeographicKey::new(
                Some("TEXAS".into()),
                County::Named("Dallas County".into()),
                None,
            ),
            county_source: CountySource::Direct,
        }
    }

    #[test]
    fn test_record_id_is_stable() {
        let a = derive_record_id("hmda", 12);
        assert_eq!(a.len(), 32);
        assert_eq!(a, derive_record_id("hmda", 12));
        assert_ne!(a, derive_record_id("hmda", 13));
        assert_ne!(a, derive_record_id("hmda1", 2));
    }

    #[test]
    fn test_respondent_id_padding() {
        assert_eq!(pad_respondent_id("12345"), "0000012345");
        assert_eq!(pad_respondent_id("0000012345"), "0000012345");
        assert_eq!(pad_respondent_id("  "), "");
    }

    #[test]
    fn test_scale_thousands() {
        assert!(is_amount_field("Total Loan Amount of Loans < $100,000"));
        assert!(!is_amount_field("Number of Loans < $100,000"));
        assert_eq!(scale_thousands("00125"), "125000");
        assert_eq!(scale_thousands(""), "");
        assert_eq!(scale_thousands("12.5"), "12.5");
    }

    #[test]
    fn test_label_lookup() {
        let mut catalog = MapCatalog::new();
        catalog.insert("Action Taken", "1", "Loan originated");
        let record = ReconciledRecord::new(
            "hmda",
            2,
            geography(),
            vec![("Action Taken".into(), "1".into())],
        );
        assert_eq!(record.label(&catalog, "Action Taken"), Some("Loan originated"));
        assert_eq!(record.label(&catalog, "Other"), None);
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut left = ReconciledSource::new("cra", "cra");
        left.push_record(ReconciledRecord::new("cra/a.dat", 1, geography(), Vec::new()));
        left.stats.rows = 2;
        left.stats.malformed = 1;
        left.stats.blank_lines = 2;
        let mut right = ReconciledSource::new("cra/b.dat", "cra:A1-1");
        right.push_record(ReconciledRecord::new("cra/b.dat", 1, geography(), Vec::new()));
        right.stats.rows = 1;
        right.stats.blank_lines = 1;

        left.merge(right);
        assert_eq!(left.records.len(), 2);
        assert_eq!(left.stats.records, 2);
        assert_eq!(left.stats.rows, 3);
        assert_eq!(left.stats.malformed, 1);
        assert_eq!(left.stats.blank_lines, 3);
        assert_eq!(left.records[1].source, "cra/b.dat");
    }
}
