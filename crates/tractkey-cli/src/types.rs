use serde::Serialize;

use tractkey_model::{Diagnostic, Severity};
use tractkey_reconcile::{JoinGranularity, SourceStats};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub state: String,
    pub counties: Vec<String>,
    pub sources: Vec<SourceSummary>,
    pub diagnostics: Vec<Diagnostic>,
    /// Sources that could not be read at all.
    pub errors: Vec<String>,
    pub has_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub name: String,
    pub convention: String,
    #[serde(flatten)]
    pub stats: SourceStats,
    /// Records left after the region filter.
    pub in_region: usize,
}

impl RunSummary {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity() == severity)
            .count()
    }
}

/// Counts from joining two sources on their geographic key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub left: String,
    pub right: String,
    pub granularity: JoinGranularity,
    /// In-region records on each side.
    pub left_records: usize,
    pub right_records: usize,
    pub pairs: usize,
    pub matched_left: usize,
    /// Records without a usable key at this granularity.
    pub skipped_left: usize,
    pub skipped_right: usize,
}
