//! Restricting records to the state and counties of interest.

use std::collections::BTreeSet;

use tractkey_codes::Region;
use tractkey_model::{County, GeographicKey};

use crate::record::ReconciledRecord;

/// Predicate over the resolved key only; no source-specific fields are
/// consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeographyFilter {
    state_name: String,
    /// Empty means every county of the state.
    counties: BTreeSet<String>,
    keep_unresolved: bool,
}

impl GeographyFilter {
    pub fn new<I, S>(state_name: impl Into<String>, counties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state_name: state_name.into(),
            counties: counties.into_iter().map(Into::into).collect(),
            keep_unresolved: false,
        }
    }

    pub fn for_region(region: &Region) -> Self {
        Self::new(region.state_name.clone(), region.county_names())
    }

    /// Also keep records whose county is `Other`.
    pub fn keep_unresolved(mut self, keep: bool) -> Self {
        self.keep_unresolved = keep;
        self
    }

    pub fn matches(&self, key: &GeographicKey) -> bool {
        match &key.county {
            County::Other => self.keep_unresolved,
            County::Named(county) => {
                let state_matches = key
                    .state_name
                    .as_deref()
                    .is_some_and(|state| state.eq_ignore_ascii_case(&self.state_name));
                state_matches && (self.counties.is_empty() || self.counties.contains(county))
            }
        }
    }

    /// Keeps matching records, preserving order.
    pub fn apply(&self, records: Vec<ReconciledRecord>) -> Vec<ReconciledRecord> {
        records
            .into_iter()
            .filter(|record| self.matches(&record.geography.key))
            .collect()
    }
}
