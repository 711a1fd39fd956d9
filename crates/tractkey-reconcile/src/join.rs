//! Inner joins of reconciled streams on the canonical key.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use tractkey_model::GeographicKey;

use crate::record::ReconciledRecord;

/// Level at which two streams are compared. Always chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinGranularity {
    /// State, county, and tract must all match.
    Tract,
    /// Tracts are ignored.
    County,
}

impl fmt::Display for JoinGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinGranularity::Tract => f.write_str("tract"),
            JoinGranularity::County => f.write_str("county"),
        }
    }
}

/// Key a record joins on, or `None` when it cannot join at this level.
///
/// Unresolved counties never join. At tract level, records without a tract
/// or with the empty-tract sentinel are excluded as well.
pub fn join_key(record: &ReconciledRecord, granularity: JoinGranularity) -> Option<GeographicKey> {
    let key = &record.geography.key;
    if key.county.is_other() {
        return None;
    }
    match granularity {
        JoinGranularity::Tract => key.has_usable_tract().then(|| key.clone()),
        JoinGranularity::County => Some(key.county_level()),
    }
}

/// A matched pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedPair<'l, 'r> {
    pub key: GeographicKey,
    pub left: &'l ReconciledRecord,
    pub right: &'r ReconciledRecord,
}

/// Join output with counts of records that could not take part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutcome<'l, 'r> {
    pub pairs: Vec<JoinedPair<'l, 'r>>,
    pub skipped_left: usize,
    pub skipped_right: usize,
}

impl JoinOutcome<'_, '_> {
    /// Number of left records with at least one match.
    pub fn matched_left(&self) -> usize {
        let mut seen: Vec<&str> = self
            .pairs
            .iter()
            .map(|pair| pair.left.record_id.as_str())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

/// Inner join on the full key at `granularity`.
///
/// Pairs come out in left order, then right order within a key.
pub fn join<'l, 'r>(
    left: &'l [ReconciledRecord],
    right: &'r [ReconciledRecord],
    granularity: JoinGranularity,
) -> JoinOutcome<'l, 'r> {
    let mut outcome = JoinOutcome::default();

    let mut index: HashMap<GeographicKey, Vec<&'r ReconciledRecord>> = HashMap::new();
    for record in right {
        match join_key(record, granularity) {
            Some(key) => index.entry(key).or_default().push(record),
            None => outcome.skipped_right += 1,
        }
    }

    for record in left {
        let Some(key) = join_key(record, granularity) else {
            outcome.skipped_left += 1;
            continue;
        };
        if let Some(matches) = index.get(&key) {
            outcome.pairs.extend(matches.iter().map(|other| JoinedPair {
                key: key.clone(),
                left: record,
                right: *other,
            }));
        }
    }
    outcome
}
