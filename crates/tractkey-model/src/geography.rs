//! Canonical (state, county, tract) key shared by every dataset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Sentinel stored when a tract field exists but carries no value.
pub const MISSING_TRACT: &str = "0000NAN";

/// Census tract in the fixed `DDDD.DD` form, or the [`MISSING_TRACT`] sentinel.
///
/// The sentinel is a distinct value: it never equals `0000.00`, so records
/// with an empty tract cannot silently join a real tract.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tract(String);

impl Tract {
    pub fn missing() -> Self {
        Self(MISSING_TRACT.to_string())
    }

    /// Builds a tract from an integer count of hundredths (`3400` -> `0034.00`).
    pub fn from_hundredths(hundredths: u64) -> Self {
        Self(format!("{:04}.{:02}", hundredths / 100, hundredths % 100))
    }

    /// Wraps a value that already carries its decimal point but is not purely
    /// numeric (HMDA tracts with alphanumeric suffixes).
    pub fn verbatim(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn is_missing(&self) -> bool {
        self.0 == MISSING_TRACT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Tract {
    type Err = ModelError;

    /// Accepts only the canonical forms: `DDDD.DD` (four or more integer
    /// digits) or the sentinel.
    fn from_str(value: &str) -> Result<Self> {
        if value == MISSING_TRACT {
            return Ok(Self::missing());
        }
        let valid = value.split_once('.').is_some_and(|(whole, frac)| {
            whole.len() >= 4
                && frac.len() == 2
                && whole.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        });
        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(ModelError::InvalidTract {
                value: value.to_string(),
            })
        }
    }
}

/// County component of a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum County {
    /// Full jurisdiction name as it appears in the code table (`Dallas County`).
    Named(String),
    /// Could not be resolved by any lookup.
    Other,
}

impl County {
    pub fn name(&self) -> Option<&str> {
        match self {
            County::Named(name) => Some(name),
            County::Other => None,
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, County::Other)
    }
}

impl fmt::Display for County {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            County::Named(name) => f.write_str(name),
            County::Other => f.write_str("Other"),
        }
    }
}

/// Canonical geographic key.
///
/// `tract: None` means the source has no tract concept at all (county-level
/// records); `Some(Tract::missing())` means a tract field was present but empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GeographicKey {
    pub state_name: Option<String>,
    pub county: County,
    pub tract: Option<Tract>,
}

impl GeographicKey {
    pub fn new(state_name: Option<String>, county: County, tract: Option<Tract>) -> Self {
        Self {
            state_name,
            county,
            tract,
        }
    }

    /// Key with the tract dropped, for county-level comparisons.
    pub fn county_level(&self) -> Self {
        Self {
            state_name: self.state_name.clone(),
            county: self.county.clone(),
            tract: None,
        }
    }

    pub fn has_usable_tract(&self) -> bool {
        self.tract.as_ref().is_some_and(|tract| !tract.is_missing())
    }
}

/// How the county of a key was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountySource {
    Direct,
    ZipFallback,
    Unresolved,
}

impl CountySource {
    pub fn as_str(self) -> &'static str {
        match self {
            CountySource::Direct => "direct",
            CountySource::ZipFallback => "zip_fallback",
            CountySource::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for CountySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizer output: the key plus provenance of its county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGeography {
    pub key: GeographicKey,
    pub county_source: CountySource,
}

impl ResolvedGeography {
    pub fn is_resolved(&self) -> bool {
        self.county_source != CountySource::Unresolved
    }
}
