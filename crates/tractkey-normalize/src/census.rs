//! Census table geography labels (`Census Tract 101.02; Dallas County; Texas`).

use regex::Regex;

use crate::raw::{RawCounty, RawGeography, RawState, RawTract};

/// The three parts of a tract label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusLabel {
    pub tract: String,
    pub county: String,
    pub state: String,
}

impl CensusLabel {
    pub fn raw_geography(&self) -> RawGeography<'_> {
        RawGeography::new(
            RawState::Name(&self.state),
            RawCounty::Name { name: &self.county },
        )
        .with_tract(RawTract::Decimal(&self.tract))
    }
}

/// Splits tract labels into tract number, county, and state.
#[derive(Debug, Clone)]
pub struct CensusLabelParser {
    tract: Regex,
}

impl CensusLabelParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            tract: Regex::new(r"(?i)^census\s+tract\s+([0-9]+(?:\.[0-9]+)?)$")?,
        })
    }

    /// Parses a `tract; county; state` label. Commas are accepted in place of
    /// semicolons. Labels that are not tract-level return `None`.
    pub fn parse(&self, label: &str) -> Option<CensusLabel> {
        let label = label.replace('\u{a0}', " ");
        let separator = if label.contains(';') { ';' } else { ',' };
        let parts: Vec<&str> = label.split(separator).map(str::trim).collect();
        let [tract, county, state] = parts.as_slice() else {
            return None;
        };
        let number = self.tract.captures(tract)?.get(1)?.as_str();
        Some(CensusLabel {
            tract: number.to_string(),
            county: (*county).to_string(),
            state: (*state).to_string(),
        })
    }
}
