//! Resolution of raw geographic fields to a canonical key.

use tracing::debug;

use tractkey_codes::{FipsCodeTable, ZipCountyIndex, state_code_for_abbreviation};
use tractkey_model::{County, CountySource, GeographicKey, ResolvedGeography};

use crate::codes::{pad_county_code, pad_state_code, split_combined_county};
use crate::raw::{RawCounty, RawGeography, RawState};
use crate::tract::normalize_tract;

/// Maps raw identifiers onto the canonical key space.
///
/// Holds shared references to tables built up front and does no I/O, so a
/// single normalizer can serve any number of rows or threads.
#[derive(Debug, Clone, Copy)]
pub struct GeographicKeyNormalizer<'a> {
    fips: &'a FipsCodeTable,
    zips: Option<&'a ZipCountyIndex>,
}

impl<'a> GeographicKeyNormalizer<'a> {
    pub fn new(fips: &'a FipsCodeTable) -> Self {
        Self { fips, zips: None }
    }

    pub fn with_zip_index(mut self, zips: &'a ZipCountyIndex) -> Self {
        self.zips = Some(zips);
        self
    }

    pub fn fips(&self) -> &'a FipsCodeTable {
        self.fips
    }

    /// Two-digit state code present in the table.
    pub fn state_code(&self, raw: &RawState<'_>) -> Option<String> {
        let code = match *raw {
            RawState::Fips(value) => pad_state_code(value)?,
            RawState::Abbreviation(value) => state_code_for_abbreviation(value)?.to_string(),
            RawState::Name(value) => self.fips.state_code_for_name(value)?.to_string(),
        };
        self.fips.state_name(&code).map(|_| code)
    }

    pub fn state_name(&self, raw: &RawState<'_>) -> Option<&'a str> {
        let code = self.state_code(raw)?;
        self.fips.state_name(&code)
    }

    /// Five-digit county code present in the table.
    pub fn county_code(&self, state_code: Option<&str>, raw: &RawCounty<'_>) -> Option<String> {
        let code = match *raw {
            RawCounty::Fips { code } => format!("{}{}", state_code?, pad_county_code(code)?),
            RawCounty::Combined { code } => {
                let (state, county) = split_combined_county(code)?;
                format!("{state}{county}")
            }
            RawCounty::Name { name } => self
                .fips
                .county_code_for_name(state_code?, name)?
                .to_string(),
        };
        self.fips.county_name(&code).map(|_| code)
    }

    /// Resolves one record.
    ///
    /// The county comes from a direct table lookup when possible; the ZIP
    /// index is consulted only when that fails, and a county that neither
    /// resolves is reported as [`County::Other`].
    pub fn normalize(&self, raw: &RawGeography<'_>) -> ResolvedGeography {
        let state_code = self.state_code(&raw.state);
        let tract = normalize_tract(&raw.tract);

        if let Some(county_code) = self.county_code(state_code.as_deref(), &raw.county) {
            // The key's state is the county code's own state prefix.
            let county_state = county_code.get(..2).unwrap_or_default();
            if state_code.as_deref().is_some_and(|code| code != county_state) {
                debug!(
                    state = ?raw.state,
                    county = ?raw.county,
                    "state field disagrees with county code, using county code"
                );
            }
            let state_name = self.fips.state_name(county_state);
            let county = self.fips.county_name(&county_code).map(str::to_string);
            return ResolvedGeography {
                key: GeographicKey::new(
                    state_name.map(str::to_string),
                    county.map_or(County::Other, County::Named),
                    tract,
                ),
                county_source: CountySource::Direct,
            };
        }

        if let Some((zips, county)) = self
            .zips
            .zip(raw.zip)
            .and_then(|(zips, zip)| Some((zips, zips.county_for_zip(zip)?)))
        {
            let state_name = state_code
                .as_deref()
                .and_then(|code| self.fips.state_name(code))
                .or_else(|| {
                    state_code_for_abbreviation(zips.state_abbreviation())
                        .and_then(|code| self.fips.state_name(code))
                });
            return ResolvedGeography {
                key: GeographicKey::new(
                    state_name.map(str::to_string),
                    County::Named(county.to_string()),
                    tract,
                ),
                county_source: CountySource::ZipFallback,
            };
        }

        debug!(county = ?raw.county, zip = ?raw.zip, "county unresolved");
        let state_name = state_code
            .as_deref()
            .and_then(|code| self.fips.state_name(code));
        ResolvedGeography {
            key: GeographicKey::new(state_name.map(str::to_string), County::Other, tract),
            county_source: CountySource::Unresolved,
        }
    }
}
