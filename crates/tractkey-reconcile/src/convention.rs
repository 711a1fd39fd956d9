//! Where each dataset keeps its geography and how it spells it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use tractkey_fwf::{CraVariant, GeographyLevel};
use tractkey_normalize::{RawCounty, RawGeography, RawState, RawTract};

/// Dataset family named in run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Directory of CRA fixed-width `.dat` files.
    Cra,
    Hmda,
    Ffiec,
    FdicInstitutions,
    FdicLocations,
    /// SBA 7(a) loans: borrower state and ZIP only.
    Sba,
    CensusTracts,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 7] = [
        SourceFormat::Cra,
        SourceFormat::Hmda,
        SourceFormat::Ffiec,
        SourceFormat::FdicInstitutions,
        SourceFormat::FdicLocations,
        SourceFormat::Sba,
        SourceFormat::CensusTracts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Cra => "cra",
            SourceFormat::Hmda => "hmda",
            SourceFormat::Ffiec => "ffiec",
            SourceFormat::FdicInstitutions => "fdic_institutions",
            SourceFormat::FdicLocations => "fdic_locations",
            SourceFormat::Sba => "sba",
            SourceFormat::CensusTracts => "census_tracts",
        }
    }

    /// Convention for single-file formats; `None` for CRA, whose convention
    /// depends on the table variant of each file.
    pub fn convention(self) -> Option<SourceConvention> {
        match self {
            SourceFormat::Cra => None,
            SourceFormat::Hmda => Some(SourceConvention::Hmda),
            SourceFormat::Ffiec => Some(SourceConvention::Ffiec),
            SourceFormat::FdicInstitutions => Some(SourceConvention::FdicInstitutions),
            SourceFormat::FdicLocations => Some(SourceConvention::FdicLocations),
            SourceFormat::Sba => Some(SourceConvention::Sba),
            SourceFormat::CensusTracts => Some(SourceConvention::CensusTracts),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        SourceFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| format!("unknown source format '{s}'"))
    }
}

/// Column layout of a delimited source.
///
/// A source without a county column resolves counties through the ZIP
/// index only, so its ZIP column is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedColumns {
    pub has_headers: bool,
    pub state: &'static str,
    pub county: Option<&'static str>,
    pub tract: Option<&'static str>,
    pub zip: Option<&'static str>,
    /// Institution name column that gets a cleaned copy.
    pub institution_name: Option<&'static str>,
}

/// Column holding the cleaned institution name.
pub const CLEAN_NAME_FIELD: &str = "CLEAN_NAME";

/// Geographic field values of one record, before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeoFields<'r> {
    pub state: &'r str,
    pub county: &'r str,
    pub tract: Option<&'r str>,
    pub zip: Option<&'r str>,
}

/// Per-dataset encoding of state, county, and tract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceConvention {
    Cra(CraVariant),
    Hmda,
    Ffiec,
    FdicInstitutions,
    FdicLocations,
    Sba,
    CensusTracts,
}

impl SourceConvention {
    pub fn format(self) -> SourceFormat {
        match self {
            SourceConvention::Cra(_) => SourceFormat::Cra,
            SourceConvention::Hmda => SourceFormat::Hmda,
            SourceConvention::Ffiec => SourceFormat::Ffiec,
            SourceConvention::FdicInstitutions => SourceFormat::FdicInstitutions,
            SourceConvention::FdicLocations => SourceFormat::FdicLocations,
            SourceConvention::Sba => SourceFormat::Sba,
            SourceConvention::CensusTracts => SourceFormat::CensusTracts,
        }
    }

    /// Column names for delimited sources.
    pub fn delimited_columns(self) -> Option<DelimitedColumns> {
        let fdic = DelimitedColumns {
            has_headers: true,
            state: "STALP",
            county: Some("COUNTY"),
            tract: None,
            zip: Some("ZIP"),
            institution_name: Some("NAME"),
        };
        match self {
            SourceConvention::Hmda => Some(DelimitedColumns {
                has_headers: true,
                state: "state_code",
                county: Some("county_code"),
                tract: Some("census_tract"),
                zip: None,
                institution_name: None,
            }),
            // Headerless; columns are year, MSA/MD, state, county, tract, ...
            SourceConvention::Ffiec => Some(DelimitedColumns {
                has_headers: false,
                state: "2",
                county: Some("3"),
                tract: Some("4"),
                zip: None,
                institution_name: None,
            }),
            SourceConvention::FdicInstitutions | SourceConvention::FdicLocations => Some(fdic),
            SourceConvention::Sba => Some(DelimitedColumns {
                has_headers: true,
                state: "borrstate",
                county: None,
                tract: None,
                zip: Some("borrzip"),
                institution_name: Some("bankname"),
            }),
            SourceConvention::Cra(_) | SourceConvention::CensusTracts => None,
        }
    }

    /// Whether records of this source carry a tract.
    pub fn has_tract(self) -> bool {
        match self {
            SourceConvention::Cra(variant) => variant.geography() == GeographyLevel::Tract,
            SourceConvention::Hmda | SourceConvention::Ffiec | SourceConvention::CensusTracts => {
                true
            }
            SourceConvention::FdicInstitutions
            | SourceConvention::FdicLocations
            | SourceConvention::Sba => false,
        }
    }

    /// Wraps field values in the raw variants this source uses.
    pub fn raw_geography<'r>(self, fields: GeoFields<'r>) -> RawGeography<'r> {
        let (state, county) = match self {
            SourceConvention::Cra(_) | SourceConvention::Ffiec => (
                RawState::Fips(fields.state),
                RawCounty::Fips {
                    code: fields.county,
                },
            ),
            SourceConvention::Hmda => (
                RawState::Abbreviation(fields.state),
                RawCounty::Combined {
                    code: fields.county,
                },
            ),
            SourceConvention::FdicInstitutions
            | SourceConvention::FdicLocations
            | SourceConvention::Sba => (
                RawState::Abbreviation(fields.state),
                RawCounty::Name {
                    name: fields.county,
                },
            ),
            SourceConvention::CensusTracts => (
                RawState::Name(fields.state),
                RawCounty::Name {
                    name: fields.county,
                },
            ),
        };

        let tract = if self.has_tract() {
            let value = fields.tract.unwrap_or("");
            match self {
                SourceConvention::Hmda => RawTract::Embedded(value),
                SourceConvention::Ffiec => RawTract::ImpliedDecimal(value),
                _ => RawTract::Decimal(value),
            }
        } else {
            RawTract::Absent
        };

        let mut raw = RawGeography::new(state, county).with_tract(tract);
        if let Some(zip) = fields.zip {
            raw = raw.with_zip(zip);
        }
        raw
    }
}

impl fmt::Display for SourceConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceConvention::Cra(variant) => write!(f, "cra:{}", variant.table_name()),
            other => f.write_str(other.format().as_str()),
        }
    }
}
