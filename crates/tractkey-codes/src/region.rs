//! The state and counties a run is restricted to.

use serde::Serialize;

use crate::error::{CodeTableError, Result};
use crate::fips::FipsCodeTable;
use crate::states::state_code_for_abbreviation;

/// Counties of interest, validated against the FIPS table so every name is
/// the table's canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub state_abbreviation: String,
    pub state_code: String,
    pub state_name: String,
    /// `(county code, canonical name)` in configured order.
    pub counties: Vec<(String, String)>,
}

impl Region {
    pub fn resolve(
        table: &FipsCodeTable,
        state_abbreviation: &str,
        counties: &[String],
    ) -> Result<Self> {
        let state_abbreviation = state_abbreviation.trim().to_ascii_uppercase();
        let unknown_state = || CodeTableError::UnknownState {
            abbreviation: state_abbreviation.clone(),
        };
        let state_code = state_code_for_abbreviation(&state_abbreviation).ok_or_else(unknown_state)?;
        let state_name = table.state_name(state_code).ok_or_else(unknown_state)?;

        let counties = counties
            .iter()
            .map(|county| {
                let code = table
                    .county_code_for_name(state_code, county)
                    .ok_or_else(|| CodeTableError::UnknownCounty {
                        county: county.clone(),
                        state: state_abbreviation.clone(),
                    })?;
                let name = table.county_name(code).unwrap_or(county);
                Ok((code.to_string(), name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            state_code: state_code.to_string(),
            state_name: state_name.to_string(),
            state_abbreviation,
            counties,
        })
    }

    pub fn county_names(&self) -> Vec<String> {
        self.counties.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn contains_county(&self, name: &str) -> bool {
        self.counties.iter().any(|(_, county)| county == name)
    }
}
