//! FIPS state and county code tables.
//!
//! Built from the FCC `fips.txt` listing: a free-text header followed by a
//! state block and a county block, each line holding a numeric code and a
//! name (`      48        TEXAS`, `      48113        Dallas County`).
//! Blocks are addressed by 0-based line ranges.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CodeTableError, Result};

/// Line ranges of the state and county blocks in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FipsListingLayout {
    pub state_lines: Range<usize>,
    pub county_lines: Range<usize>,
}

impl Default for FipsListingLayout {
    fn default() -> Self {
        Self {
            state_lines: 16..67,
            county_lines: 72..3267,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FipsEntry {
    pub code: String,
    pub name: String,
}

/// Splits a listing line into its leading digit run and the name after it.
///
/// Returns `None` when the line has no digits or the remainder has no
/// alphabetic character.
pub fn parse_listing_line(line: &str) -> Option<FipsEntry> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let rest = &line[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let code = &rest[..end];
    let name = rest[end..].split_whitespace().collect::<Vec<_>>().join(" ");
    if !name.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(FipsEntry {
        code: code.to_string(),
        name,
    })
}

/// Read-only state and county code maps.
#[derive(Debug, Clone, Default)]
pub struct FipsCodeTable {
    state_codes: BTreeMap<String, String>,
    county_codes: BTreeMap<String, String>,
    /// (state code, upper-cased county name) -> county code
    county_by_name: BTreeMap<(String, String), String>,
}

/// A parsed table and the number of in-range lines that were skipped.
#[derive(Debug, Clone)]
pub struct FipsParse {
    pub table: FipsCodeTable,
    pub skipped_lines: usize,
}

impl FipsCodeTable {
    /// Parses a listing. Duplicate codes keep the last name seen.
    pub fn parse(text: &str, layout: &FipsListingLayout) -> Result<FipsParse> {
        if text.trim().is_empty() {
            return Err(CodeTableError::EmptySource { table: "FIPS" });
        }

        let mut state_codes = BTreeMap::new();
        let mut county_codes = BTreeMap::new();
        let mut skipped_lines = 0usize;
        for (index, line) in text.lines().enumerate() {
            let target = if layout.state_lines.contains(&index) {
                &mut state_codes
            } else if layout.county_lines.contains(&index) {
                &mut county_codes
            } else {
                continue;
            };
            match parse_listing_line(line) {
                Some(entry) => {
                    target.insert(entry.code, entry.name);
                }
                None => {
                    debug!(line = index, "skipping FIPS listing line");
                    skipped_lines += 1;
                }
            }
        }

        check_range("FIPS state", &state_codes, &layout.state_lines)?;
        check_range("FIPS county", &county_codes, &layout.county_lines)?;
        if skipped_lines > 0 {
            warn!(skipped_lines, "FIPS listing lines without code or name");
        }

        Ok(FipsParse {
            table: Self::from_maps(state_codes, county_codes),
            skipped_lines,
        })
    }

    pub fn load(path: &Path, layout: &FipsListingLayout) -> Result<FipsParse> {
        let text = std::fs::read_to_string(path).map_err(|err| CodeTableError::io(path, err))?;
        Self::parse(&text, layout)
    }

    pub fn from_maps(
        state_codes: BTreeMap<String, String>,
        county_codes: BTreeMap<String, String>,
    ) -> Self {
        let county_by_name = county_codes
            .iter()
            .filter(|(code, _)| code.len() == 5)
            .map(|(code, name)| {
                (
                    (code[..2].to_string(), name.to_uppercase()),
                    code.clone(),
                )
            })
            .collect();
        Self {
            state_codes,
            county_codes,
            county_by_name,
        }
    }

    pub fn state_codes(&self) -> &BTreeMap<String, String> {
        &self.state_codes
    }

    pub fn county_codes(&self) -> &BTreeMap<String, String> {
        &self.county_codes
    }

    pub fn state_name(&self, code: &str) -> Option<&str> {
        self.state_codes.get(code).map(String::as_str)
    }

    pub fn county_name(&self, code: &str) -> Option<&str> {
        self.county_codes.get(code).map(String::as_str)
    }

    /// State code for a name, ignoring case (`Texas` -> `48`).
    pub fn state_code_for_name(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.state_codes
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(code, _)| code.as_str())
    }

    /// County code for a name within a state, ignoring case. A bare name
    /// (`Dallas`) also matches its ` County` form.
    pub fn county_code_for_name(&self, state_code: &str, name: &str) -> Option<&str> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            return None;
        }
        let lookup = |candidate: String| {
            self.county_by_name
                .get(&(state_code.to_string(), candidate))
                .map(String::as_str)
        };
        lookup(name.to_uppercase()).or_else(|| lookup(qualify_county_name(&name).to_uppercase()))
    }

    /// Counties whose code starts with `state_code`.
    pub fn counties_in_state<'a>(
        &'a self,
        state_code: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.county_codes
            .iter()
            .filter(move |(code, _)| code.starts_with(state_code))
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }
}

/// Appends ` County` unless the name already ends with it.
pub fn qualify_county_name(name: &str) -> String {
    let name = name.trim();
    if name.to_ascii_lowercase().ends_with(" county") {
        name.to_string()
    } else {
        format!("{name} County")
    }
}

fn check_range(
    table: &'static str,
    entries: &BTreeMap<String, String>,
    range: &Range<usize>,
) -> Result<()> {
    if entries.is_empty() {
        return Err(CodeTableError::EmptyRange {
            table,
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}
