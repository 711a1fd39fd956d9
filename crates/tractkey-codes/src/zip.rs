//! ZIP code to county index used as a fallback when a record's county field
//! cannot be resolved directly.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::csv_utils::{get_field, read_csv_rows, require_columns};
use crate::error::{CodeTableError, Result};
use crate::fips::qualify_county_name;
use crate::region::Region;

/// Supplies the ZIP codes that fall in a county.
pub trait ZipMembershipSource {
    fn zip_codes(&self, county: &str, state_abbreviation: &str) -> Result<Vec<String>>;
}

/// Normalizes a raw ZIP to five digits.
///
/// Strips a float suffix (`75201.0`), drops a ZIP+4 extension
/// (`75201-1234`), and restores leading zeros lost to numeric storage
/// (`1234` -> `01234`). Returns `None` for anything else.
pub fn normalize_zip(raw: &str) -> Option<String> {
    let value = raw.trim();
    let value = value.strip_suffix(".0").unwrap_or(value);
    let value = value.split_once('-').map_or(value, |(zip, _)| zip);
    if value.is_empty() || value.len() > 5 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{value:0>5}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ZipRow {
    zip: String,
    county: String,
    state: String,
}

/// ZIP membership read from a `zip,county,state` CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvZipMembership {
    rows: Vec<ZipRow>,
}

impl CsvZipMembership {
    pub fn load(path: &Path) -> Result<Self> {
        let rows = read_csv_rows(path)?;
        require_columns(path, &rows, &["zip", "county", "state"])?;
        let rows = rows
            .iter()
            .filter_map(|row| {
                let zip = normalize_zip(get_field(row, "zip"))?;
                Some(ZipRow {
                    zip,
                    county: get_field(row, "county").to_string(),
                    state: get_field(row, "state").to_string(),
                })
            })
            .collect::<Vec<_>>();
        if rows.is_empty() {
            return Err(CodeTableError::EmptySource { table: "ZIP" });
        }
        Ok(Self { rows })
    }

    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .filter_map(|(zip, county, state)| {
                Some(ZipRow {
                    zip: normalize_zip(zip.as_ref())?,
                    county: county.as_ref().trim().to_string(),
                    state: state.as_ref().trim().to_string(),
                })
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ZipMembershipSource for CsvZipMembership {
    fn zip_codes(&self, county: &str, state_abbreviation: &str) -> Result<Vec<String>> {
        let wanted = qualify_county_name(county);
        Ok(self
            .rows
            .iter()
            .filter(|row| row.state.eq_ignore_ascii_case(state_abbreviation.trim()))
            .filter(|row| qualify_county_name(&row.county).eq_ignore_ascii_case(&wanted))
            .map(|row| row.zip.clone())
            .collect())
    }
}

/// ZIP -> county name for the counties of interest.
#[derive(Debug, Clone)]
pub struct ZipCountyIndex {
    state_abbreviation: String,
    counties: Vec<String>,
    by_zip: BTreeMap<String, usize>,
    overlaps: usize,
}

impl ZipCountyIndex {
    /// Queries `source` once per county. A ZIP listed under several counties
    /// belongs to the first one in `counties`. An empty county list is an
    /// error: the index would resolve nothing.
    pub fn build(
        counties: &[String],
        state_abbreviation: &str,
        source: &dyn ZipMembershipSource,
    ) -> Result<Self> {
        if counties.is_empty() {
            return Err(CodeTableError::NoCounties {
                state: state_abbreviation.to_string(),
            });
        }
        let mut by_zip = BTreeMap::new();
        let mut overlaps = 0usize;
        for (index, county) in counties.iter().enumerate() {
            let zips = source.zip_codes(county, state_abbreviation)?;
            if zips.is_empty() {
                return Err(CodeTableError::NoZipCodes {
                    county: county.clone(),
                    state: state_abbreviation.to_string(),
                });
            }
            debug!(county = %county, zips = zips.len(), "zip membership loaded");
            for zip in zips {
                let Some(zip) = normalize_zip(&zip) else {
                    continue;
                };
                if let Some(&owner) = by_zip.get(&zip) {
                    if owner != index {
                        overlaps += 1;
                        warn!(
                            zip = %zip,
                            kept = %counties[owner],
                            dropped = %county,
                            "zip code spans counties of interest"
                        );
                    }
                    continue;
                }
                by_zip.insert(zip, index);
            }
        }
        Ok(Self {
            state_abbreviation: state_abbreviation.trim().to_ascii_uppercase(),
            counties: counties.to_vec(),
            by_zip,
            overlaps,
        })
    }

    pub fn for_region(region: &Region, source: &dyn ZipMembershipSource) -> Result<Self> {
        Self::build(&region.county_names(), &region.state_abbreviation, source)
    }

    /// County containing `zip`, or `None` when the ZIP is outside every
    /// county of interest.
    pub fn county_for_zip(&self, zip: &str) -> Option<&str> {
        let zip = normalize_zip(zip)?;
        self.by_zip
            .get(&zip)
            .map(|&index| self.counties[index].as_str())
    }

    pub fn state_abbreviation(&self) -> &str {
        &self.state_abbreviation
    }

    pub fn counties(&self) -> &[String] {
        &self.counties
    }

    pub fn overlap_count(&self) -> usize {
        self.overlaps
    }

    pub fn len(&self) -> usize {
        self.by_zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_zip.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership() -> CsvZipMembership {
        CsvZipMembership::from_rows([
            ("75201", "Dallas", "TX"),
            ("75252", "Dallas", "TX"),
            ("75252", "Collin County", "TX"),
            ("75002", "Collin", "TX"),
            ("76102", "Tarrant", "TX"),
            ("75201", "Dallas", "OK"),
        ])
    }

    fn counties() -> Vec<String> {
        vec!["Dallas County".into(), "Collin County".into()]
    }

    #[test]
    fn test_normalize_zip() {
        assert_eq!(normalize_zip("75201"), Some("75201".into()));
        assert_eq!(normalize_zip("75201.0"), Some("75201".into()));
        assert_eq!(normalize_zip("75201-1234"), Some("75201".into()));
        assert_eq!(normalize_zip("1234"), Some("01234".into()));
        assert_eq!(normalize_zip(""), None);
        assert_eq!(normalize_zip("7520A"), None);
        assert_eq!(normalize_zip("752011"), None);
    }

    #[test]
    fn test_overlap_goes_to_first_county() {
        let index = ZipCountyIndex::build(&counties(), "TX", &membership()).unwrap();
        assert_eq!(index.county_for_zip("75252"), Some("Dallas County"));
        assert_eq!(index.county_for_zip("75002"), Some("Collin County"));
        assert_eq!(index.overlap_count(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_outside_zip_is_none() {
        let index = ZipCountyIndex::build(&counties(), "TX", &membership()).unwrap();
        assert_eq!(index.county_for_zip("76102"), None);
        assert_eq!(index.county_for_zip("not a zip"), None);
        assert_eq!(index.county_for_zip("75201-0001"), Some("Dallas County"));
    }

    #[test]
    fn test_county_without_zips_fails() {
        let err = ZipCountyIndex::build(&["Harris County".into()], "TX", &membership())
            .unwrap_err();
        assert!(matches!(err, CodeTableError::NoZipCodes { .. }));
    }

    #[test]
    fn test_empty_county_list_fails() {
        let err = ZipCountyIndex::build(&[], "TX", &membership()).unwrap_err();
        assert!(matches!(err, CodeTableError::NoCounties { .. }));
    }
}
