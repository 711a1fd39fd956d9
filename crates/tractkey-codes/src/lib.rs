//! Lookup tables that every normalization consults: FIPS state and county
//! codes, USPS state abbreviations, and the ZIP to county fallback index.
//!
//! All tables are built once before any record is normalized and are
//! read-only afterwards.

pub mod csv_utils;
pub mod error;
pub mod fips;
pub mod labels;
pub mod region;
pub mod states;
pub mod zip;

pub use error::{CodeTableError, Result};
pub use fips::{FipsCodeTable, FipsEntry, FipsListingLayout, FipsParse, qualify_county_name};
pub use labels::{load_alias_map, load_label_catalog};
pub use region::Region;
pub use states::{STATE_ABBREVIATIONS, abbreviation_for_state_code, state_code_for_abbreviation};
pub use zip::{CsvZipMembership, ZipCountyIndex, ZipMembershipSource, normalize_zip};
