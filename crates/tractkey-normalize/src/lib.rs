//! Geographic identifier normalization.
//!
//! Every dataset spells state, county, and tract differently. The raw
//! spellings are modelled as variants ([`RawState`], [`RawCounty`],
//! [`RawTract`]) and [`GeographicKeyNormalizer`] maps them onto one
//! [`tractkey_model::GeographicKey`] using the code tables.

pub mod census;
pub mod codes;
pub mod institution;
pub mod normalizer;
pub mod raw;
pub mod tract;

pub use census::{CensusLabel, CensusLabelParser};
pub use codes::{
    is_missing_value, pad_county_code, pad_state_code, split_combined_county, strip_float_suffix,
};
pub use institution::{InstitutionNameCleaner, standardize_institution_name};
pub use normalizer::GeographicKeyNormalizer;
pub use raw::{CountyCodePolicy, RawCounty, RawGeography, RawState, RawTract};
pub use tract::normalize_tract;
