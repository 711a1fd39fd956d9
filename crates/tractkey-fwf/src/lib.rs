//! Fixed-width record decoding.
//!
//! A [`FixedWidthSchema`] is an ordered list of named fields with character
//! widths. Decoding a line slices it positionally; there is no delimiter
//! scanning and a line of the wrong length is rejected outright.
//!
//! ```
//! use tractkey_fwf::{CraVariant, FixedWidthSchema};
//!
//! let schema = FixedWidthSchema::from_layout("demo", &[("State", 2), ("County", 3)]).unwrap();
//! let record = schema.decode("48113").unwrap();
//! assert_eq!(record.get("County"), Some("113"));
//!
//! assert_eq!(CraVariant::from_file_name("cra2021_Aggr_A11.dat").unwrap(), CraVariant::A11);
//! ```

pub mod cra;
pub mod decoder;
mod error;
pub mod schema;

pub use cra::{AMOUNT_MARKER, CraSchemaCatalog, CraVariant};
pub use decoder::{DecodedRecord, FixedWidthDecoder, decode_line};
pub use error::{DecodeError, Result};
pub use schema::{FieldSpec, FixedWidthSchema, GeographyLevel};
