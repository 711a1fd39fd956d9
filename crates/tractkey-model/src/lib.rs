pub mod catalog;
pub mod diagnostic;
pub mod error;
pub mod geography;

pub use catalog::{CodeLabelCatalog, MapCatalog};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use error::{ModelError, Result};
pub use geography::{County, CountySource, GeographicKey, MISSING_TRACT, ResolvedGeography, Tract};
