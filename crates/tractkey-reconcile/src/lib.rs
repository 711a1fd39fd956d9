//! Reconciliation of heterogeneous datasets onto one geographic key.
//!
//! [`DatasetReconciler`] reads each source with the reader its
//! [`SourceConvention`] calls for and normalizes every record through the
//! shared [`tractkey_normalize::GeographicKeyNormalizer`]. The resulting
//! streams can be restricted with a [`GeographyFilter`], joined with [`join`]
//! at an explicit [`JoinGranularity`], or exported with [`records_to_frame`].

pub mod convention;
pub mod error;
pub mod filter;
pub mod frame;
pub mod join;
pub mod reconciler;
pub mod record;

pub use convention::{CLEAN_NAME_FIELD, DelimitedColumns, GeoFields, SourceConvention, SourceFormat};
pub use error::{ReconcileError, Result};
pub use filter::GeographyFilter;
pub use frame::{KEY_COLUMNS, LABEL_SUFFIX, field_union, records_to_frame};
pub use join::{JoinGranularity, JoinOutcome, JoinedPair, join, join_key};
pub use reconciler::{CraReconciliation, DatasetReconciler, ReconcileOptions};
pub use record::{
    RESPONDENT_ID_WIDTH, ReconciledRecord, ReconciledSource, SourceStats, derive_record_id,
    is_amount_field, pad_respondent_id, scale_thousands,
};
