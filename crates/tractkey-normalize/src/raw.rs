//! Raw identifier encodings, one variant per source convention.

/// How a source spells its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawState<'r> {
    /// Numeric FIPS code, possibly unpadded or float-suffixed (`6`, `48.0`).
    Fips(&'r str),
    /// USPS abbreviation (`TX`).
    Abbreviation(&'r str),
    /// Full name, any case (`Texas`).
    Name(&'r str),
}

/// How a county code fragment is turned into the 3-digit county portion.
///
/// Kept as two named policies because the datasets disagree on where the
/// county digits live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountyCodePolicy {
    /// Separate state and county fields; the county is left-padded by length
    /// (CRA, FFIEC).
    ZeroAdder,
    /// One combined state+county field; the last three characters are the
    /// county (HMDA).
    RightTruncate,
}

/// How a source spells its county.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawCounty<'r> {
    /// County fragment next to a separate state field.
    Fips { code: &'r str },
    /// Combined state+county code.
    Combined { code: &'r str },
    /// Bare (`Dallas`) or qualified (`Dallas County`) name.
    Name { name: &'r str },
}

impl RawCounty<'_> {
    /// Code policy for the coded variants; `None` for names.
    pub fn policy(&self) -> Option<CountyCodePolicy> {
        match self {
            RawCounty::Fips { .. } => Some(CountyCodePolicy::ZeroAdder),
            RawCounty::Combined { .. } => Some(CountyCodePolicy::RightTruncate),
            RawCounty::Name { .. } => None,
        }
    }
}

/// How a source spells its census tract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTract<'r> {
    /// Integer with the decimal point implied two places from the right
    /// (`10102` is tract 101.02).
    ImpliedDecimal(&'r str),
    /// Explicit decimal, optionally prefixed (`101.02`, `Census Tract 101.02`).
    Decimal(&'r str),
    /// Tract embedded at the end of an 11-digit state+county+tract code.
    Embedded(&'r str),
    /// The source has no tract field.
    Absent,
}

/// Raw geographic fields of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGeography<'r> {
    pub state: RawState<'r>,
    pub county: RawCounty<'r>,
    pub tract: RawTract<'r>,
    pub zip: Option<&'r str>,
}

impl<'r> RawGeography<'r> {
    pub fn new(state: RawState<'r>, county: RawCounty<'r>) -> Self {
        Self {
            state,
            county,
            tract: RawTract::Absent,
            zip: None,
        }
    }

    pub fn with_tract(mut self, tract: RawTract<'r>) -> Self {
        self.tract = tract;
        self
    }

    pub fn with_zip(mut self, zip: &'r str) -> Self {
        self.zip = Some(zip);
        self
    }
}
