//! CRA flat file layouts.
//!
//! The FFIEC publishes CRA aggregate (`A*`) and disclosure (`D*`) tables plus
//! a transmittal sheet as fixed-width `.dat` files. Every variant maps to
//! exactly one schema; file names map to a variant by exact token match.
//!
//! | Variant            | Record | Geography |
//! |--------------------|--------|-----------|
//! | Transmittal        | 152    | none      |
//! | A1-1, A1-2, A2-1, A2-2 | 145 | tract   |
//! | A1-1a .. A2-2a     | 145    | county    |
//! | D1-1 .. D2-2       | 145    | county    |
//! | D3, D4             | 145    | county    |
//! | D5                 | 145    | none      |
//! | D6                 | 144    | tract     |

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{DecodeError, Result};
use crate::schema::{FieldSpec, FixedWidthSchema, GeographyLevel};

pub const FIELD_TABLE_ID: &str = "Table ID";
pub const FIELD_RESPONDENT_ID: &str = "Respondent ID";
pub const FIELD_STATE: &str = "State";
pub const FIELD_COUNTY: &str = "County";
pub const FIELD_CENSUS_TRACT: &str = "Census Tract";
pub const FIELD_FILLER: &str = "Filler";

/// Substring marking amount fields reported in thousands of dollars.
pub const AMOUNT_MARKER: &str = "Total Loan Amount";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CraVariant {
    Transmittal,
    A11,
    A11a,
    A12,
    A12a,
    A21,
    A21a,
    A22,
    A22a,
    D11,
    D12,
    D21,
    D22,
    D3,
    D4,
    D5,
    D6,
}

impl CraVariant {
    pub const ALL: [CraVariant; 17] = [
        CraVariant::Transmittal,
        CraVariant::A11,
        CraVariant::A11a,
        CraVariant::A12,
        CraVariant::A12a,
        CraVariant::A21,
        CraVariant::A21a,
        CraVariant::A22,
        CraVariant::A22a,
        CraVariant::D11,
        CraVariant::D12,
        CraVariant::D21,
        CraVariant::D22,
        CraVariant::D3,
        CraVariant::D4,
        CraVariant::D5,
        CraVariant::D6,
    ];

    /// File name token identifying the variant (upper-case).
    pub fn token(self) -> &'static str {
        match self {
            CraVariant::Transmittal => "TRANSMITTAL",
            CraVariant::A11 => "A11",
            CraVariant::A11a => "A11A",
            CraVariant::A12 => "A12",
            CraVariant::A12a => "A12A",
            CraVariant::A21 => "A21",
            CraVariant::A21a => "A21A",
            CraVariant::A22 => "A22",
            CraVariant::A22a => "A22A",
            CraVariant::D11 => "D11",
            CraVariant::D12 => "D12",
            CraVariant::D21 => "D21",
            CraVariant::D22 => "D22",
            CraVariant::D3 => "D3",
            CraVariant::D4 => "D4",
            CraVariant::D5 => "D5",
            CraVariant::D6 => "D6",
        }
    }

    /// Table name as printed in the FFIEC documentation (`A1-1a`, `D3`).
    pub fn table_name(self) -> &'static str {
        match self {
            CraVariant::Transmittal => "Transmittal",
            CraVariant::A11 => "A1-1",
            CraVariant::A11a => "A1-1a",
            CraVariant::A12 => "A1-2",
            CraVariant::A12a => "A1-2a",
            CraVariant::A21 => "A2-1",
            CraVariant::A21a => "A2-1a",
            CraVariant::A22 => "A2-2",
            CraVariant::A22a => "A2-2a",
            CraVariant::D11 => "D1-1",
            CraVariant::D12 => "D1-2",
            CraVariant::D21 => "D2-1",
            CraVariant::D22 => "D2-2",
            CraVariant::D3 => "D3",
            CraVariant::D4 => "D4",
            CraVariant::D5 => "D5",
            CraVariant::D6 => "D6",
        }
    }

    pub fn geography(self) -> GeographyLevel {
        match self {
            CraVariant::A11
            | CraVariant::A12
            | CraVariant::A21
            | CraVariant::A22
            | CraVariant::D6 => GeographyLevel::Tract,
            CraVariant::A11a
            | CraVariant::A12a
            | CraVariant::A21a
            | CraVariant::A22a
            | CraVariant::D11
            | CraVariant::D12
            | CraVariant::D21
            | CraVariant::D22
            | CraVariant::D3
            | CraVariant::D4 => GeographyLevel::County,
            CraVariant::Transmittal | CraVariant::D5 => GeographyLevel::None,
        }
    }

    /// Field layout in positional order.
    pub fn layout(self) -> Vec<FieldSpec> {
        match self {
            CraVariant::Transmittal => transmittal_layout(),
            CraVariant::A11 => tract_aggregate_layout(Subject::Business, Action::Originated),
            CraVariant::A12 => tract_aggregate_layout(Subject::Business, Action::Purchased),
            CraVariant::A21 => tract_aggregate_layout(Subject::Farm, Action::Originated),
            CraVariant::A22 => tract_aggregate_layout(Subject::Farm, Action::Purchased),
            CraVariant::A11a | CraVariant::A12a => lender_aggregate_layout(Subject::Business),
            CraVariant::A21a | CraVariant::A22a => lender_aggregate_layout(Subject::Farm),
            CraVariant::D11 => county_disclosure_layout(Subject::Business, Action::Originated),
            CraVariant::D12 => county_disclosure_layout(Subject::Business, Action::Purchased),
            CraVariant::D21 => county_disclosure_layout(Subject::Farm, Action::Originated),
            CraVariant::D22 => county_disclosure_layout(Subject::Farm, Action::Purchased),
            CraVariant::D3 => assessment_area_layout(Subject::Business),
            CraVariant::D4 => assessment_area_layout(Subject::Farm),
            CraVariant::D5 => affiliate_summary_layout(),
            CraVariant::D6 => assessment_tract_layout(),
        }
    }

    pub fn schema(self) -> Result<FixedWidthSchema> {
        FixedWidthSchema::new(self.table_name(), self.layout())
    }

    /// Maps a file name to its variant.
    ///
    /// The upper-cased stem is split at `_`, `-`, `.` and spaces; exactly one
    /// token must equal a variant token. `A11` never matches `A11A`.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name, |(stem, _)| stem)
            .to_ascii_uppercase();
        let tokens: Vec<&str> = stem
            .split(|c: char| matches!(c, '_' | '-' | '.' | ' '))
            .filter(|token| !token.is_empty())
            .collect();
        let matches: Vec<CraVariant> = Self::ALL
            .into_iter()
            .filter(|variant| tokens.contains(&variant.token()))
            .collect();
        match matches.as_slice() {
            [variant] => Ok(*variant),
            [] => Err(DecodeError::unmapped(
                file_name,
                "no CRA table token in file name",
            )),
            several => Err(DecodeError::unmapped(
                file_name,
                format!(
                    "ambiguous, matches {}",
                    several
                        .iter()
                        .map(|variant| variant.table_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }
}

impl fmt::Display for CraVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Every CRA schema, built once.
#[derive(Debug, Clone)]
pub struct CraSchemaCatalog {
    schemas: BTreeMap<CraVariant, FixedWidthSchema>,
}

impl CraSchemaCatalog {
    pub fn new() -> Result<Self> {
        let schemas: BTreeMap<_, _> = CraVariant::ALL
            .into_iter()
            .map(|variant| variant.schema().map(|schema| (variant, schema)))
            .collect::<Result<_>>()?;
        Ok(Self { schemas })
    }

    /// Total over [`CraVariant`]: every variant has a schema.
    pub fn schema(&self, variant: CraVariant) -> &FixedWidthSchema {
        &self.schemas[&variant]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CraVariant, &FixedWidthSchema)> {
        self.schemas.iter().map(|(variant, schema)| (*variant, schema))
    }
}

#[derive(Debug, Clone, Copy)]
enum Subject {
    Business,
    Farm,
}

impl Subject {
    fn noun(self) -> &'static str {
        match self {
            Subject::Business => "Small Business",
            Subject::Farm => "Small Farm",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Subject::Business => "Small Businesses",
            Subject::Farm => "Small Farms",
        }
    }

    fn top_band(self) -> &'static str {
        match self {
            Subject::Business => "> $250,000 and <= $1,000,000",
            Subject::Farm => "> $250,000 and <= $500,000",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Originated,
    Purchased,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Originated => "Originated",
            Action::Purchased => "Purchased",
        }
    }
}

fn field(name: impl Into<String>, width: usize) -> FieldSpec {
    FieldSpec::new(name, width)
}

/// Count/amount pair, 10 characters each.
fn measure_pair(fields: &mut Vec<FieldSpec>, subject: &str) {
    fields.push(field(format!("Number of {subject}"), 10));
    fields.push(field(format!("{AMOUNT_MARKER} of {subject}"), 10));
}

fn size_band_measures(fields: &mut Vec<FieldSpec>, subject: Subject, action: Action) {
    let loans = format!("{} Loans {}", subject.noun(), action.verb());
    for band in ["<= $100,000", "> $100,000 and <= $250,000", subject.top_band()] {
        measure_pair(
            fields,
            &format!("{loans} with Loan Amount at Origination {band}"),
        );
    }
    measure_pair(
        fields,
        &format!("{loans} to {} with Gross Annual Revenues <= $1 million", subject.plural()),
    );
}

fn transmittal_layout() -> Vec<FieldSpec> {
    vec![
        field(FIELD_RESPONDENT_ID, 10),
        field("Agency Code", 1),
        field("Activity Year", 4),
        field("Respondent Name", 30),
        field("Respondent Address", 40),
        field("Respondent City", 25),
        field("Respondent State", 2),
        field("Respondent Zip Code", 10),
        field("Tax ID", 10),
        field("ID_RSSD", 10),
        field("Assets", 10),
    ]
}

fn aggregate_prefix() -> Vec<FieldSpec> {
    vec![
        field(FIELD_TABLE_ID, 5),
        field("Activity Year", 4),
        field("Loan Type", 1),
        field("Action Taken Type", 1),
        field(FIELD_STATE, 2),
        field(FIELD_COUNTY, 3),
        field("MSA/MD", 5),
    ]
}

fn tract_aggregate_layout(subject: Subject, action: Action) -> Vec<FieldSpec> {
    let mut fields = aggregate_prefix();
    fields.extend([
        field(FIELD_CENSUS_TRACT, 7),
        field("Split County Indicator", 1),
        field("Population Classification", 1),
        field("Income Group Total", 3),
        field("Report Level", 3),
    ]);
    size_band_measures(&mut fields, subject, action);
    fields.push(field(FIELD_FILLER, 29));
    fields
}

fn lender_aggregate_layout(subject: Subject) -> Vec<FieldSpec> {
    let mut fields = aggregate_prefix();
    fields.extend([
        field(FIELD_RESPONDENT_ID, 10),
        field("Agency Code", 1),
        field("Number of Lenders", 5),
        field("Report Level", 3),
    ]);
    measure_pair(&mut fields, &format!("{} Loans", subject.noun()));
    measure_pair(
        &mut fields,
        &format!(
            "Loans to {} with Gross Annual Revenues <= $1 million",
            subject.plural()
        ),
    );
    fields.push(field(FIELD_FILLER, 65));
    fields
}

fn disclosure_prefix() -> Vec<FieldSpec> {
    vec![
        field(FIELD_TABLE_ID, 5),
        field(FIELD_RESPONDENT_ID, 10),
        field("Agency Code", 1),
        field("Activity Year", 4),
        field("Loan Type", 1),
    ]
}

fn county_disclosure_layout(subject: Subject, action: Action) -> Vec<FieldSpec> {
    let mut fields = disclosure_prefix();
    fields.extend([
        field("Action Taken Type", 1),
        field(FIELD_STATE, 2),
        field(FIELD_COUNTY, 3),
        field("MSA/MD", 5),
        field("Assessment Area Number", 4),
        field("Partial County Indicator", 1),
        field("Split County Indicator", 1),
        field("Population Classification", 1),
        field("Income Group Total", 3),
        field("Report Level", 3),
    ]);
    size_band_measures(&mut fields, subject, action);
    measure_pair(
        &mut fields,
        &format!(
            "{} Loans {} Reported as Affiliate Loans",
            subject.noun(),
            action.verb()
        ),
    );
    fields
}

fn assessment_area_layout(subject: Subject) -> Vec<FieldSpec> {
    let mut fields = disclosure_prefix();
    fields.extend([
        field(FIELD_STATE, 2),
        field(FIELD_COUNTY, 3),
        field("MSA/MD", 5),
        field("Assessment Area Number", 4),
        field("Partial County Indicator", 1),
        field("Split County Indicator", 1),
        field("Report Level", 2),
    ]);
    measure_pair(&mut fields, &format!("{} Loans Originated", subject.noun()));
    measure_pair(
        &mut fields,
        &format!(
            "Loans Originated to {} with Gross Annual Revenues <= $1 million",
            subject.plural()
        ),
    );
    measure_pair(&mut fields, &format!("{} Loans Purchased", subject.noun()));
    fields.push(field(FIELD_FILLER, 46));
    fields
}

fn affiliate_summary_layout() -> Vec<FieldSpec> {
    let mut fields = disclosure_prefix();
    measure_pair(&mut fields, "Loans");
    measure_pair(&mut fields, "Loans Reported as Affiliate Loans");
    fields.push(field("Action Type", 1));
    fields.push(field(FIELD_FILLER, 83));
    fields
}

fn assessment_tract_layout() -> Vec<FieldSpec> {
    vec![
        field(FIELD_TABLE_ID, 5),
        field(FIELD_RESPONDENT_ID, 10),
        field("Agency Code", 1),
        field("Activity Year", 4),
        field(FIELD_STATE, 2),
        field(FIELD_COUNTY, 3),
        field("MSA/MD", 5),
        field(FIELD_CENSUS_TRACT, 7),
        field("Assessment Area Number", 4),
        field("Partial County Indicator", 1),
        field("Split County Indicator", 1),
        field("Population Classification", 1),
        field("Income Group", 3),
        field("Loan Indicator", 1),
        field(FIELD_FILLER, 96),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(variant: CraVariant) -> Vec<usize> {
        variant.layout().iter().map(|field| field.width).collect()
    }

    #[test]
    fn test_published_widths() {
        assert_eq!(
            widths(CraVariant::Transmittal),
            vec![10, 1, 4, 30, 40, 25, 2, 10, 10, 10, 10]
        );
        assert_eq!(
            widths(CraVariant::A11),
            vec![5, 4, 1, 1, 2, 3, 5, 7, 1, 1, 3, 3, 10, 10, 10, 10, 10, 10, 10, 10, 29]
        );
        assert_eq!(
            widths(CraVariant::A22a),
            vec![5, 4, 1, 1, 2, 3, 5, 10, 1, 5, 3, 10, 10, 10, 10, 65]
        );
        assert_eq!(
            widths(CraVariant::D21),
            vec![
                5, 10, 1, 4, 1, 1, 2, 3, 5, 4, 1, 1, 1, 3, 3, 10, 10, 10, 10, 10, 10, 10, 10, 10,
                10
            ]
        );
        assert_eq!(
            widths(CraVariant::D4),
            vec![5, 10, 1, 4, 1, 2, 3, 5, 4, 1, 1, 2, 10, 10, 10, 10, 10, 10, 46]
        );
        assert_eq!(
            widths(CraVariant::D5),
            vec![5, 10, 1, 4, 1, 10, 10, 10, 10, 1, 83]
        );
        assert_eq!(
            widths(CraVariant::D6),
            vec![5, 10, 1, 4, 2, 3, 5, 7, 4, 1, 1, 1, 3, 1, 96]
        );
    }

    #[test]
    fn test_record_lengths() {
        let catalog = CraSchemaCatalog::new().unwrap();
        for (variant, schema) in catalog.iter() {
            let expected = match variant {
                CraVariant::Transmittal => 152,
                CraVariant::D6 => 144,
                _ => 145,
            };
            assert_eq!(schema.record_len(), expected, "{variant}");
        }
    }

    #[test]
    fn test_geography_fields_present() {
        for variant in CraVariant::ALL {
            let schema = variant.schema().unwrap();
            match variant.geography() {
                GeographyLevel::Tract => {
                    assert!(schema.contains(FIELD_CENSUS_TRACT), "{variant}");
                    assert!(schema.contains(FIELD_COUNTY), "{variant}");
                }
                GeographyLevel::County => {
                    assert!(!schema.contains(FIELD_CENSUS_TRACT), "{variant}");
                    assert!(schema.contains(FIELD_STATE), "{variant}");
                }
                GeographyLevel::None => assert!(!schema.contains(FIELD_COUNTY), "{variant}"),
            }
        }
    }

    #[test]
    fn test_amount_fields_marked() {
        let schema = CraVariant::D11.schema().unwrap();
        let amounts = schema
            .fields()
            .iter()
            .filter(|field| field.name.contains(AMOUNT_MARKER))
            .count();
        assert_eq!(amounts, 5);
    }

    #[test]
    fn test_from_file_name_exact_tokens() {
        assert_eq!(
            CraVariant::from_file_name("cra2021_Aggr_A11.dat"),
            Ok(CraVariant::A11)
        );
        assert_eq!(
            CraVariant::from_file_name("cra2021_Aggr_A11a.dat"),
            Ok(CraVariant::A11a)
        );
        assert_eq!(
            CraVariant::from_file_name("CRA2021_Discl_D3.dat"),
            Ok(CraVariant::D3)
        );
        assert_eq!(
            CraVariant::from_file_name("cra2021 transmittal.dat"),
            Ok(CraVariant::Transmittal)
        );
    }

    #[test]
    fn test_from_file_name_unmapped() {
        assert!(matches!(
            CraVariant::from_file_name("cra2021_Discl_D1.dat"),
            Err(DecodeError::UnmappedFile { .. })
        ));
        assert!(matches!(
            CraVariant::from_file_name("readme.txt"),
            Err(DecodeError::UnmappedFile { .. })
        ));
        let err = CraVariant::from_file_name("a11_vs_d11.dat").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }
}
