use proptest::prelude::*;

use tractkey_fwf::{CraSchemaCatalog, CraVariant, DecodeError, FixedWidthSchema, decode_line};

/// Builds a line of `len` characters by repeating the digits 0-9.
fn digits_line(len: usize) -> String {
    (0..len)
        .map(|i| char::from(b'0' + (i % 10) as u8))
        .collect()
}

fn pad(value: &str, width: usize) -> String {
    format!("{value:<width$}")
}

#[test]
fn decodes_tract_aggregate_line() {
    let catalog = CraSchemaCatalog::new().expect("catalog");
    let schema = catalog.schema(CraVariant::A11);

    let mut line = String::new();
    line.push_str("A1-1 "); // Table ID
    line.push_str("2021"); // Activity Year
    line.push('4'); // Loan Type
    line.push('1'); // Action Taken Type
    line.push_str("48"); // State
    line.push_str("113"); // County
    line.push_str("19124"); // MSA/MD
    line.push_str("0101.02"); // Census Tract
    line.push('N');
    line.push('U');
    line.push_str("002");
    line.push_str("040");
    for value in [12, 340, 3, 600, 1, 900, 14, 1200] {
        line.push_str(&format!("{value:>10}"));
    }
    line.push_str(&pad("", 29));

    assert_eq!(line.len(), schema.record_len());
    let record = schema.decode(&line).expect("decode");
    assert_eq!(record.len(), schema.field_count());
    assert_eq!(record.get("State"), Some("48"));
    assert_eq!(record.get("County"), Some("113"));
    assert_eq!(record.get("Census Tract"), Some("0101.02"));
    let total: usize = record.iter().map(|(_, value)| value.chars().count()).sum();
    assert_eq!(total, line.len());
}

#[test]
fn every_cra_schema_decodes_a_line_of_its_length() {
    let catalog = CraSchemaCatalog::new().expect("catalog");
    for (variant, schema) in catalog.iter() {
        let line = digits_line(schema.record_len());
        let record = decode_line(schema, &line).expect("decode");
        assert_eq!(record.len(), schema.field_count(), "{variant}");
    }
}

#[test]
fn short_cra_line_is_malformed() {
    let schema = CraVariant::D6.schema().expect("schema");
    let line = digits_line(143);
    assert_eq!(
        decode_line(&schema, &line),
        Err(DecodeError::MalformedRecord {
            expected: 144,
            actual: 143
        })
    );
}

fn schema_strategy() -> impl Strategy<Value = FixedWidthSchema> {
    prop::collection::vec(1usize..12, 1..10).prop_map(|widths| {
        let layout: Vec<(String, usize)> = widths
            .into_iter()
            .enumerate()
            .map(|(i, width)| (format!("F{i}"), width))
            .collect();
        let borrowed: Vec<(&str, usize)> = layout
            .iter()
            .map(|(name, width)| (name.as_str(), *width))
            .collect();
        FixedWidthSchema::from_layout("generated", &borrowed).expect("valid layout")
    })
}

proptest! {
    #[test]
    fn fields_are_positional_slices(schema in schema_strategy(), seed in "[a-zA-Z0-9 ]{0,120}") {
        let len = schema.record_len();
        let line: String = seed.chars().cycle().chain(std::iter::repeat('x')).take(len).collect();
        let record = decode_line(&schema, &line).expect("decode");
        prop_assert_eq!(record.len(), schema.field_count());
        let offsets = schema.offsets();
        for ((spec, offset), (name, value)) in schema.fields().iter().zip(offsets).zip(record.iter()) {
            prop_assert_eq!(name, spec.name.as_str());
            prop_assert_eq!(value, &line[offset..offset + spec.width]);
        }
    }

    #[test]
    fn wrong_length_yields_no_fields(schema in schema_strategy(), delta in 1usize..5, longer in any::<bool>()) {
        let expected = schema.record_len();
        let actual = if longer { expected + delta } else { expected.saturating_sub(delta) };
        prop_assume!(actual != expected);
        let line = digits_line(actual);
        let result = decode_line(&schema, &line);
        prop_assert_eq!(result, Err(DecodeError::MalformedRecord { expected, actual }));
    }
}
