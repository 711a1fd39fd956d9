use std::collections::BTreeMap;

use proptest::prelude::*;

use tractkey_codes::FipsCodeTable;
use tractkey_model::{County, CountySource, Tract};
use tractkey_normalize::{
    CensusLabelParser, GeographicKeyNormalizer, RawCounty, RawGeography, RawState, RawTract,
    normalize_tract, pad_county_code,
};

fn table() -> FipsCodeTable {
    let states = BTreeMap::from([("48".to_string(), "TEXAS".to_string())]);
    let counties = BTreeMap::from([
        ("48085".to_string(), "Collin County".to_string()),
        ("48113".to_string(), "Dallas County".to_string()),
        ("48439".to_string(), "Tarrant County".to_string()),
    ]);
    FipsCodeTable::from_maps(states, counties)
}

#[test]
fn same_tract_from_different_encodings_joins() {
    let table = table();
    let normalizer = GeographicKeyNormalizer::new(&table);

    // FFIEC: separate numeric fields, implied-decimal tract.
    let ffiec = RawGeography::new(RawState::Fips("48"), RawCounty::Fips { code: "113" })
        .with_tract(RawTract::ImpliedDecimal("10102"));
    // HMDA: abbreviation, combined county, embedded tract.
    let hmda = RawGeography::new(
        RawState::Abbreviation("TX"),
        RawCounty::Combined { code: "48113" },
    )
    .with_tract(RawTract::Embedded("48113010102"));
    // CRA: unpadded fragments, decimal tract.
    let cra = RawGeography::new(RawState::Fips("48"), RawCounty::Fips { code: "113" })
        .with_tract(RawTract::Decimal("0101.02"));
    // Census: label.
    let parser = CensusLabelParser::new().expect("parser");
    let label = parser
        .parse("Census Tract 101.02; Dallas County; Texas")
        .expect("label");

    let keys = [
        normalizer.normalize(&ffiec).key,
        normalizer.normalize(&hmda).key,
        normalizer.normalize(&cra).key,
        normalizer.normalize(&label.raw_geography()).key,
    ];
    for key in &keys[1..] {
        assert_eq!(key, &keys[0]);
    }
    assert_eq!(keys[0].county, County::Named("Dallas County".into()));
    assert_eq!(keys[0].tract, Some(Tract::from_hundredths(10102)));
}

#[test]
fn empty_tract_is_sentinel_not_zero() {
    let empty = normalize_tract(&RawTract::ImpliedDecimal("")).expect("tract");
    let zero = normalize_tract(&RawTract::ImpliedDecimal("0")).expect("tract");
    assert!(empty.is_missing());
    assert_eq!(zero.as_str(), "0000.00");
    assert_ne!(empty, zero);
}

proptest! {
    #[test]
    fn implied_decimal_matches_decimal(hundredths in 0u64..1_000_000) {
        let implied = hundredths.to_string();
        let decimal = format!("{}.{:02}", hundredths / 100, hundredths % 100);
        prop_assert_eq!(
            normalize_tract(&RawTract::ImpliedDecimal(&implied)),
            normalize_tract(&RawTract::Decimal(&decimal))
        );
    }

    #[test]
    fn county_fragment_padding_is_idempotent(county in 0u32..1000) {
        let raw = county.to_string();
        let padded = pad_county_code(&raw).expect("fragment");
        prop_assert_eq!(padded.len(), 3);
        prop_assert_eq!(pad_county_code(&padded), Some(padded.clone()));
    }

    #[test]
    fn unknown_counties_never_resolve(county in 500u32..1000) {
        let table = table();
        let normalizer = GeographicKeyNormalizer::new(&table);
        let code = county.to_string();
        let resolved = normalizer.normalize(&RawGeography::new(
            RawState::Fips("48"),
            RawCounty::Fips { code: &code },
        ));
        prop_assert_eq!(resolved.county_source, CountySource::Unresolved);
        prop_assert_eq!(resolved.key.county, County::Other);
    }
}
