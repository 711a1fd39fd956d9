use std::fs;

use tempfile::TempDir;

use tractkey_codes::{
    CodeTableError, CsvZipMembership, FipsCodeTable, FipsListingLayout, Region, ZipCountyIndex,
    load_alias_map, load_label_catalog,
};
use tractkey_model::CodeLabelCatalog;

const FIPS_LISTING: &str = "\
FIPS codes for the states and District of Columbia
        state-level    place
        FIPS code      name
        06             CALIFORNIA
        48             TEXAS

        county-level   place
        FIPS code      name
        06001          Alameda County
        48085          Collin County
        48113          Dallas County
        48439          Tarrant County
";

fn layout() -> FipsListingLayout {
    FipsListingLayout {
        state_lines: 3..5,
        county_lines: 8..12,
    }
}

#[test]
fn loads_fips_listing_and_region() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("fips.txt");
    fs::write(&path, FIPS_LISTING).expect("write listing");

    let parsed = FipsCodeTable::load(&path, &layout()).expect("load listing");
    assert_eq!(parsed.skipped_lines, 0);
    assert_eq!(parsed.table.state_name("48"), Some("TEXAS"));
    assert_eq!(parsed.table.county_name("48439"), Some("Tarrant County"));

    let region = Region::resolve(
        &parsed.table,
        "TX",
        &["Tarrant".into(), "Collin".into(), "Dallas".into()],
    )
    .expect("region");
    assert_eq!(
        region.county_names(),
        vec!["Tarrant County", "Collin County", "Dallas County"]
    );
}

#[test]
fn missing_listing_is_io_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = FipsCodeTable::load(&dir.path().join("absent.txt"), &layout()).unwrap_err();
    assert!(matches!(err, CodeTableError::Io { .. }));
}

#[test]
fn builds_zip_index_from_csv() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("zips.csv");
    fs::write(
        &path,
        "\u{feff}ZIP,County,State\n75201,Dallas County,TX\n75002.0,Collin County,TX\n76102,Tarrant County,TX\n",
    )
    .expect("write zips");

    let membership = CsvZipMembership::load(&path).expect("load zips");
    assert_eq!(membership.len(), 3);
    let counties = vec!["Dallas County".to_string(), "Collin County".to_string()];
    let index = ZipCountyIndex::build(&counties, "TX", &membership).expect("index");
    assert_eq!(index.county_for_zip("75002"), Some("Collin County"));
    assert_eq!(index.county_for_zip("76102"), None);
}

#[test]
fn zip_csv_without_county_column_fails() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("zips.csv");
    fs::write(&path, "zip,state\n75201,TX\n").expect("write zips");
    let err = CsvZipMembership::load(&path).unwrap_err();
    assert!(matches!(err, CodeTableError::MissingColumn { ref column, .. } if column == "county"));
}

#[test]
fn zip_csv_without_rows_is_empty_source() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("zips.csv");
    fs::write(&path, "zip,county,state\n").expect("write zips");
    let err = CsvZipMembership::load(&path).unwrap_err();
    assert!(matches!(err, CodeTableError::EmptySource { table: "ZIP" }));

    fs::write(&path, "zip,county,state\nnot-a-zip,Dallas,TX\n").expect("write zips");
    let err = CsvZipMembership::load(&path).unwrap_err();
    assert!(matches!(err, CodeTableError::EmptySource { table: "ZIP" }));
}

#[test]
fn loads_labels_and_aliases() {
    let dir = TempDir::new().expect("temp dir");
    let labels = dir.path().join("labels.csv");
    fs::write(
        &labels,
        "field,code,label\nAction Taken Type,1,Originated\nAction Taken Type,6,Purchased\n",
    )
    .expect("write labels");
    let catalog = load_label_catalog(&labels).expect("labels");
    assert_eq!(catalog.label("Action Taken Type", "6"), Some("Purchased"));

    let aliases = dir.path().join("aliases.csv");
    fs::write(
        &aliases,
        "alias,canonical\nAmerican National Bank of Texas,AMERICAN NATIONAL BANK\n",
    )
    .expect("write aliases");
    let map = load_alias_map(&aliases).expect("aliases");
    assert_eq!(
        map.get("AMERICAN NATIONAL BANK OF TEXAS").map(String::as_str),
        Some("AMERICAN NATIONAL BANK")
    );
}
