//! Full runs over a small on-disk workspace.

use std::fs;
use std::path::Path;

use insta::assert_json_snapshot;
use tempfile::TempDir;

use tractkey_cli::config::RunConfig;
use tractkey_cli::pipeline::{build_code_tables, join_sources, run_sources, summarize};
use tractkey_cli::summary::render_summary;
use tractkey_model::{DiagnosticKind, MapCatalog};
use tractkey_reconcile::JoinGranularity;

const FIPS_LISTING: &str = "FIPS codes for states and counties\n\
\n\
        48        TEXAS\n\
        40        OKLAHOMA\n\
\n\
county-level      place\n\
        48085     Collin County\n\
        48113     Dallas County\n\
        48201     Harris County\n\
        40143     Tulsa County\n";

const CONFIG: &str = r#"
[region]
state = "TX"
counties = ["Dallas", "Collin County"]

[fips]
path = "fips.txt"
state_lines = [2, 4]
county_lines = [6, 10]

[zip]
path = "zip_county.csv"

[labels]
path = "labels.csv"

[[source]]
name = "hmda"
path = "hmda.csv"
format = "hmda"

[[source]]
name = "cra"
path = "cra"
format = "cra"
expected = ["A11"]
"#;

/// A1-1 line for Dallas County tract 0101.02.
fn a11_line() -> String {
    let mut line = String::from("A1-1 2021414811319124");
    line.push_str("0101.02");
    line.push_str("NU002040");
    for value in [12, 340, 3, 600, 1, 900, 14, 1200] {
        line.push_str(&format!("{value:>10}"));
    }
    line.push_str(&" ".repeat(29));
    line
}

fn workspace(config: &str) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();
    fs::write(root.join("fips.txt"), FIPS_LISTING).expect("write fips");
    fs::write(
        root.join("zip_county.csv"),
        "zip,county,state\n75201,Dallas County,TX\n75002,Collin County,TX\n",
    )
    .expect("write zips");
    fs::write(
        root.join("labels.csv"),
        "field,code,label\naction_taken,1,Loan originated\n",
    )
    .expect("write labels");
    fs::write(
        root.join("hmda.csv"),
        "state_code,county_code,census_tract,action_taken\n\
         TX,48113,48113010102,1\n\
         TX,48201,48201000100,1\n\
         TX,48999,48999000100,3\n",
    )
    .expect("write hmda");
    fs::create_dir(root.join("cra")).expect("cra dir");
    fs::write(
        root.join("cra").join("cra2021_Aggr_A11.dat"),
        format!("{}\nA1-1 truncated\n", a11_line()),
    )
    .expect("write cra");
    fs::write(root.join("run.toml"), config).expect("write config");
    dir
}

fn load(dir: &Path) -> RunConfig {
    RunConfig::load(&dir.join("run.toml")).expect("config")
}

#[test]
fn run_summarizes_every_source() {
    let dir = workspace(CONFIG);
    let config = load(dir.path());
    let tables = build_code_tables(&config).expect("code tables");
    assert_eq!(tables.region.county_names(), vec!["Dallas County", "Collin County"]);
    assert_eq!(tables.labels.as_ref().map(MapCatalog::len), Some(1));

    let output = run_sources(&config, &tables).expect("run");
    let summary = summarize(&output, &tables.region, &tables.filter());

    assert_eq!(summary.state, "TEXAS");
    assert!(summary.errors.is_empty());
    assert!(summary.has_errors);
    assert_json_snapshot!(summary.sources, @r#"
    [
      {
        "name": "hmda",
        "convention": "hmda",
        "rows": 3,
        "records": 3,
        "malformed": 0,
        "blank_lines": 0,
        "unresolved": 1,
        "zip_fallback": 0,
        "missing_tract": 0,
        "chunks": 1,
        "in_region": 1
      },
      {
        "name": "cra/cra2021_Aggr_A11.dat",
        "convention": "cra:A1-1",
        "rows": 2,
        "records": 1,
        "malformed": 1,
        "blank_lines": 0,
        "unresolved": 0,
        "zip_fallback": 0,
        "missing_tract": 0,
        "chunks": 0,
        "in_region": 1
      }
    ]
    "#);

    let kinds: Vec<_> = summary.diagnostics.iter().map(|diag| diag.kind).collect();
    assert!(kinds.contains(&DiagnosticKind::MalformedRecord));
    assert!(kinds.contains(&DiagnosticKind::UnresolvedGeography));

    let rendered = render_summary(&summary, false).to_string();
    assert!(rendered.contains("cra/cra2021_Aggr_A11.dat"));
    assert!(rendered.contains("TOTAL"));
}

#[test]
fn unreadable_source_does_not_stop_the_run() {
    let config = format!(
        "{CONFIG}\n[[source]]\nname = \"ffiec\"\npath = \"missing.csv\"\nformat = \"ffiec\"\n"
    );
    let dir = workspace(&config);
    let config = load(dir.path());
    let tables = build_code_tables(&config).expect("code tables");
    let output = run_sources(&config, &tables).expect("run");
    let summary = summarize(&output, &tables.region, &tables.filter());

    assert_eq!(summary.sources.len(), 2);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("ffiec: "));
    assert!(summary.has_errors);
}

#[test]
fn county_without_zip_codes_fails_before_reconciling() {
    let dir = workspace(CONFIG);
    let mut config = load(dir.path());
    config.override_region(None, &["Harris".to_string()]);
    let err = build_code_tables(&config).unwrap_err();
    assert!(format!("{err:#}").contains("build ZIP county index"));
}

#[test]
fn hmda_and_cra_join_on_tract() {
    let dir = workspace(CONFIG);
    let config = load(dir.path());
    let tables = build_code_tables(&config).expect("code tables");

    let report =
        join_sources(&config, &tables, "hmda", "cra", JoinGranularity::Tract).expect("join");
    assert_eq!(report.left_records, 1);
    assert_eq!(report.right_records, 1);
    assert_eq!(report.pairs, 1);
    assert_eq!(report.matched_left, 1);
    assert_eq!(report.skipped_left, 0);

    let err = join_sources(&config, &tables, "hmda", "fdic", JoinGranularity::County).unwrap_err();
    assert!(format!("{err:#}").contains("no source named 'fdic'"));
}
