//! Tests for CRA file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tractkey_fwf::CraVariant;
use tractkey_ingest::{IngestError, discover_cra_files, list_dat_files};
use tractkey_model::DiagnosticKind;

fn temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("tractkey_ingest_{stamp}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "\n").expect("write file");
    path
}

#[test]
fn matches_cra_tables_and_reports_the_rest() {
    let dir = temp_dir();
    touch(&dir, "cra2021_Aggr_A11.dat");
    touch(&dir, "cra2021_Aggr_A11a.DAT");
    touch(&dir, "cra2021_Discl_D6.dat");
    touch(&dir, "cra2021_Discl_D1.dat");
    touch(&dir, "copy_of_D6.dat");
    touch(&dir, "notes.txt");
    fs::create_dir_all(dir.join("nested.dat")).expect("create dir");

    let files = list_dat_files(&dir).expect("list dat");
    assert_eq!(files.len(), 5);

    let expected = [CraVariant::A11, CraVariant::A11a, CraVariant::D6, CraVariant::D3];
    let discovery = discover_cra_files(&files, &expected);

    assert_eq!(discovery.files.len(), 3);
    assert!(discovery.files.contains_key(&CraVariant::A11));
    assert!(discovery.files.contains_key(&CraVariant::A11a));

    let unmapped: Vec<_> = discovery
        .diagnostics
        .iter()
        .filter(|diag| diag.kind == DiagnosticKind::UnmappedFile)
        .map(|diag| diag.source.as_str())
        .collect();
    assert_eq!(unmapped.len(), 2);
    assert!(unmapped.contains(&"cra2021_Discl_D1.dat"));

    let missing: Vec<_> = discovery
        .diagnostics
        .iter()
        .filter(|diag| diag.kind == DiagnosticKind::MissingVariant)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].source, "D3");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = temp_dir().join("absent");
    let err = list_dat_files(&dir).unwrap_err();
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}
