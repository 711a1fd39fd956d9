//! Shared CSV utilities for loading lookup files.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{CodeTableError, Result};

/// Read a CSV file into a vector of row maps.
///
/// Each row is represented as a BTreeMap with lower-cased column headers as
/// keys. Handles BOM characters and trims whitespace from values.
pub fn read_csv_rows(path: &Path) -> Result<Vec<BTreeMap<String, String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|err| CodeTableError::csv(path, &err))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| CodeTableError::csv(path, &err))?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_ascii_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| CodeTableError::csv(path, &err))?;
        let mut row = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            let key = headers.get(idx).cloned().unwrap_or_default();
            row.insert(key, value.trim().to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Fails with `MissingColumn` unless every name is a header of `rows`.
pub fn require_columns(
    path: &Path,
    rows: &[BTreeMap<String, String>],
    columns: &[&str],
) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    for column in columns {
        if !first.contains_key(*column) {
            return Err(CodeTableError::MissingColumn {
                path: path.to_path_buf(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Get a field value from a row, returning empty string if not present.
pub fn get_field<'a>(row: &'a BTreeMap<String, String>, key: &str) -> &'a str {
    row.get(key).map_or("", String::as_str)
}
