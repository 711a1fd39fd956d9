//! CSV loaders for code labels and institution aliases.

use std::collections::BTreeMap;
use std::path::Path;

use tractkey_model::MapCatalog;

use crate::csv_utils::{get_field, read_csv_rows, require_columns};
use crate::error::Result;

/// Loads a `field,code,label` CSV into a catalog.
pub fn load_label_catalog(path: &Path) -> Result<MapCatalog> {
    let rows = read_csv_rows(path)?;
    require_columns(path, &rows, &["field", "code", "label"])?;
    let mut catalog = MapCatalog::new();
    for row in &rows {
        let field = get_field(row, "field");
        let code = get_field(row, "code");
        if field.is_empty() || code.is_empty() {
            continue;
        }
        catalog.insert(field, code, get_field(row, "label"));
    }
    Ok(catalog)
}

/// Loads an `alias,canonical` CSV of institution names. Keys are
/// upper-cased so lookups match cleaned names.
pub fn load_alias_map(path: &Path) -> Result<BTreeMap<String, String>> {
    let rows = read_csv_rows(path)?;
    require_columns(path, &rows, &["alias", "canonical"])?;
    Ok(rows
        .iter()
        .filter(|row| !get_field(row, "alias").is_empty())
        .map(|row| {
            (
                get_field(row, "alias").to_uppercase(),
                get_field(row, "canonical").to_string(),
            )
        })
        .collect())
}
