//! Conversion of reconciled records into a polars `DataFrame`.

use std::collections::HashSet;

use polars::prelude::{Column, DataFrame};

use tractkey_model::{CodeLabelCatalog, Tract};

use crate::error::Result;
use crate::record::ReconciledRecord;

/// Key columns, in order, ahead of the decoded fields.
pub const KEY_COLUMNS: [&str; 6] = ["source", "record_id", "state", "county", "tract", "county_source"];

/// Suffix of the label column added next to a labelled field.
pub const LABEL_SUFFIX: &str = "_label";

/// Field names across `records`, in first-seen order.
pub fn field_union(records: &[ReconciledRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for record in records {
        for (name, _) in &record.fields {
            if seen.insert(name.as_str()) {
                names.push(name.clone());
            }
        }
    }
    names
}

/// Builds a frame with the key columns followed by the union of fields.
///
/// Fields a record does not have are null. A field whose name collides with
/// a key column is exported with a `_field` suffix. When a catalog is given,
/// every field with at least one known code gains a `<field>_label` column.
pub fn records_to_frame(
    records: &[ReconciledRecord],
    labels: Option<&dyn CodeLabelCatalog>,
) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(KEY_COLUMNS.len());

    let source: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
    let record_id: Vec<&str> = records.iter().map(|r| r.record_id.as_str()).collect();
    let state: Vec<Option<&str>> = records
        .iter()
        .map(|r| r.geography.key.state_name.as_deref())
        .collect();
    let county: Vec<String> = records
        .iter()
        .map(|r| r.geography.key.county.to_string())
        .collect();
    let tract: Vec<Option<&str>> = records
        .iter()
        .map(|r| r.geography.key.tract.as_ref().map(Tract::as_str))
        .collect();
    let county_source: Vec<&str> = records
        .iter()
        .map(|r| r.geography.county_source.as_str())
        .collect();

    columns.push(Column::new("source".into(), source));
    columns.push(Column::new("record_id".into(), record_id));
    columns.push(Column::new("state".into(), state));
    columns.push(Column::new("county".into(), county));
    columns.push(Column::new("tract".into(), tract));
    columns.push(Column::new("county_source".into(), county_source));

    for name in field_union(records) {
        let values: Vec<Option<&str>> = records.iter().map(|r| r.field(&name)).collect();
        let column_name = if KEY_COLUMNS.contains(&name.as_str()) {
            format!("{name}_field")
        } else {
            name.clone()
        };

        let label_values: Option<Vec<Option<&str>>> = labels.and_then(|catalog| {
            let mapped: Vec<Option<&str>> = values
                .iter()
                .map(|value| value.and_then(|code| catalog.label(&name, code)))
                .collect();
            mapped.iter().any(Option::is_some).then_some(mapped)
        });

        columns.push(Column::new(column_name.as_str().into(), values));
        if let Some(label_values) = label_values {
            let label_name = format!("{column_name}{LABEL_SUFFIX}");
            columns.push(Column::new(label_name.as_str().into(), label_values));
        }
    }

    Ok(DataFrame::new(columns)?)
}
