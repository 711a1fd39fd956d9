//! Census table exports with geographies as columns.

use std::path::Path;

use crate::csv_table::{CsvTable, read_csv_table};
use crate::error::Result;

/// Keeps only digits and `.` (`"1,234"` -> `"1234"`, `"(X)"` -> `""`).
pub fn clean_measure_value(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// Drops `:` and surrounding whitespace from a measure label.
pub fn clean_measure_label(raw: &str) -> String {
    raw.replace(':', "").trim().to_string()
}

/// Turns a wide census export into one row per geography.
///
/// The first column of the result holds the geography label; the remaining
/// columns are the measures with cleaned names and values.
pub fn reshape_census_table(table: &CsvTable) -> CsvTable {
    let mut reshaped = table.transpose();
    for header in reshaped.headers.iter_mut().skip(1) {
        *header = clean_measure_label(header);
    }
    for row in &mut reshaped.rows {
        for value in row.iter_mut().skip(1) {
            *value = clean_measure_value(value);
        }
    }
    reshaped
}

/// Reads and reshapes a census export.
pub fn read_census_table(path: &Path) -> Result<CsvTable> {
    let table = read_csv_table(path, true)?;
    Ok(reshape_census_table(&table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_measure_value() {
        assert_eq!(clean_measure_value("1,234"), "1234");
        assert_eq!(clean_measure_value(" 12.5 "), "12.5");
        assert_eq!(clean_measure_value("(X)"), "");
    }

    #[test]
    fn test_reshape() {
        let table = CsvTable {
            headers: vec![
                "Label (Grouping)".into(),
                "Census Tract 101.02; Dallas County; Texas".into(),
            ],
            rows: vec![
                vec!["Total:".into(), "4,102".into()],
                vec!["Hispanic or Latino".into(), "1,530".into()],
            ],
        };
        let reshaped = reshape_census_table(&table);
        assert_eq!(reshaped.headers, vec!["Label (Grouping)", "Total", "Hispanic or Latino"]);
        assert_eq!(
            reshaped.rows[0],
            vec!["Census Tract 101.02; Dallas County; Texas", "4102", "1530"]
        );
    }
}
