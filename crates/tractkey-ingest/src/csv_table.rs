use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// Whole delimited file held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub(crate) fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Synthetic headers for headerless files: `"0"`, `"1"`, ...
pub fn index_headers(width: usize) -> Vec<String> {
    (0..width).map(|idx| idx.to_string()).collect()
}

impl CsvTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Swaps rows and columns.
    ///
    /// The first column's values become the new headers (after the first
    /// header, which is kept); every other original column becomes a row
    /// whose first cell is its former header. Short rows read as empty.
    pub fn transpose(&self) -> CsvTable {
        let Some(first_header) = self.headers.first() else {
            return CsvTable::default();
        };
        let mut headers = vec![first_header.clone()];
        headers.extend(
            self.rows
                .iter()
                .map(|row| row.first().cloned().unwrap_or_default()),
        );
        let rows = self
            .headers
            .iter()
            .enumerate()
            .skip(1)
            .map(|(col, header)| {
                let mut out = Vec::with_capacity(self.rows.len() + 1);
                out.push(header.clone());
                out.extend(
                    self.rows
                        .iter()
                        .map(|row| row.get(col).cloned().unwrap_or_default()),
                );
                out
            })
            .collect();
        CsvTable { headers, rows }
    }
}

/// Reads a delimited file.
///
/// With `has_headers == false` the headers are the column indices as
/// strings, sized to the widest row.
pub fn read_csv_table(path: &Path, has_headers: bool) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| IngestError::csv(path, &err))?;

    let mut raw_rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| IngestError::csv(path, &err))?;
        raw_rows.push(record.iter().map(normalize_cell).collect::<Vec<_>>());
    }
    if raw_rows.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    if has_headers {
        let headers = raw_rows
            .remove(0)
            .iter()
            .map(String::as_str)
            .map(normalize_header)
            .collect();
        Ok(CsvTable {
            headers,
            rows: raw_rows,
        })
    } else {
        let width = raw_rows.iter().map(Vec::len).max().unwrap_or(0);
        Ok(CsvTable {
            headers: index_headers(width),
            rows: raw_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose() {
        let table = CsvTable {
            headers: vec!["Label".into(), "Tract A".into(), "Tract B".into()],
            rows: vec![
                vec!["Total".into(), "10".into(), "20".into()],
                vec!["Hispanic".into(), "3".into()],
            ],
        };
        let flipped = table.transpose();
        assert_eq!(flipped.headers, vec!["Label", "Total", "Hispanic"]);
        assert_eq!(flipped.rows.len(), 2);
        assert_eq!(flipped.rows[0], vec!["Tract A", "10", "3"]);
        assert_eq!(flipped.rows[1], vec!["Tract B", "20", ""]);
        assert_eq!(flipped.cell(1, "Total"), Some("20"));
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("\u{feff} Label  (Grouping) "), "Label (Grouping)");
        assert_eq!(normalize_header("\u{a0}\u{a0}Total:"), "Total:");
    }
}
