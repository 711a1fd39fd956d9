//! Bounded-chunk reading of large delimited files.
//!
//! HMDA loan/application registers run to millions of rows. The reader hands
//! them out in chunks of at most `chunk_rows` rows so each chunk can be
//! normalized and dropped before the next is read.
//!
//! ```ignore
//! let options = ChunkOptions::default().with_chunk_rows(10_000);
//! let mut reader = DelimitedChunkReader::open(&path, options)?;
//! while let Some(chunk) = reader.next_chunk()? {
//!     for row in &chunk.rows { /* ... */ }
//! }
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::csv_table::{index_headers, normalize_cell, normalize_header};
use crate::error::{IngestError, Result};

/// Default number of rows per chunk.
pub const DEFAULT_CHUNK_ROWS: usize = 50_000;

/// Options for chunked reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOptions {
    /// Rows per chunk.
    /// Defaults to 50000.
    pub chunk_rows: usize,

    /// Whether the first row holds column names.
    /// Defaults to true.
    pub has_headers: bool,

    /// Field delimiter.
    /// Defaults to `,`.
    pub delimiter: u8,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_rows: DEFAULT_CHUNK_ROWS,
            has_headers: true,
            delimiter: b',',
        }
    }
}

impl ChunkOptions {
    /// Set the chunk size.
    pub fn with_chunk_rows(mut self, rows: usize) -> Self {
        self.chunk_rows = rows;
        self
    }

    /// Set whether the file has a header row.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// One data row and its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub line: usize,
    pub values: Vec<String>,
}

impl CsvRow {
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }
}

/// Up to `chunk_rows` consecutive rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvChunk {
    /// 0-based chunk index.
    pub index: usize,
    pub rows: Vec<CsvRow>,
}

/// Reads a delimited file chunk by chunk.
pub struct DelimitedChunkReader {
    path: PathBuf,
    reader: csv::Reader<File>,
    headers: Vec<String>,
    /// First data record of a headerless file, read early to size the headers.
    pending: Option<CsvRow>,
    chunk_rows: usize,
    chunks_read: usize,
    record: StringRecord,
}

fn row_from_record(record: &StringRecord) -> CsvRow {
    CsvRow {
        line: record.position().map_or(0, |pos| pos.line() as usize),
        values: record.iter().map(normalize_cell).collect(),
    }
}

impl DelimitedChunkReader {
    pub fn open(path: &Path, options: ChunkOptions) -> Result<Self> {
        if options.chunk_rows == 0 {
            return Err(IngestError::InvalidChunkSize);
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_path(path)
            .map_err(|err| IngestError::csv(path, &err))?;

        let mut record = StringRecord::new();
        let has_first = reader
            .read_record(&mut record)
            .map_err(|err| IngestError::csv(path, &err))?;
        if !has_first {
            return Err(IngestError::EmptyCsv {
                path: path.to_path_buf(),
            });
        }

        let (headers, pending) = if options.has_headers {
            let headers = record.iter().map(normalize_header).collect();
            (headers, None)
        } else {
            (index_headers(record.len()), Some(row_from_record(&record)))
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
            pending,
            chunk_rows: options.chunk_rows,
            chunks_read: 0,
            record,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next chunk, or `None` once the file is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<CsvChunk>> {
        let mut rows = Vec::with_capacity(self.chunk_rows.min(DEFAULT_CHUNK_ROWS));
        if let Some(row) = self.pending.take() {
            rows.push(row);
        }
        while rows.len() < self.chunk_rows {
            let more = self
                .reader
                .read_record(&mut self.record)
                .map_err(|err| IngestError::csv(&self.path, &err))?;
            if !more {
                break;
            }
            rows.push(row_from_record(&self.record));
        }
        if rows.is_empty() {
            return Ok(None);
        }
        let index = self.chunks_read;
        self.chunks_read += 1;
        debug!(path = %self.path.display(), chunk = index, rows = rows.len(), "read chunk");
        Ok(Some(CsvChunk { index, rows }))
    }
}

impl Iterator for DelimitedChunkReader {
    type Item = Result<CsvChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
