//! Line reader for fixed-width files.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// One physical line and its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedLine {
    pub line: usize,
    pub text: String,
}

/// Streams the non-blank lines of a fixed-width file.
///
/// A line that is not valid UTF-8 (Latin-1 names in older files) is decoded
/// as Latin-1, one character per byte, so character positions match the
/// byte layout. Blank lines are skipped and counted.
pub struct FixedWidthLines {
    path: PathBuf,
    reader: BufReader<File>,
    line: usize,
    blank_lines: usize,
    buf: Vec<u8>,
}

/// UTF-8 when valid, otherwise Latin-1.
fn decode_line_bytes(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

impl FixedWidthLines {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| IngestError::file_read(path, err))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            line: 0,
            blank_lines: 0,
            buf: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blank lines skipped so far.
    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }
}

impl Iterator for FixedWidthLines {
    type Item = Result<NumberedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let decoded = decode_line_bytes(&self.buf);
                    let text = decoded.trim_end_matches(['\n', '\r']);
                    if text.is_empty() {
                        self.blank_lines += 1;
                        continue;
                    }
                    return Some(Ok(NumberedLine {
                        line: self.line,
                        text: text.to_string(),
                    }));
                }
                Err(err) => return Some(Err(IngestError::file_read(&self.path, err))),
            }
        }
    }
}
