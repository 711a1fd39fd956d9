//! Field and schema definitions.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::decoder::{DecodedRecord, decode_line};
use crate::error::{DecodeError, Result};

/// One positional field: a name and its width in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub width: usize,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }
}

/// Granularity of the geographic fields a schema carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeographyLevel {
    Tract,
    County,
    None,
}

impl GeographyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            GeographyLevel::Tract => "tract",
            GeographyLevel::County => "county",
            GeographyLevel::None => "none",
        }
    }
}

/// Ordered, validated list of fields.
///
/// Order is positionally significant and the record length is always the
/// sum of the field widths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedWidthSchema {
    name: String,
    fields: Vec<FieldSpec>,
    record_len: usize,
}

impl FixedWidthSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self> {
        let name = name.into();
        if fields.is_empty() {
            return Err(DecodeError::EmptySchema { schema: name });
        }
        let mut seen = BTreeSet::new();
        for (index, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(DecodeError::EmptyFieldName {
                    schema: name,
                    index,
                });
            }
            if field.width == 0 {
                return Err(DecodeError::ZeroWidth {
                    schema: name,
                    field: field.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DecodeError::DuplicateField {
                    schema: name,
                    field: field.name.clone(),
                });
            }
        }
        let record_len = fields.iter().map(|field| field.width).sum();
        Ok(Self {
            name,
            fields,
            record_len,
        })
    }

    /// Builds a schema from `(name, width)` pairs.
    pub fn from_layout(name: impl Into<String>, layout: &[(&str, usize)]) -> Result<Self> {
        let fields = layout
            .iter()
            .map(|&(field, width)| FieldSpec::new(field, width))
            .collect();
        Self::new(name, fields)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn record_len(&self) -> usize {
        self.record_len
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|spec| spec.name == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Character offset of each field, in schema order.
    pub fn offsets(&self) -> Vec<usize> {
        self.fields
            .iter()
            .scan(0, |offset, field| {
                let start = *offset;
                *offset += field.width;
                Some(start)
            })
            .collect()
    }

    pub fn decode<'a>(&'a self, line: &'a str) -> Result<DecodedRecord<'a>> {
        decode_line(self, line)
    }
}
