//! Positional line decoding.

use crate::error::{DecodeError, Result};
use crate::schema::FixedWidthSchema;

/// Ordered `(field name, raw slice)` pairs for one decoded line.
///
/// Borrows the field names from the schema and the values from the line;
/// values are untrimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord<'a> {
    fields: Vec<(&'a str, &'a str)>,
}

impl<'a> DecodedRecord<'a> {
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|&(_, value)| value)
    }

    /// Value with surrounding whitespace removed.
    pub fn trimmed(&self, name: &str) -> Option<&'a str> {
        self.get(name).map(str::trim)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.fields.iter().copied()
    }

    /// Owned, trimmed copy of every field.
    pub fn to_owned_fields(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.trim().to_string()))
            .collect()
    }
}

/// Strips the line terminator (`\n`, `\r\n`) that line readers may leave.
fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Decodes one line against `schema`.
///
/// Widths are counted in characters. A line whose length differs from
/// `schema.record_len()` fails with [`DecodeError::MalformedRecord`] and
/// yields no fields.
pub fn decode_line<'a>(schema: &'a FixedWidthSchema, line: &'a str) -> Result<DecodedRecord<'a>> {
    let line = strip_terminator(line);
    let expected = schema.record_len();
    let actual = if line.is_ascii() {
        line.len()
    } else {
        line.chars().count()
    };
    if actual != expected {
        return Err(DecodeError::MalformedRecord { expected, actual });
    }

    let mut fields = Vec::with_capacity(schema.field_count());
    let mut rest = line;
    for spec in schema.fields() {
        let split = rest
            .char_indices()
            .nth(spec.width)
            .map_or(rest.len(), |(idx, _)| idx);
        let (value, tail) = rest.split_at(split);
        fields.push((spec.name.as_str(), value));
        rest = tail;
    }
    Ok(DecodedRecord { fields })
}

/// Decoder bound to one schema, tracking 1-based line numbers.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthDecoder<'s> {
    schema: &'s FixedWidthSchema,
}

impl<'s> FixedWidthDecoder<'s> {
    pub fn new(schema: &'s FixedWidthSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s FixedWidthSchema {
        self.schema
    }

    pub fn decode<'a>(&self, line: &'a str) -> Result<DecodedRecord<'a>>
    where
        's: 'a,
    {
        decode_line(self.schema, line)
    }

    /// Decodes every line, pairing each result with its 1-based line number.
    /// Blank lines are skipped; malformed lines are yielded as errors.
    pub fn decode_all<'a, I>(
        &self,
        lines: I,
    ) -> impl Iterator<Item = (usize, Result<DecodedRecord<'a>>)> + use<'a, 's, I>
    where
        's: 'a,
        I: IntoIterator<Item = &'a str>,
    {
        let schema: &'a FixedWidthSchema = self.schema;
        lines
            .into_iter()
            .enumerate()
            .filter(|(_, line)| !strip_terminator(line).is_empty())
            .map(move |(index, line)| (index + 1, decode_line(schema, line)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FixedWidthSchema {
        FixedWidthSchema::from_layout("t", &[("State", 2), ("County", 3), ("Tract", 7)]).unwrap()
    }

    #[test]
    fn test_decode_exact_slices() {
        let schema = schema();
        let record = decode_line(&schema, "481130101.02").unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("State"), Some("48"));
        assert_eq!(record.get("County"), Some("113"));
        assert_eq!(record.get("Tract"), Some("0101.02"));
    }

    #[test]
    fn test_decode_keeps_padding() {
        let schema = schema();
        let record = decode_line(&schema, "48 13  101.0").unwrap();
        assert_eq!(record.get("County"), Some(" 13"));
        assert_eq!(record.trimmed("County"), Some("13"));
    }

    #[test]
    fn test_crlf_terminator_ignored() {
        let schema = schema();
        assert!(decode_line(&schema, "481130101.02\r\n").is_ok());
        assert!(decode_line(&schema, "481130101.02\r").is_ok());
    }

    #[test]
    fn test_wrong_length() {
        let schema = schema();
        assert_eq!(
            decode_line(&schema, "481130101.0"),
            Err(DecodeError::MalformedRecord {
                expected: 12,
                actual: 11
            })
        );
        assert_eq!(
            decode_line(&schema, "481130101.022"),
            Err(DecodeError::MalformedRecord {
                expected: 12,
                actual: 13
            })
        );
    }

    #[test]
    fn test_multibyte_counts_characters() {
        let schema = FixedWidthSchema::from_layout("t", &[("Name", 4), ("Code", 2)]).unwrap();
        let record = decode_line(&schema, "Peña01").unwrap();
        assert_eq!(record.get("Name"), Some("Peña"));
        assert_eq!(record.get("Code"), Some("01"));
    }

    #[test]
    fn test_decode_all_numbers_lines() {
        let schema = schema();
        let decoder = FixedWidthDecoder::new(&schema);
        let text = "481130101.02\n\n48113short\n480850305.12\n";
        let results: Vec<_> = decoder.decode_all(text.lines()).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, 1);
        assert!(results[1].1.is_err());
        assert_eq!(results[1].0, 3);
        assert_eq!(results[2].0, 4);
    }
}
