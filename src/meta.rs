//! Sidecar metadata parsing.
//!
//! An MDS `.meta` file is a sequence of `key = value;` statements where
//! values are Fortran-style literals: numbers, quoted strings, and
//! brace-delimited lists. The legacy tooling executed this text as
//! code; here it is parsed by a small recursive-descent grammar and
//! never evaluated.
//!
//! The schema is extracted from three required keys:
//! `nDims`, `dataprec`, and `dimList` (a flattened list of per-axis
//! `(globalSize, startIndex, endIndex)` triples in x, y, z order, so
//! entries 0, 3 and 6 are the global sizes). Other keys such as
//! `nrecords` or `timeStepNumber` are parsed but ignored.

use crate::error::{ConvertError, Result};
use crate::models::{Precision, VariableSchema};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// A parsed metadata literal.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<MetaValue>),
}

/// Parse the sidecar text for one variable into a typed schema.
pub fn parse_meta(text: &str, path: &Path) -> Result<VariableSchema> {
    let entries = parse_statements(text, path)?;
    debug!("parsed {} metadata keys from {}", entries.len(), path.display());

    let ndims = scalar_int(required(&entries, "nDims", path)?)
        .ok_or_else(|| ConvertError::meta_format(path, "nDims is not an integer"))?;
    if !(2..=3).contains(&ndims) {
        return Err(ConvertError::UnsupportedDimensionality {
            path: path.to_path_buf(),
            found: ndims,
        });
    }

    let descriptor = scalar_str(required(&entries, "dataprec", path)?)
        .ok_or_else(|| ConvertError::meta_format(path, "dataprec is not a string"))?;
    let precision = Precision::from_descriptor(&descriptor).ok_or_else(|| {
        ConvertError::meta_format(path, format!("unsupported data precision `{descriptor}`"))
    })?;

    let mut dims = Vec::new();
    flatten_ints(required(&entries, "dimList", path)?, &mut dims);
    let needed = if ndims == 3 { 7 } else { 4 };
    if dims.len() < needed {
        return Err(ConvertError::meta_format(
            path,
            format!("dimList has {} entries, expected at least {needed}", dims.len()),
        ));
    }

    let extent = |value: i64, axis: &str| -> Result<usize> {
        usize::try_from(value)
            .ok()
            .filter(|&v| v > 0)
            .ok_or_else(|| {
                ConvertError::meta_format(path, format!("non-positive {axis} extent {value}"))
            })
    };

    // The triples are always present in x, y, z order; entries 0/3/6
    // carry the global sizes.
    Ok(VariableSchema {
        dimensionality: ndims as usize,
        precision,
        x_extent: extent(dims[0], "x")?,
        y_extent: extent(dims[3], "y")?,
        z_extent: if ndims == 3 {
            Some(extent(dims[6], "z")?)
        } else {
            None
        },
    })
}

/// Split the metadata text into `key = value` statements and parse
/// each value as a literal.
fn parse_statements(text: &str, path: &Path) -> Result<HashMap<String, MetaValue>> {
    let normalized = text
        .replace(['\n', '\r'], "")
        .replace('{', "[")
        .replace('}', "]");

    let mut entries = HashMap::new();
    for fragment in normalized.split(';') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let (key, value) = fragment.split_once('=').ok_or_else(|| {
            ConvertError::meta_format(path, format!("expected `key = value`, got `{fragment}`"))
        })?;
        let key = key.trim();
        let value = parse_literal(value.trim()).map_err(|reason| {
            ConvertError::meta_format(path, format!("invalid literal for `{key}`: {reason}"))
        })?;
        entries.insert(key.to_string(), value);
    }
    Ok(entries)
}

fn required<'a>(
    entries: &'a HashMap<String, MetaValue>,
    key: &str,
    path: &Path,
) -> Result<&'a MetaValue> {
    entries
        .get(key)
        .ok_or_else(|| ConvertError::meta_format(path, format!("missing required key `{key}`")))
}

/// Unwrap a scalar integer, including the common 1-element list form
/// (`nDims = [ 3 ]`).
fn scalar_int(value: &MetaValue) -> Option<i64> {
    match value {
        MetaValue::Int(i) => Some(*i),
        MetaValue::List(items) if items.len() == 1 => scalar_int(&items[0]),
        _ => None,
    }
}

fn scalar_str(value: &MetaValue) -> Option<String> {
    match value {
        MetaValue::Str(s) => Some(s.clone()),
        MetaValue::List(items) if items.len() == 1 => scalar_str(&items[0]),
        _ => None,
    }
}

/// Collect every integer in a possibly-nested list, in order.
fn flatten_ints(value: &MetaValue, out: &mut Vec<i64>) {
    match value {
        MetaValue::Int(i) => out.push(*i),
        MetaValue::List(items) => {
            for item in items {
                flatten_ints(item, out);
            }
        }
        _ => {}
    }
}

/// Parse a single literal: a number, a quoted string, or a bracketed
/// list of literals separated by commas and/or whitespace.
pub fn parse_literal(input: &str) -> std::result::Result<MetaValue, String> {
    let mut parser = LiteralParser {
        input: input.as_bytes(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(format!("trailing characters at offset {}", parser.pos));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl LiteralParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> std::result::Result<MetaValue, String> {
        match self.peek() {
            Some(b'[') => self.list(),
            Some(b'\'') | Some(b'"') => self.string(),
            Some(_) => self.number(),
            None => Err("unexpected end of value".to_string()),
        }
    }

    fn list(&mut self) -> std::result::Result<MetaValue, String> {
        self.pos += 1; // consume '['
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(MetaValue::List(items));
                }
                Some(b',') => {
                    self.pos += 1;
                }
                Some(_) => items.push(self.value()?),
                None => return Err("unterminated list".to_string()),
            }
        }
    }

    fn string(&mut self) -> std::result::Result<MetaValue, String> {
        let quote = self.input[self.pos];
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                let text = std::str::from_utf8(&self.input[start..self.pos])
                    .map_err(|_| "string is not valid UTF-8".to_string())?;
                self.pos += 1;
                return Ok(MetaValue::Str(text.to_string()));
            }
            self.pos += 1;
        }
        Err("unterminated string".to_string())
    }

    fn number(&mut self) -> std::result::Result<MetaValue, String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b',' || b == b']' {
                break;
            }
            self.pos += 1;
        }
        let token = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| "number is not valid UTF-8".to_string())?;
        if let Ok(i) = token.parse::<i64>() {
            return Ok(MetaValue::Int(i));
        }
        if let Ok(f) = token.parse::<f64>() {
            return Ok(MetaValue::Float(f));
        }
        Err(format!("`{token}` is not a number"))
    }
}
