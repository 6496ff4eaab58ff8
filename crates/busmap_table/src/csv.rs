//! Reader for two-column `Property,Value` tables.
//!
//! The reader keeps byte spans for every name, value and token so later
//! diagnostics can underline the exact offending cell.

use crate::error::TableError;
use busmap_source::{FileId, Span};

/// A whitespace-separated token of a value cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The token text.
    pub text: String,
    /// Where the token sits in the table.
    pub span: Span,
}

/// One `NAME,VALUE` row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRow {
    /// The property name, trimmed.
    pub name: String,
    /// The value cell, trimmed and unquoted.
    pub value: String,
    /// 1-indexed line number.
    pub line: u32,
    /// The whole row.
    pub row_span: Span,
    /// The property name.
    pub name_span: Span,
    /// The value cell (inside the quotes, when quoted).
    pub value_span: Span,
    /// The value cell split on whitespace.
    pub tokens: Vec<Token>,
}

impl PropertyRow {
    /// Returns the token texts.
    pub fn token_texts(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.text.as_str())
    }

    /// Returns the token spans.
    pub fn token_spans(&self) -> Vec<Span> {
        self.tokens.iter().map(|t| t.span).collect()
    }
}

/// Reads every property row of `content`.
///
/// Blank lines and lines starting with `#` are skipped. The first remaining
/// line must be the `Property,Value` header. Returns the header span and
/// the rows in file order.
pub fn read_rows(file: FileId, content: &str) -> Result<(Span, Vec<PropertyRow>), TableError> {
    let mut header = None;
    let mut rows = Vec::new();
    let mut offset = 0usize;

    for (idx, raw) in content.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row_span = span(file, line_start, line_start + line.len());

        if header.is_none() {
            if !is_header(line) {
                return Err(TableError::MissingHeader {
                    found: trimmed.to_string(),
                    span: row_span,
                });
            }
            header = Some(row_span);
            continue;
        }

        rows.push(read_row(file, line, line_start, idx as u32 + 1, row_span)?);
    }

    match header {
        Some(header) => Ok((header, rows)),
        None => Err(TableError::MissingHeader {
            found: String::new(),
            span: span(file, 0, 0),
        }),
    }
}

fn is_header(line: &str) -> bool {
    let mut cells = line.split(',').map(str::trim);
    cells.next() == Some("Property")
        && cells.next() == Some("Value")
        && cells.all(str::is_empty)
}

fn read_row(
    file: FileId,
    line: &str,
    line_start: usize,
    line_no: u32,
    row_span: Span,
) -> Result<PropertyRow, TableError> {
    let malformed = |reason: &str| TableError::MalformedRow {
        reason: reason.to_string(),
        span: row_span,
    };

    let comma = line
        .find(',')
        .ok_or_else(|| malformed("expected NAME,VALUE"))?;
    let (name, name_start) = trim_with_offset(&line[..comma], 0);
    if name.is_empty() {
        return Err(malformed("empty property name"));
    }

    let rest = &line[comma + 1..];
    let rest_start = comma + 1;
    let lead = rest.len() - rest.trim_start().len();

    let (value, value_start, tail) = if rest[lead..].starts_with('"') {
        let open = rest_start + lead + 1;
        let close = line[open..]
            .find('"')
            .map(|i| open + i)
            .ok_or_else(|| malformed("unterminated quote"))?;
        let (value, start) = trim_with_offset(&line[open..close], open);
        (value, start, &line[close + 1..])
    } else {
        let end = rest.find(',').map_or(line.len(), |i| rest_start + i);
        let (value, start) = trim_with_offset(&line[rest_start..end], rest_start);
        (value, start, &line[end..])
    };

    if !tail.split(',').all(|cell| cell.trim().is_empty()) {
        return Err(malformed("unexpected extra cell"));
    }

    let mut tokens = Vec::new();
    let mut cursor = 0;
    for text in value.split_whitespace() {
        let pos = value[cursor..].find(text).map_or(cursor, |i| cursor + i);
        let start = line_start + value_start + pos;
        tokens.push(Token {
            text: text.to_string(),
            span: span(file, start, start + text.len()),
        });
        cursor = pos + text.len();
    }

    let name_abs = line_start + name_start;
    let value_abs = line_start + value_start;
    Ok(PropertyRow {
        name: name.to_string(),
        value: value.to_string(),
        line: line_no,
        row_span,
        name_span: span(file, name_abs, name_abs + name.len()),
        value_span: span(file, value_abs, value_abs + value.len()),
        tokens,
    })
}

/// Trims `s` and returns it with the offset of its first byte relative to the line.
fn trim_with_offset(s: &str, base: usize) -> (&str, usize) {
    let lead = s.len() - s.trim_start().len();
    (s.trim(), base + lead)
}

fn span(file: FileId, start: usize, end: usize) -> Span {
    Span::new(file, start as u32, end as u32)
}
