//! Tag record lines
//!
//! One record per line, seven tab-separated fields:
//!
//! ```text
//! <kind>\t<start-line>\t<start-col>\t<end-line>\t<end-col>\t<name-length>\t<name>\n
//! ```

use std::fmt::Write;
use taglight_core::{TagKind, TagRecord, is_safe_name};

const FIELDS: usize = 7;

/// Why a response body could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("response is not valid UTF-8")]
    NotUtf8,

    #[error("line {line}: missing trailing newline")]
    Unterminated { line: usize },

    #[error("line {line}: expected {FIELDS} fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: unknown tag kind {kind:?}")]
    UnknownKind { line: usize, kind: String },

    #[error("line {line}: {field} is not a number: {value:?}")]
    BadNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: name is {actual} bytes but the record says {declared}")]
    LengthMismatch {
        line: usize,
        declared: usize,
        actual: usize,
    },

    #[error("line {line}: empty name")]
    EmptyName { line: usize },
}

/// Append one record line to `out`
pub fn encode_record(record: &TagRecord, out: &mut String) {
    // writing to a String cannot fail
    let _ = writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        record.kind.as_char(),
        record.start_line,
        record.start_col,
        record.end_line,
        record.end_col,
        record.name_len,
        record.name
    );
}

/// Encode a response body. Records whose names would break the line
/// format are skipped.
pub fn encode_records(records: &[TagRecord]) -> Vec<u8> {
    let mut out = String::new();
    for record in records.iter().filter(|r| is_safe_name(&r.name)) {
        encode_record(record, &mut out);
    }
    out.into_bytes()
}

/// Decode a response body
pub fn decode_records(bytes: &[u8]) -> Result<Vec<TagRecord>, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
    let mut lines: Vec<&str> = text.split('\n').collect();
    // everything up to the final newline; the remainder must be empty
    let rest = lines.pop().unwrap_or_default();
    if !rest.is_empty() {
        return Err(DecodeError::Unterminated {
            line: lines.len() + 1,
        });
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| decode_line(i + 1, line))
        .collect()
}

fn decode_line(line: usize, text: &str) -> Result<TagRecord, DecodeError> {
    let fields: Vec<&str> = text.split('\t').collect();
    let [kind, start_line, start_col, end_line, end_col, name_len, name] = fields[..] else {
        return Err(DecodeError::FieldCount {
            line,
            found: fields.len(),
        });
    };

    let mut chars = kind.chars();
    let kind = match (chars.next(), chars.next()) {
        (Some(c), None) => TagKind::from_char(c),
        _ => None,
    }
    .ok_or_else(|| DecodeError::UnknownKind {
        line,
        kind: kind.to_string(),
    })?;

    let number = |field: &'static str, value: &str| {
        value.parse::<usize>().map_err(|_| DecodeError::BadNumber {
            line,
            field,
            value: value.to_string(),
        })
    };
    let record = TagRecord {
        kind,
        start_line: number("start line", start_line)?,
        start_col: number("start column", start_col)?,
        end_line: number("end line", end_line)?,
        end_col: number("end column", end_col)?,
        name_len: number("name length", name_len)?,
        name: name.to_string(),
    };

    if record.name.is_empty() {
        return Err(DecodeError::EmptyName { line });
    }
    if record.name.len() != record.name_len {
        return Err(DecodeError::LengthMismatch {
            line,
            declared: record.name_len,
            actual: record.name.len(),
        });
    }
    Ok(record)
}
