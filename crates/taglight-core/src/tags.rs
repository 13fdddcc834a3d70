//! Tag records: classified occurrences with their wire positions

use crate::classify::{TagKind, classify};
use crate::position::LineIndex;
use crate::symbol::{Occurrence, Symbol, SymbolIndex};

/// One highlight instruction for the host.
///
/// Lines are zero-based, columns are 1-based byte columns, as they appear
/// on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagRecord {
    pub kind: TagKind,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    /// Byte length of `name`
    pub name_len: usize,
    pub name: String,
}

impl TagRecord {
    fn sort_key(&self) -> (usize, usize, char, usize, usize, &str) {
        (
            self.start_line,
            self.start_col,
            self.kind.as_char(),
            self.end_line,
            self.end_col,
            &self.name,
        )
    }
}

/// Whether a name can go on the wire unescaped
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['\t', '\n', '\r'])
}

/// Turn one occurrence into a record, if its symbol classifies and its
/// position maps into the file.
pub fn tag_occurrence(
    occurrence: &Occurrence,
    symbol: &Symbol,
    lines: &LineIndex,
) -> Option<TagRecord> {
    let kind = classify(symbol)?;
    if !is_safe_name(&occurrence.name) {
        return None;
    }
    let range = lines.range(occurrence.start, occurrence.len)?;
    if range.start.line == 0 || range.end.line == 0 {
        return None;
    }
    Some(TagRecord {
        kind,
        start_line: range.start.line - 1,
        start_col: range.start.column,
        end_line: range.end.line - 1,
        end_col: range.end.column,
        name_len: occurrence.len,
        name: occurrence.name.clone(),
    })
}

/// All records of file `file`, ordered by position then kind, without
/// duplicates.
pub fn tag_file(index: &SymbolIndex, file: usize, lines: &LineIndex) -> Vec<TagRecord> {
    let mut records: Vec<TagRecord> = index
        .in_file(file)
        .filter_map(|(occurrence, symbol)| tag_occurrence(occurrence, symbol, lines))
        .collect();
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    records.dedup();
    records
}
