//! Byte offset ↔ line/column mapping
//!
//! Positions follow the Go position table: lines and columns are 1-indexed,
//! and columns count bytes, not characters.

/// A 1-indexed line/column pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Byte column (1-indexed)
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Start and end position of an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRange {
    pub start: Position,
    pub end: Position,
}

/// Line start table for one source file
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    /// Byte offset at which each line starts; always begins with 0
    line_starts: Vec<usize>,
    /// Total source length in bytes
    len: usize,
}

impl LineIndex {
    /// Build the line table for `source`
    pub fn new(source: &[u8]) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Map a byte offset to its position.
    ///
    /// The end-of-file offset is valid; anything past it is not.
    pub fn position(&self, offset: usize) -> Option<Position> {
        if offset > self.len {
            return None;
        }
        // partition_point gives the number of line starts <= offset
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        Some(Position::new(line, offset - line_start + 1))
    }

    /// Map a position back to its byte offset.
    ///
    /// Columns may point one past the last byte of a line (the newline
    /// itself), but not into the next line.
    pub fn offset(&self, position: Position) -> Option<usize> {
        if position.line == 0 || position.column == 0 {
            return None;
        }
        let line_start = *self.line_starts.get(position.line - 1)?;
        let line_end = self
            .line_starts
            .get(position.line)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        let offset = line_start + position.column - 1;
        (offset <= line_end).then_some(offset)
    }

    /// Range covered by a name of `name_len` bytes starting at `start`.
    ///
    /// The end is `start + name_len`, which is a byte count rather than a
    /// lexical token boundary.
    pub fn range(&self, start: usize, name_len: usize) -> Option<PositionRange> {
        let start_pos = self.position(start)?;
        let end_pos = self.position(start.checked_add(name_len)?)?;
        Some(PositionRange {
            start: start_pos,
            end: end_pos,
        })
    }
}
