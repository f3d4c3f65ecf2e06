//! Source location reporting for translation errors.
//!
//! The translator reports failures by byte offset only; turning an offset
//! into something a human can act on (line, column, a peek at the offending
//! text) is the caller's job, and lives here.

use std::fmt;

/// A location in source text (byte offset, line, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Byte offset from start of the source
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed, in characters not bytes)
    pub column: u32,
}

impl Location {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self { offset, line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Convert a byte offset to a Location (line/column).
pub fn offset_to_location(source: &str, offset: usize) -> Location {
    let offset = offset.min(source.len());
    let before = &source[..offset];

    let line = before.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
    let last_newline = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[last_newline..].chars().count() as u32 + 1;

    Location { offset, line, column }
}

/// A short excerpt of the source following `offset`, single-line, for
/// embedding in error reports.
pub fn excerpt(source: &str, offset: usize, max_chars: usize) -> String {
    let offset = source
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(source.len()))
        .find(|&i| i >= offset)
        .unwrap_or(source.len());

    let tail = &source[offset..];
    let mut out = String::new();
    for c in tail.chars().take(max_chars) {
        if c == '\n' {
            break;
        }
        out.push(c);
    }
    if out.len() < tail.trim_end_matches('\n').len() {
        out.push('…');
    }
    out
}
