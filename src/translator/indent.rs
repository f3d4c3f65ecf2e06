//! Indentation tracking.
//!
//! The first indented line in a document fixes the indentation unit for the
//! whole translation; every later line must be a whole number of those units
//! in the same character. Levels count units; the pseudo level `-1` sits one
//! step below the document root so that root content reads as the body of an
//! implicit outermost block.

use super::cursor::Cursor;
use crate::error::{PretexError, Result};

/// Level of a line whose indentation cannot be expressed in known units
/// (only possible in raw mode, before any unit exists). Deeper than
/// everything, so it never ends a block.
const UNMEASURED: i32 = i32::MAX;

#[derive(Debug)]
pub(crate) struct IndentTracker {
    /// The inferred base indentation string. Fixed forever once set.
    pub(crate) unit: Option<String>,
    /// Level of the block currently being parsed; `-1` below the root.
    pub(crate) level: i32,
}

impl IndentTracker {
    pub(crate) fn new() -> Self {
        Self {
            unit: None,
            level: -1,
        }
    }

    pub(crate) fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Check that an indentation string is all spaces or all tabs, matching
    /// the established unit's character if there is one.
    pub(crate) fn validate(&self, indent: &str, offset: usize) -> Result<()> {
        let homogeneous =
            indent.chars().all(|c| c == ' ') || indent.chars().all(|c| c == '\t');
        if !homogeneous {
            return Err(indent_error(
                "Invalid indentation; must be all spaces or all tabs",
                offset,
            ));
        }
        if let (Some(unit), Some(first)) = (&self.unit, indent.chars().next()) {
            if unit.chars().next() != Some(first) {
                return Err(indent_error(
                    "Invalid indentation; mixes tabs and spaces with the established unit",
                    offset,
                ));
            }
        }
        Ok(())
    }

    /// Number of whole units in an indentation string.
    pub(crate) fn unit_count(&self, indent: &str, offset: usize) -> Result<usize> {
        let unit_len = match &self.unit {
            Some(unit) => unit.len(),
            None => return Ok(if indent.is_empty() { 0 } else { 1 }),
        };
        if indent.len() % unit_len != 0 {
            return Err(indent_error(
                &format!(
                    "Indentation must be in multiples of the base indentation `{}`",
                    self.unit.as_deref().unwrap_or_default().escape_debug()
                ),
                offset,
            ));
        }
        Ok(indent.len() / unit_len)
    }

    /// Measure the indentation level of the current line. The cursor must be
    /// at a line start and is restored before returning.
    ///
    /// Outside raw mode, the first nonzero indentation seen becomes the
    /// permanent unit, and jumps of more than one level are rejected. In raw
    /// mode nothing is validated or inferred; the result is only used for
    /// dedent detection.
    pub(crate) fn measure(&mut self, cursor: &mut Cursor, raw: bool) -> Result<i32> {
        let start = cursor.pos();
        cursor.skip_inline_ws();
        let indent = cursor.slice(start, cursor.pos()).to_string();
        cursor.set_pos(start);

        if indent.is_empty() {
            return Ok(0);
        }
        if raw {
            return Ok(match &self.unit {
                Some(unit) => (indent.chars().count() / unit.chars().count()) as i32,
                None => UNMEASURED,
            });
        }

        self.validate(&indent, start)?;
        if self.unit.is_none() {
            self.unit = Some(indent.clone());
        }
        let level = self.unit_count(&indent, start)? as i32;
        if self.level >= 0 && level > self.level + 1 {
            return Err(indent_error(
                "Indent Error: you can only indent one level at a time",
                start,
            ));
        }
        Ok(level)
    }
}

fn indent_error(message: &str, offset: usize) -> PretexError {
    PretexError::Translate {
        message: message.to_string(),
        offset,
        help: None,
    }
}
