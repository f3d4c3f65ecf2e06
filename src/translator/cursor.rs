//! Position-based scanning over the source text.
//!
//! A [`Cursor`] owns the normalized input and a byte offset. All scanning is
//! predicate-driven and stops on char boundaries, so slices taken between
//! recorded positions are always valid UTF-8.

/// Whitespace that is not a line terminator.
pub(crate) fn is_inline_ws(c: char) -> bool {
    c.is_whitespace() && c != '\n'
}

#[derive(Debug)]
pub(crate) struct Cursor {
    text: String,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(text: String) -> Self {
        Self { text, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Rewind (or jump) to a previously recorded position.
    pub(crate) fn set_pos(&mut self, pos: usize) {
        debug_assert!(self.text.is_char_boundary(pos));
        self.pos = pos;
    }

    pub(crate) fn finished(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Advance past the current character, if any.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &str {
        &self.text[start..end]
    }

    pub(crate) fn slice_from(&self, start: usize) -> &str {
        &self.text[start..]
    }

    /// Advance while `pred` holds. The cursor ends on the first character
    /// that fails the predicate, or at end of input.
    pub(crate) fn scan_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Advance until `pred` holds.
    pub(crate) fn scan_until(&mut self, pred: impl Fn(char) -> bool) {
        self.scan_while(|c| !pred(c));
    }

    /// Skip spaces and tabs, but not newlines.
    pub(crate) fn skip_inline_ws(&mut self) {
        self.scan_while(is_inline_ws);
    }

    /// Advance to the start of the next line that contains something other
    /// than whitespace (or to end of input). A cursor mid-line only skips if
    /// the rest of the current line is blank.
    pub(crate) fn skip_blank_lines(&mut self) {
        while !self.finished() {
            let line_end = match self.text[self.pos..].find('\n') {
                Some(i) => self.pos + i,
                None => self.text.len() - 1,
            };
            let line = &self.text[self.pos..(line_end + 1).min(self.text.len())];
            if !line.chars().all(char::is_whitespace) {
                break;
            }
            self.pos = line_end + 1;
        }
        self.pos = self.pos.min(self.text.len());
    }

    /// Read a control sequence name. The cursor sits just past the escape
    /// character; names are the longest alphabetic run, or a single
    /// character for control symbols like `\%`.
    pub(crate) fn control_sequence(&mut self) -> String {
        let start = self.pos;
        self.scan_while(|c| c.is_alphabetic());
        if self.pos == start {
            self.bump();
        }
        self.text[start..self.pos].to_string()
    }
}
