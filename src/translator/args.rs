//! Argument collection for control sequences.
//!
//! Arguments are balanced `{...}` (required) or `[...]` (optional) groups.
//! Brace groups commit: a missing closer is fatal. Bracket groups are
//! speculative: if no `]` turns up before end of input, the cursor rewinds
//! to the opening bracket and the argument list simply ends there, which is
//! what makes `[` usable as ordinary text right after a command.

use super::Translator;
use crate::error::Result;
use crate::registry::{resolve_args, Argument, Command};

impl Translator<'_> {
    /// Parse a greedy argument list. Returns the structured arguments plus
    /// the literal source span they came from (leading and inter-argument
    /// whitespace included, trailing whitespace excluded) — the span is what
    /// gets re-emitted for pass-through control sequences.
    pub(crate) fn parse_args(
        &mut self,
        min_args: Option<usize>,
        max_args: Option<usize>,
    ) -> Result<(Vec<Argument>, String)> {
        let mut args = Vec::new();
        let span_start = self.cursor.pos();
        let mut span_end = span_start;

        loop {
            if let Some(max) = max_args {
                if args.len() >= max {
                    break;
                }
            }
            let before_ws = self.cursor.pos();
            self.cursor.skip_inline_ws();
            match self.cursor.peek() {
                Some('{') => {
                    self.cursor.bump();
                    let text = self.parse_required_arg('}')?;
                    args.push(Argument::required(text));
                    span_end = self.cursor.pos();
                }
                Some('[') => {
                    let bracket = self.cursor.pos();
                    self.cursor.bump();
                    match self.parse_arg_probe(']')? {
                        Some(text) => {
                            args.push(Argument::optional(text));
                            span_end = self.cursor.pos();
                        }
                        None => {
                            // failed probe must not consume input
                            self.cursor.set_pos(bracket);
                            break;
                        }
                    }
                }
                _ => {
                    self.cursor.set_pos(before_ws);
                    if let Some(min) = min_args {
                        if args.len() < min {
                            return Err(self.error_here("Too few arguments provided"));
                        }
                    }
                    break;
                }
            }
        }

        let literal = self.cursor.slice(span_start, span_end).to_string();
        Ok((args, literal))
    }

    /// Parse one argument whose opening delimiter has been consumed, failing
    /// if the closer is missing.
    pub(crate) fn parse_required_arg(&mut self, close: char) -> Result<String> {
        let open = self.cursor.pos();
        match self.parse_arg_probe(close)? {
            Some(text) => Ok(text),
            None => Err(self.error_at(format!("Missing closing `{close}`"), open)),
        }
    }

    /// Scan one argument up to the matching `close`. Inner brace groups nest,
    /// registered commands expand in place, unregistered control sequences
    /// pass through with their own argument spans, and comment spans vanish.
    /// Returns `None` (cursor at end of input, caller rewinds) when no closer
    /// is found.
    pub(crate) fn parse_arg_probe(&mut self, close: char) -> Result<Option<String>> {
        let mut body = String::new();
        let mut token_start = self.cursor.pos();

        loop {
            self.cursor
                .scan_until(|c| c == '\\' || c == '{' || c == '%' || c == close);
            let c = match self.cursor.peek() {
                Some(c) => c,
                None => return Ok(None),
            };
            if c == close {
                body.push_str(self.cursor.slice(token_start, self.cursor.pos()));
                self.cursor.bump();
                return Ok(Some(body));
            }
            match c {
                '{' => {
                    body.push_str(self.cursor.slice(token_start, self.cursor.pos()));
                    self.cursor.bump();
                    let inner = self.parse_required_arg('}')?;
                    body.push('{');
                    body.push_str(&inner);
                    body.push('}');
                    token_start = self.cursor.pos();
                }
                '%' => {
                    body.push_str(self.cursor.slice(token_start, self.cursor.pos()));
                    self.skip_comment_span();
                    token_start = self.cursor.pos();
                }
                _ => {
                    // '\\'
                    let escape = self.cursor.pos();
                    self.cursor.bump();
                    let name = self.cursor.control_sequence();
                    body.push_str(self.cursor.slice(token_start, escape));
                    let registry = self.registry;
                    if let Some(command) = registry.command(&name) {
                        let expanded = self.do_command(command)?;
                        body.push_str(&expanded);
                    } else {
                        let (_args, literal) = self.parse_args(None, None)?;
                        body.push('\\');
                        body.push_str(&name);
                        body.push_str(&literal);
                    }
                    token_start = self.cursor.pos();
                }
            }
        }
    }

    /// Skip a comment through its line end, plus any following lines that
    /// are blank or comment-only. Nothing is emitted for the skipped span.
    pub(crate) fn skip_comment_span(&mut self) {
        loop {
            self.cursor.scan_until(|c| c == '\n');
            if self.cursor.finished() {
                return;
            }
            self.cursor.bump();
            let line_start = self.cursor.pos();
            self.cursor.skip_inline_ws();
            match self.cursor.peek() {
                Some('%') => continue,
                Some('\n') => continue,
                _ => {
                    self.cursor.set_pos(line_start);
                    return;
                }
            }
        }
    }

    /// Scan a single verbatim brace argument: everything up to the first
    /// unescaped `}`. `\X` pairs are inert and nothing is interpreted, so
    /// comments and stray `{` pass through untouched.
    pub(crate) fn parse_raw_arg(&mut self, name: &str) -> Result<String> {
        self.cursor.skip_inline_ws();
        if self.cursor.peek() != Some('{') {
            return Err(self.error_here(format!("Missing required argument for `\\{name}`")));
        }
        let open = self.cursor.pos();
        self.cursor.bump();
        let start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => return Err(self.error_at("Missing closing `}`", open)),
                Some('\\') => {
                    self.cursor.bump();
                    self.cursor.bump();
                }
                Some('}') => {
                    let text = self.cursor.slice(start, self.cursor.pos()).to_string();
                    self.cursor.bump();
                    return Ok(text);
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
    }

    /// Collect a registered command's arguments and run its action. The
    /// cursor sits just past the command name on entry and just past the
    /// last consumed argument on return.
    pub(crate) fn do_command(&mut self, command: &Command) -> Result<String> {
        if command.pattern.is_empty() {
            return Ok((command.action)(&[]));
        }
        let args_at = self.cursor.pos();
        let args = if command.raw_arg {
            let text = self.parse_raw_arg(&command.name)?;
            vec![Argument::required(text)]
        } else {
            let (args, _literal) = self.parse_args(None, Some(command.pattern.len()))?;
            args
        };
        let resolved = resolve_args(&command.name, &command.pattern, &args)
            .map_err(|message| self.error_at(message, args_at))?;
        Ok((command.action)(&resolved))
    }
}
