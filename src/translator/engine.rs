//! The block/environment engine.
//!
//! `parse_block` scans one indentation frame: it is entered with the
//! enclosing frame's level still active, measures its own level from the
//! first content line, and hands text through until a line at or below the
//! enclosing level ends the frame. The boundary newline is left unconsumed
//! so the enclosing frame sees it and can end at the same point without
//! re-scanning.
//!
//! Environments recurse: a trailing colon after a control sequence's
//! arguments promotes it to an opener, and the body is either the rest of
//! the line (one-liner) or the indented block on the following line. Raw
//! frames interpret newlines only; everything else is copied verbatim.

use super::{SeparatorPolicy, Translator};
use crate::error::{PretexError, Result};
use crate::registry::{resolve_args, Argument, EnvHooks};

const ROOT_INDENTED: &str = "The document as a whole must not be indented";
const BAD_BLOCK_INDENT: &str =
    "You must either put the body of an environment all on one line, or on an indented block on the following line";
const UNEXPECTED_INDENT: &str = "Invalid indentation not following the opening of an environment";
const BAD_PREAMBLE_LINE: &str = "Preamble must consist exclusively of commands and comments";
const SHORT_SEPARATOR: &str = "Document separator must be at least `===`";
const NOISY_SEPARATOR: &str = "Document separator line must contain only `=` characters";
const DUPLICATE_SEPARATOR: &str = "Document separator appears more than once";

/// What a root-level preamble line turned out to be.
enum PreambleLine {
    /// The `===` separator; the cursor sits at its terminating newline.
    Separator,
    /// A command or comment line; the cursor is back at the line start.
    Command,
}

impl Translator<'_> {
    /// Parse one block frame. On entry the cursor is at the start of the
    /// frame's (possibly blank) line range and `self.indent.level` still
    /// holds the enclosing level; the first content line must sit exactly
    /// one level deeper (for the root pseudo frame at `-1`, that means
    /// unindented).
    ///
    /// Returns the rendered text of the frame. When a dedent ends the frame
    /// the cursor is left at the boundary newline; at end of input the text
    /// is newline-terminated and the cursor is spent.
    pub(crate) fn parse_block(&mut self, raw: bool) -> Result<String> {
        let parent = self.indent.level;
        let mut out = String::new();
        let mut token_start = self.cursor.pos();

        self.cursor.skip_blank_lines();

        // the separator may be the first content in the file
        if parent == -1 && self.in_preamble && !self.cursor.finished() {
            let line_start = self.cursor.pos();
            if let PreambleLine::Separator = self.classify_preamble_line()? {
                out.push_str(self.cursor.slice(token_start, line_start));
                let tail = self.parse_document_tail()?;
                out.push_str(&tail);
                return Ok(out);
            }
        }

        let first_level = self.indent.measure(&mut self.cursor, raw)?;
        if raw {
            if first_level <= parent {
                return Err(self.error_here(BAD_BLOCK_INDENT));
            }
            self.indent.level = parent.saturating_add(1);
        } else if first_level != parent + 1 {
            let message = if parent == -1 { ROOT_INDENTED } else { BAD_BLOCK_INDENT };
            return Err(self.error_here(message));
        } else {
            self.indent.level = first_level;
        }
        if parent == -1 && !self.in_preamble && !raw {
            self.check_duplicate_separator()?;
        }

        loop {
            self.cursor
                .scan_until(|c| c == '\n' || (!raw && (c == '\\' || c == '%')));
            let c = match self.cursor.peek() {
                Some(c) => c,
                None => break,
            };

            if c == '\n' {
                let newline = self.cursor.pos();
                self.cursor.skip_blank_lines();
                if self.cursor.finished() {
                    if parent >= 0 {
                        out.push_str(self.cursor.slice(token_start, newline));
                        self.cursor.set_pos(newline);
                        self.indent.level = parent;
                        return Ok(out);
                    }
                    break;
                }
                if parent == -1 && self.in_preamble && !raw {
                    let line_start = self.cursor.pos();
                    if let PreambleLine::Separator = self.classify_preamble_line()? {
                        out.push_str(self.cursor.slice(token_start, line_start));
                        let tail = self.parse_document_tail()?;
                        out.push_str(&tail);
                        return Ok(out);
                    }
                }
                let line_start = self.cursor.pos();
                let level = self.indent.measure(&mut self.cursor, raw)?;
                if !raw && level > self.indent.level {
                    return Err(self.error_at(UNEXPECTED_INDENT, line_start));
                }
                if parent >= 0 && level <= parent {
                    out.push_str(self.cursor.slice(token_start, newline));
                    self.cursor.set_pos(newline);
                    self.indent.level = parent;
                    return Ok(out);
                }
                if parent == -1 && !self.in_preamble && !raw {
                    self.check_duplicate_separator()?;
                }
            } else if c == '%' {
                // the comment's literal text stays in the block; only its
                // interpretation is suppressed
                self.cursor.scan_until(|c| c == '\n');
            } else {
                // '\\'
                let escape = self.cursor.pos();
                self.cursor.bump();
                let name = self.cursor.control_sequence();
                out.push_str(self.cursor.slice(token_start, escape));
                let registry = self.registry;
                if let Some(command) = registry.command(&name) {
                    let expanded = self.do_command(command)?;
                    out.push_str(&expanded);
                } else {
                    let (args, literal) = self.parse_args(None, None)?;
                    let ws_start = self.cursor.pos();
                    self.cursor.skip_inline_ws();
                    if self.cursor.peek() == Some(':') {
                        self.cursor.bump();
                        let rendered = self.do_environment(&name, &args, &literal)?;
                        out.push_str(&rendered);
                    } else {
                        let ws_end = self.cursor.pos();
                        out.push('\\');
                        out.push_str(&name);
                        out.push_str(&literal);
                        out.push_str(self.cursor.slice(ws_start, ws_end));
                    }
                }
                token_start = self.cursor.pos();
            }
        }

        out.push_str(self.cursor.slice_from(token_start));
        if !out.ends_with('\n') {
            out.push('\n');
        }
        self.indent.level = parent;
        Ok(out)
    }

    /// Render an environment whose opening colon has just been consumed.
    ///
    /// A one-liner body is the rest of the line (leading whitespace kept);
    /// otherwise the body is the indented block on the following line, with
    /// a trailing newline and the opener's indentation appended so the
    /// closing wrapper lines up.
    pub(crate) fn do_environment(
        &mut self,
        name: &str,
        args: &[Argument],
        literal_args: &str,
    ) -> Result<String> {
        let registry = self.registry;
        let environment = registry.environment(name);
        let raw = environment.is_some_and(|e| e.raw);
        let outer_level = self.indent.level.max(0);
        let opener = self.cursor.pos();

        self.cursor.skip_inline_ws();
        let mut trailing_comment = None;
        let body = match self.cursor.peek() {
            None | Some('\n') => {
                let mut body = self.parse_block(raw)?;
                if !body.ends_with('\n') {
                    body.push('\n');
                }
                if outer_level > 0 {
                    if let Some(unit) = self.indent.unit() {
                        body.push_str(&unit.repeat(outer_level as usize));
                    }
                }
                body
            }
            Some(_) => {
                self.cursor.set_pos(opener);
                if raw {
                    let start = self.cursor.pos();
                    self.cursor.scan_until(|c| c == '\n');
                    self.cursor.slice(start, self.cursor.pos()).to_string()
                } else {
                    let (body, comment) = self.parse_oneliner_body()?;
                    trailing_comment = comment;
                    body
                }
            }
        };

        let mut rendered = match environment {
            Some(environment) => {
                let resolved = resolve_args(&environment.name, &environment.pattern, args)
                    .map_err(|message| self.error_at(message, opener))?;
                let result = {
                    let mut hooks = EnvHooks {
                        artifacts: &mut self.artifacts,
                    };
                    (environment.action)(&mut hooks, &body, &resolved)
                };
                result.map_err(|message| PretexError::Translate {
                    message,
                    offset: opener,
                    help: None,
                })?
            }
            None => format!("\\begin{{{name}}}{literal_args}{body}\\end{{{name}}}"),
        };
        if let Some(comment) = trailing_comment {
            rendered.push_str(&comment);
        }
        Ok(rendered)
    }

    /// Scan a one-liner environment body: everything up to the next
    /// newline, comment marker, or end of input. Registered commands still
    /// expand; an environment-opening colon is unsupported here and is left
    /// as literal text with a warning. A terminating comment's text is
    /// returned separately so it can be re-attached after the closing
    /// wrapper.
    pub(crate) fn parse_oneliner_body(&mut self) -> Result<(String, Option<String>)> {
        let mut body = String::new();
        let mut token_start = self.cursor.pos();

        loop {
            self.cursor
                .scan_until(|c| c == '\n' || c == '\\' || c == '%');
            let c = match self.cursor.peek() {
                Some(c) => c,
                None => {
                    body.push_str(self.cursor.slice_from(token_start));
                    return Ok((body, None));
                }
            };
            match c {
                '\n' => {
                    body.push_str(self.cursor.slice(token_start, self.cursor.pos()));
                    return Ok((body, None));
                }
                '%' => {
                    let comment_start = self.cursor.pos();
                    body.push_str(self.cursor.slice(token_start, comment_start));
                    self.cursor.scan_until(|c| c == '\n');
                    let comment = self.cursor.slice(comment_start, self.cursor.pos()).to_string();
                    return Ok((body, Some(comment)));
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
                        token_start = self.cursor.pos();
                    } else {
                        let (_args, literal) = self.parse_args(None, None)?;
                        body.push('\\');
                        body.push_str(&name);
                        body.push_str(&literal);
                        let ws_start = self.cursor.pos();
                        self.cursor.skip_inline_ws();
                        if self.cursor.peek() == Some(':') {
                            self.warn(
                                format!(
                                    "`\\{name}:` cannot open an environment inside a one-line body; treating `:` as literal text"
                                ),
                                escape,
                            );
                        }
                        token_start = ws_start;
                    }
                }
            }
        }
    }

    /// Decide what a root-level preamble line is. Blank lines are already
    /// skipped; anything that is not a control sequence, a comment, or the
    /// document separator is an error.
    fn classify_preamble_line(&mut self) -> Result<PreambleLine> {
        let line_start = self.cursor.pos();
        self.cursor.skip_inline_ws();
        match self.cursor.peek() {
            Some('=') => {
                let equals_start = self.cursor.pos();
                self.cursor.scan_while(|c| c == '=');
                if self.cursor.pos() - equals_start < 3 {
                    return Err(self.error_at(SHORT_SEPARATOR, line_start));
                }
                self.cursor.skip_inline_ws();
                match self.cursor.peek() {
                    None | Some('\n') => Ok(PreambleLine::Separator),
                    Some(_) => Err(self.error_here(NOISY_SEPARATOR)),
                }
            }
            Some('\\') | Some('%') | None => {
                self.cursor.set_pos(line_start);
                Ok(PreambleLine::Command)
            }
            Some(_) => Err(self.error_at(BAD_PREAMBLE_LINE, line_start)),
        }
    }

    /// Parse everything after the separator as the body of the implicit
    /// `document` environment. The cursor sits at the separator line's
    /// terminating newline.
    fn parse_document_tail(&mut self) -> Result<String> {
        self.in_preamble = false;
        self.indent.level = -1;
        let mut body = self.parse_block(false)?;
        if !body.ends_with('\n') {
            body.push('\n');
        }
        Ok(format!("\\begin{{document}}{body}\\end{{document}}"))
    }

    /// Under [`SeparatorPolicy::Error`], reject a separator-shaped line in
    /// the document body. The cursor must be at a root-level line start and
    /// is restored.
    fn check_duplicate_separator(&mut self) -> Result<()> {
        if self.options.duplicate_separator != SeparatorPolicy::Error {
            return Ok(());
        }
        let line_start = self.cursor.pos();
        self.cursor.skip_inline_ws();
        let equals_start = self.cursor.pos();
        self.cursor.scan_while(|c| c == '=');
        let equals = self.cursor.pos() - equals_start;
        self.cursor.skip_inline_ws();
        let at_eol = matches!(self.cursor.peek(), None | Some('\n'));
        self.cursor.set_pos(line_start);
        if equals >= 3 && at_eol {
            return Err(self.error_at(DUPLICATE_SEPARATOR, line_start));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::registry::{Environment, Registry, RegistryBuilder};
    use crate::translator::{TranslateOptions, Translator};

    fn prep<'r>(source: &str, registry: &'r Registry, level: i32) -> Translator<'r> {
        let mut t = Translator::new(source, registry, TranslateOptions::default());
        t.indent.unit = Some("    ".to_string());
        t.indent.level = level;
        t
    }

    fn registry_with_test_env() -> Registry {
        let mut builder = RegistryBuilder::with_builtins();
        builder.environment(Environment::new("test", "", |_hooks, body, _args| {
            Ok(format!("\\begin{{test}}{body}\\end{{test}}"))
        }));
        builder.environment(Environment::new("testarg", "!", |_hooks, body, args| {
            Ok(format!(
                "\\begin{{test}}\\textbf{{{}}}{body}\\end{{test}}",
                args[0].as_deref().unwrap_or("")
            ))
        }));
        builder.build()
    }

    fn err_message(err: PretexError) -> String {
        match err {
            PretexError::Translate { message, .. } => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_block() {
        let registry = Registry::builtin();
        let mut t = prep("\n    hello\n    \ngoodbye", &registry, 0);
        assert_eq!(t.parse_block(false).unwrap(), "\n    hello");
        assert_eq!(t.cursor.peek(), Some('\n'));
        assert_eq!(t.cursor.pos(), 10);
    }

    #[test]
    fn test_parse_block_at_root() {
        let registry = Registry::builtin();
        let mut t = prep("\nhello\n\ngoodbye\n", &registry, -1);
        assert_eq!(t.parse_block(false).unwrap(), "\nhello\n\ngoodbye\n");
        assert!(t.cursor.finished());
    }

    #[test]
    fn test_parse_block_trailing_blanks() {
        let registry = Registry::builtin();
        let mut t = prep("\n    hello\n    \n", &registry, 0);
        assert_eq!(t.parse_block(false).unwrap(), "\n    hello");
        assert_eq!(t.cursor.pos(), 10);
    }

    #[test]
    fn test_parse_block_nested_level() {
        let registry = Registry::builtin();
        let mut t = prep("\n        hello\n    \n    goodbye", &registry, 1);
        assert_eq!(t.parse_block(false).unwrap(), "\n        hello");
        assert_eq!(t.cursor.pos(), 14);
        assert_eq!(t.cursor.peek(), Some('\n'));
    }

    #[test]
    fn test_parse_block_nested_level_at_end() {
        let registry = Registry::builtin();
        let mut t = prep("\n        hello\n    \n    ", &registry, 1);
        assert_eq!(t.parse_block(false).unwrap(), "\n        hello");
        assert_eq!(t.cursor.pos(), 14);
    }

    #[test]
    fn test_parse_block_double_indent_fails() {
        let registry = Registry::builtin();
        let mut t = prep("        some text", &registry, 0);
        let message = err_message(t.parse_block(false).unwrap_err());
        assert!(message.contains("Indent Error"));
    }

    #[test]
    fn test_parse_block_root_must_not_be_indented() {
        let registry = Registry::builtin();
        let mut t = prep("\n    hello\n    \n    goodbye\n", &registry, -1);
        let message = err_message(t.parse_block(false).unwrap_err());
        assert!(message.contains("document as a whole must not be indented"));
    }

    #[test]
    fn test_parse_block_raw_keeps_weird_indentation() {
        let registry = Registry::builtin();
        let source = "\nhello\n        weird indentation\n\n    this too\ngoodbye\n";
        let mut t = prep(source, &registry, -1);
        assert_eq!(t.parse_block(true).unwrap(), source);
        assert!(t.cursor.finished());
    }

    #[test]
    fn test_parse_block_raw_keeps_comments() {
        let registry = Registry::builtin();
        let source = "\nhello\n    %wha t is \\dis\n\n%this too\ngoodbye\n";
        let mut t = prep(source, &registry, -1);
        assert_eq!(t.parse_block(true).unwrap(), source);
        assert!(t.cursor.finished());
    }

    #[test]
    fn test_parse_block_raw_keeps_control_sequences() {
        let registry = Registry::builtin();
        let source = "\nhello\n    \\exec: \\distoo\n\n\\verb too\ngoodbye\n";
        let mut t = prep(source, &registry, -1);
        assert_eq!(t.parse_block(true).unwrap(), source);
        assert!(t.cursor.finished());
    }

    #[test]
    fn test_parse_block_with_environment() {
        let registry = Registry::builtin();
        let mut t = prep(
            "\n    hello\n    \\environment:\n        nested\ngoodbye\n",
            &registry,
            0,
        );
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\n    hello\n    \\begin{environment}\n        nested\n    \\end{environment}"
        );
        assert_eq!(t.cursor.peek(), Some('\n'));
    }

    #[test]
    fn test_parse_block_environment_with_args() {
        let registry = Registry::builtin();
        let mut t = prep(
            "\\environment[arg1] { arg2}:\n    contents\n    contents2\ngoodbye\n",
            &registry,
            -1,
        );
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\\begin{environment}[arg1] { arg2}\n    contents\n    contents2\n\\end{environment}\ngoodbye\n"
        );
    }

    #[test]
    fn test_parse_block_environment_deeper() {
        let registry = Registry::builtin();
        let mut t = prep(
            "\n        hello\n        \\environment:\n            nested\n    goodbye",
            &registry,
            1,
        );
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\n        hello\n        \\begin{environment}\n            nested\n        \\end{environment}"
        );
        assert_eq!(t.cursor.peek(), Some('\n'));
        assert_eq!(t.cursor.pos(), 55);
    }

    #[test]
    fn test_parse_block_verbatim_ignores_everything() {
        let registry = Registry::builtin();
        let mut t = prep(
            "\n\\verbatim:\n    hiiminverbatim\n    \\exec:\n        this should be ignored\n    \\eq{ok}: f(x)\n    this too\n",
            &registry,
            -1,
        );
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\n\\begin{verbatim}\n    hiiminverbatim\n    \\exec:\n        this should be ignored\n    \\eq{ok}: f(x)\n    this too\n\\end{verbatim}\n"
        );
    }

    #[test]
    fn test_parse_block_verb_command() {
        let registry = Registry::builtin();
        let mut t = prep(
            "\nstart\\verb{normal%withcomments{wow get out\\}} and some more",
            &registry,
            -1,
        );
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\nstart\\verb{normal%withcomments{wow get out\\}} and some more\n"
        );
    }

    #[test]
    fn test_do_environment_block_body() {
        let registry = registry_with_test_env();
        let mut t = prep("\n    hello\n    \ngoodbye", &registry, 0);
        let rendered = t.do_environment("test", &[], "").unwrap();
        assert_eq!(rendered, "\\begin{test}\n    hello\n\\end{test}");
        assert_eq!(t.cursor.peek(), Some('\n'));
    }

    #[test]
    fn test_do_environment_with_args() {
        let registry = registry_with_test_env();
        let mut t = prep("\n    hello\n    \ngoodbye", &registry, 0);
        let rendered = t
            .do_environment("testarg", &[Argument::required("arg1")], "")
            .unwrap();
        assert_eq!(
            rendered,
            "\\begin{test}\\textbf{arg1}\n    hello\n\\end{test}"
        );
    }

    #[test]
    fn test_do_environment_unindented_body_fails() {
        let registry = registry_with_test_env();
        let mut t = prep("\nhello\n\ngoodbye", &registry, 0);
        let message = err_message(t.do_environment("test", &[], "").unwrap_err());
        assert!(message.contains("indented block on the following line"));
    }

    #[test]
    fn test_do_environment_nested() {
        let registry = registry_with_test_env();
        let mut t = prep(
            "\n    hello\n    \\environment:\n        nested\ngoodbye",
            &registry,
            0,
        );
        let rendered = t.do_environment("test", &[], "").unwrap();
        assert_eq!(
            rendered,
            "\\begin{test}\n    hello\n    \\begin{environment}\n        nested\n    \\end{environment}\n\\end{test}"
        );
        assert_eq!(t.cursor.peek(), Some('\n'));
    }

    #[test]
    fn test_do_environment_nested_at_end_of_input() {
        let registry = registry_with_test_env();
        // no trailing newline: normalization adds one
        let mut t = prep("\n    hello\n    \\environment:\n        nested", &registry, 0);
        let rendered = t.do_environment("test", &[], "").unwrap();
        assert_eq!(
            rendered,
            "\\begin{test}\n    hello\n    \\begin{environment}\n        nested\n    \\end{environment}\n\\end{test}"
        );
    }

    #[test]
    fn test_do_environment_comment_does_not_open() {
        let registry = registry_with_test_env();
        let mut t = prep(
            "\n    hello\n    %IGNORETHIN\\environment:\n    \\realEnvironment:\n        nested\ngoodbye",
            &registry,
            0,
        );
        let rendered = t.do_environment("test", &[], "").unwrap();
        assert_eq!(
            rendered,
            "\\begin{test}\n    hello\n    %IGNORETHIN\\environment:\n    \\begin{realEnvironment}\n        nested\n    \\end{realEnvironment}\n\\end{test}"
        );
        assert_eq!(t.cursor.peek(), Some('\n'));
    }

    #[test]
    fn test_one_liner_whitespace_kept() {
        let registry = Registry::builtin();
        let mut t = prep(
            "\n\\eq:    f(x) = oneLiner(whitespace should be kept)  \n",
            &registry,
            -1,
        );
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\n\\begin{equation}    f(x) = oneLiner(whitespace should be kept)  \\end{equation}\n"
        );
    }

    #[test]
    fn test_one_liner_without_trailing_newline() {
        let registry = Registry::builtin();
        let mut t = prep(
            "\n\\eq:    f(x) = oneLiner(whitespace should be kept)  ",
            &registry,
            -1,
        );
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\n\\begin{equation}    f(x) = oneLiner(whitespace should be kept)  \\end{equation}\n"
        );
    }

    #[test]
    fn test_one_liner_with_commands() {
        let registry = Registry::builtin();
        let mut t = prep("\n\\eq:    f(x) = \\textbf{one}Liner(!) ", &registry, -1);
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\n\\begin{equation}    f(x) = \\textbf{one}Liner(!) \\end{equation}\n"
        );
    }

    #[test]
    fn test_one_liner_with_registered_command() {
        let registry = Registry::builtin();
        let mut t = prep("\n\\eq:    f(x) = \\docclass{mydoc}wow ", &registry, -1);
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\n\\begin{equation}    f(x) = \\documentclass{mydoc}wow \\end{equation}\n"
        );
    }

    #[test]
    fn test_one_liner_with_comment() {
        let registry = Registry::builtin();
        let mut t = prep("\n\\eq:    f(x) = %\\docclass{acomment} \n", &registry, -1);
        assert_eq!(
            t.parse_block(false).unwrap(),
            "\n\\begin{equation}    f(x) = \\end{equation}%\\docclass{acomment} \n"
        );
    }

    #[test]
    fn test_one_liner_nested_environment_warns() {
        let registry = Registry::builtin();
        let mut t = prep("\n\\eq: x \\inner: y\n", &registry, -1);
        let out = t.parse_block(false).unwrap();
        assert_eq!(
            out,
            "\n\\begin{equation} x \\inner: y\\end{equation}\n"
        );
        assert_eq!(t.warnings.len(), 1);
        assert!(t.warnings[0].message.contains("one-line"));
    }

    #[test]
    fn test_separator_basic() {
        let registry = Registry::builtin();
        let mut t = prep("\n===\n", &registry, -1);
        t.in_preamble = true;
        let out = t.parse_block(false).unwrap();
        assert_eq!(out, "\n\\begin{document}\n\\end{document}");
    }

    #[test]
    fn test_separator_with_padding_and_extra_equals() {
        let registry = Registry::builtin();
        let mut t = prep("\n\n =======================  \nbody\n", &registry, -1);
        t.in_preamble = true;
        let out = t.parse_block(false).unwrap();
        assert_eq!(out, "\n\n\\begin{document}\nbody\n\\end{document}");
    }

    #[test]
    fn test_separator_commented_out_is_not_a_separator() {
        let registry = Registry::builtin();
        let mut t = prep("\n\n\n%=====  \n", &registry, -1);
        t.in_preamble = true;
        // the comment line passes preamble validation, no separator seen
        let out = t.parse_block(false).unwrap();
        assert_eq!(out, "\n\n\n%=====  \n");
        assert!(t.in_preamble);
    }

    #[test]
    fn test_separator_too_short() {
        let registry = Registry::builtin();
        let mut t = prep("\n\n =  \n", &registry, -1);
        t.in_preamble = true;
        let message = err_message(t.parse_block(false).unwrap_err());
        assert!(message.contains("must be at least `===`"));
    }

    #[test]
    fn test_separator_with_junk() {
        let registry = Registry::builtin();
        let mut t = prep("\n=== wat\n", &registry, -1);
        t.in_preamble = true;
        let message = err_message(t.parse_block(false).unwrap_err());
        assert!(message.contains("only `=`"));
    }

    #[test]
    fn test_preamble_rejects_plain_text() {
        let registry = Registry::builtin();
        let mut t = prep("\n\n 1341  \n", &registry, -1);
        t.in_preamble = true;
        let message = err_message(t.parse_block(false).unwrap_err());
        assert!(message.contains("Preamble must consist exclusively"));
    }

    #[test]
    fn test_unexpected_indent_fails() {
        let registry = Registry::builtin();
        let mut t = prep("\nok\n    more\n", &registry, -1);
        let message = err_message(t.parse_block(false).unwrap_err());
        assert!(message.contains("Invalid indentation"));
    }
}
