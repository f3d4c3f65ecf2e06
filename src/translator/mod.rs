//! The translation engine.
//!
//! A [`Translator`] makes a single pass over one document with a single
//! cursor: no token stream, no AST. Indentation discovers block structure,
//! control sequences dispatch through the [`Registry`](crate::registry::Registry),
//! and the output LaTeX is accumulated as the cursor moves. Each translator
//! is built for one input and discarded afterwards; nothing is shared
//! between sessions.
//!
//! # Document shape
//!
//! A document is a preamble, a separator line of three or more `=`
//! characters, and a body. The preamble passes through almost verbatim
//! (commands and environments still expand); the body is wrapped in
//! `\begin{document}`/`\end{document}` and is fully block-structured: a
//! control sequence with a trailing colon opens an environment whose body is
//! either the rest of the line or the indented block that follows.

mod args;
mod cursor;
mod engine;
mod indent;

use std::path::PathBuf;

use crate::error::{PretexError, Result};
use crate::registry::Registry;

use cursor::Cursor;
use indent::IndentTracker;

/// What to do when a separator line shows up again inside the document body.
///
/// Left open by design: some projects want `===` available as plain text,
/// others want the typo caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorPolicy {
    /// A later separator is ordinary document text.
    #[default]
    Literal,
    /// A later separator is a fatal error.
    Error,
}

/// Session-level options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateOptions {
    pub duplicate_separator: SeparatorPolicy,
}

/// A non-fatal diagnostic produced during translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    /// Byte offset into the normalized source.
    pub offset: usize,
}

/// The result of a successful translation.
#[derive(Debug)]
pub struct Translation {
    /// The rendered LaTeX, always newline-terminated.
    pub text: String,
    pub warnings: Vec<Warning>,
    /// Files registered by environment actions (e.g. a code run that wrote
    /// figures to disk). Reported in registration order.
    pub artifacts: Vec<PathBuf>,
}

/// Translate a whole document using the given registry.
pub fn translate(source: &str, registry: &Registry) -> Result<Translation> {
    translate_with_options(source, registry, TranslateOptions::default())
}

/// Translate a whole document with explicit options.
pub fn translate_with_options(
    source: &str,
    registry: &Registry,
    options: TranslateOptions,
) -> Result<Translation> {
    Translator::new(source, registry, options).run()
}

/// One translation session. See the module docs for the overall shape; the
/// parsing methods live in `engine` and `args`.
pub struct Translator<'r> {
    pub(crate) cursor: Cursor,
    pub(crate) indent: IndentTracker,
    pub(crate) in_preamble: bool,
    pub(crate) registry: &'r Registry,
    pub(crate) options: TranslateOptions,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) artifacts: Vec<PathBuf>,
}

impl<'r> Translator<'r> {
    pub fn new(source: &str, registry: &'r Registry, options: TranslateOptions) -> Self {
        let mut text = source.to_owned();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Self {
            cursor: Cursor::new(text),
            indent: IndentTracker::new(),
            in_preamble: false,
            registry,
            options,
            warnings: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Run the session to completion.
    pub fn run(mut self) -> Result<Translation> {
        self.in_preamble = true;
        let mut text = self.parse_block(false)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(Translation {
            text,
            warnings: self.warnings,
            artifacts: self.artifacts,
        })
    }

    /// Fatal error at an explicit offset.
    pub(crate) fn error_at(&self, message: impl Into<String>, offset: usize) -> PretexError {
        PretexError::Translate {
            message: message.into(),
            offset,
            help: None,
        }
    }

    /// Fatal error at the current cursor position.
    pub(crate) fn error_here(&self, message: impl Into<String>) -> PretexError {
        self.error_at(message, self.cursor.pos())
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>, offset: usize) {
        self.warnings.push(Warning {
            message: message.into(),
            offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::registry::Registry;
    use crate::runner::{CodeRunner, ExecOutput};

    fn run(source: &str) -> String {
        translate(source, &Registry::builtin()).unwrap().text
    }

    fn run_err(source: &str) -> PretexError {
        translate(source, &Registry::builtin()).unwrap_err()
    }

    fn err_message(err: PretexError) -> String {
        match err {
            PretexError::Translate { message, .. } => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_hello() {
        let source = "\n\\documentclass{article}\n===\nHello?\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\begin{document}\nHello?\n\\end{document}\n"
        );
    }

    #[test]
    fn test_no_starting_newline() {
        let source = "\\documentclass{article}\n===\nHello?";
        assert_eq!(
            run(source),
            "\\documentclass{article}\n\\begin{document}\nHello?\n\\end{document}\n"
        );
    }

    #[test]
    fn test_comments_pass_through() {
        let source = "\n\\documentclass{arti%???\ncle}\n===\nHello?\n%bye\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{arti%???\ncle}\n\\begin{document}\nHello?\n%bye\n\\end{document}\n"
        );
    }

    #[test]
    fn test_docclass() {
        let source = "\n\\docclass{article}\n===\nHello?\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\begin{document}\nHello?\n\\end{document}\n"
        );
    }

    #[test]
    fn test_docclass_options() {
        let source = "\n\\docclass[twocolumn,twoside]{article}\n===\nHello?\n";
        assert_eq!(
            run(source),
            "\n\\documentclass[twocolumn,twoside]{article}\n\\begin{document}\nHello?\n\\end{document}\n"
        );
    }

    #[test]
    fn test_plain_latex_begin_end_passes_through() {
        let source = "\n\\docclass{article}\n===\n\\begin{document}\nHello!\n\\end{document}\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\begin{document}\n\\begin{document}\nHello!\n\\end{document}\n\\end{document}\n"
        );
    }

    #[test]
    fn test_equation_environment() {
        let source = "\n\\docclass{article}\n===\nHere is an equation:\n\\equation:\n    f(x) = x^2\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\begin{document}\nHere is an equation:\n\\begin{equation}\n    f(x) = x^2\n\\end{equation}\n\\end{document}\n"
        );
    }

    #[test]
    fn test_multiple_equations() {
        let source = "\n\\docclass{article}\n===\nHere is an equation:\n\\equation:\n    f(x) = x^2\nHere is another equation:\n\\equation:\n    f(x) = x^3\nHere are some concluding words.\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\begin{document}\nHere is an equation:\n\\begin{equation}\n    f(x) = x^2\n\\end{equation}\nHere is another equation:\n\\begin{equation}\n    f(x) = x^3\n\\end{equation}\nHere are some concluding words.\n\\end{document}\n"
        );
    }

    #[test]
    fn test_nested_environments() {
        let source = "\n\\docclass{article}\n===\n\\equation:\n    \\split:\n        f(x) = x^2\nAfter.\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\begin{document}\n\\begin{equation}\n    \\begin{split}\n        f(x) = x^2\n    \\end{split}\n\\end{equation}\nAfter.\n\\end{document}\n"
        );
    }

    #[test]
    fn test_eq_label_injection() {
        let source = "\n===\n\\eq[cubic]:\n    f(x) = x^3 - 4x^2 + 2\nSee \\ref{eq:cubic}.\n";
        assert_eq!(
            run(source),
            "\n\\begin{document}\n\\begin{equation}\\label{eq:cubic}\n    f(x) = x^3 - 4x^2 + 2\n\\end{equation}\nSee \\ref{eq:cubic}.\n\\end{document}\n"
        );
    }

    #[test]
    fn test_eq_without_label() {
        let source = "\n===\n\\eq:\n    f(x) = x^2 + 3\n";
        assert_eq!(
            run(source),
            "\n\\begin{document}\n\\begin{equation}\n    f(x) = x^2 + 3\n\\end{equation}\n\\end{document}\n"
        );
    }

    #[test]
    fn test_one_liners() {
        let source = "\n\\docclass{article}\n===\nhi here are some one line equations\n\\eq:    f(x) = oneLiner(whitespace should be kept)\nOr start at the \\textbf{middle} of a \\eq:line(x) = the end\n\\howAboutRandomStuff: hi some stuffz\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\begin{document}\nhi here are some one line equations\n\\begin{equation}    f(x) = oneLiner(whitespace should be kept)\\end{equation}\nOr start at the \\textbf{middle} of a \\begin{equation}line(x) = the end\\end{equation}\n\\begin{howAboutRandomStuff} hi some stuffz\\end{howAboutRandomStuff}\n\\end{document}\n"
        );
    }

    #[test]
    fn test_title_block_in_preamble() {
        let source = "\n\\docclass{article}\n\\title{Demo}\n\\author{Alex, Wanqi}\n===\n\\section{Introduction}\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\title{Demo}\n\\author{Alex, Wanqi}\n\\begin{document}\n\\section{Introduction}\n\\end{document}\n"
        );
    }

    #[test]
    fn test_one_liner_environment_in_preamble() {
        let source = "\n\\eq: f = \\textbf{bold text}\n===\nhello\n";
        assert_eq!(
            run(source),
            "\n\\begin{equation} f = \\textbf{bold text}\\end{equation}\n\\begin{document}\nhello\n\\end{document}\n"
        );
    }

    #[test]
    fn test_colon_command() {
        let source = "\n\\documentclass{article}\n===\n\\textbf{hi}\\colon\nHello?\n";
        assert_eq!(
            run(source),
            "\n\\documentclass{article}\n\\begin{document}\n\\textbf{hi}:\nHello?\n\\end{document}\n"
        );
    }

    #[test]
    fn test_verbatim_environment() {
        let source = "\n===\n\\verbatim:\n    kept \\exec: and %comments\n    as-is\nafter\n";
        assert_eq!(
            run(source),
            "\n\\begin{document}\n\\begin{verbatim}\n    kept \\exec: and %comments\n    as-is\n\\end{verbatim}\nafter\n\\end{document}\n"
        );
    }

    #[test]
    fn test_verb_command_keeps_body() {
        let source = "\n===\nstart\\verb{normal%withcomments{wow get out\\}} and some more\n";
        assert_eq!(
            run(source),
            "\n\\begin{document}\nstart\\verb{normal%withcomments{wow get out\\}} and some more\n\\end{document}\n"
        );
    }

    #[test]
    fn test_document_body_must_not_be_indented() {
        let source = "\n\\documentclass{article}\n===\n    Hello?\n";
        let message = err_message(run_err(source));
        assert!(message.contains("document as a whole must not be indented"));
    }

    #[test]
    fn test_unterminated_argument() {
        let source = "\n\\docclass{noend\n===\n\\eq:\n    never an end\n";
        let message = err_message(run_err(source));
        assert!(message.contains("Missing closing"));
    }

    #[test]
    fn test_short_separator_is_an_error() {
        let source = "\n\\docclass{article}\n==\nHello?\n";
        let message = err_message(run_err(source));
        assert!(message.contains("at least"));
    }

    #[test]
    fn test_plain_text_in_preamble_is_an_error() {
        let source = "\nnot a command\n===\n";
        let message = err_message(run_err(source));
        assert!(message.contains("Preamble must consist exclusively"));
    }

    #[test]
    fn test_idempotent_pass_through() {
        // No custom control sequences, no separator: identity modulo the
        // trailing-newline normalization.
        let source = "\\usepackage{amsmath}\n% a comment\n\\newcommand{\\x}{y}\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_warning_for_environment_in_one_liner() {
        let source = "\n===\n\\eq: a \\nested: b\n";
        let translation = translate(source, &Registry::builtin()).unwrap();
        assert_eq!(translation.warnings.len(), 1);
        assert!(translation.warnings[0].message.contains("one-line"));
        // the colon stays literal
        assert_eq!(
            translation.text,
            "\n\\begin{document}\n\\begin{equation} a \\nested: b\\end{equation}\n\\end{document}\n"
        );
    }

    #[test]
    fn test_duplicate_separator_literal_by_default() {
        let source = "\n===\nbefore\n===\nafter\n";
        assert_eq!(
            run(source),
            "\n\\begin{document}\nbefore\n===\nafter\n\\end{document}\n"
        );
    }

    #[test]
    fn test_duplicate_separator_error_policy() {
        let source = "\n===\nbefore\n===\nafter\n";
        let options = TranslateOptions {
            duplicate_separator: SeparatorPolicy::Error,
        };
        let err = translate_with_options(source, &Registry::builtin(), options).unwrap_err();
        assert!(err_message(err).contains("separator"));
    }

    struct EchoRunner;

    impl CodeRunner for EchoRunner {
        fn run(&self, source: &str) -> std::result::Result<ExecOutput, String> {
            // pretend to execute: emit one line per non-comment input line
            let stdout = source
                .lines()
                .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
                .map(|l| format!("ran: {}\n", l.trim()))
                .collect();
            Ok(ExecOutput {
                stdout,
                artifacts: vec!["table.tex".into()],
            })
        }
    }

    #[test]
    fn test_exec_environment_splices_output() {
        let registry = Registry::builtin_with_runner(Arc::new(EchoRunner));
        let source = "\n===\nHello?\n\\exec:\n    make_table()\nBye\n";
        let translation = translate(source, &registry).unwrap();
        assert_eq!(
            translation.text,
            "\n\\begin{document}\nHello?\nran: make_table()\n\nBye\n\\end{document}\n"
        );
        assert_eq!(translation.artifacts, vec![std::path::PathBuf::from("table.tex")]);
    }

    #[test]
    fn test_exec_in_preamble() {
        let registry = Registry::builtin_with_runner(Arc::new(EchoRunner));
        let source = "\n\\docclass{article}\n\\exec:\n    emit_macros()\n\\title{a Title}\n===\nhello\n";
        let translation = translate(source, &registry).unwrap();
        assert_eq!(
            translation.text,
            "\n\\documentclass{article}\nran: emit_macros()\n\n\\title{a Title}\n\\begin{document}\nhello\n\\end{document}\n"
        );
    }

    struct SadRunner;

    impl CodeRunner for SadRunner {
        fn run(&self, _source: &str) -> std::result::Result<ExecOutput, String> {
            Err("`python3` exited with exit status: 1: NameError".to_string())
        }
    }

    #[test]
    fn test_exec_failure_is_fatal() {
        let registry = Registry::builtin_with_runner(Arc::new(SadRunner));
        let source = "\n===\n\\exec:\n    nope()\n";
        let err = translate(source, &registry).unwrap_err();
        assert!(err_message(err).contains("NameError"));
    }

    #[test]
    fn test_kitchen_sink_snapshot() {
        let source = "\\docclass[a4paper]{report}\n\\title{Waves}\n===\n\\section{Theory}\nAs shown in \\eq[disp]: \\omega^2 = gk\nDeep water:\n\\align:\n    \\omega &= \\sqrt{gk}\n";
        insta::assert_snapshot!(run(source).trim_end(), @r###"
        \documentclass[a4paper]{report}
        \title{Waves}
        \begin{document}
        \section{Theory}
        As shown in \begin{equation}\label{eq:disp} \omega^2 = gk\end{equation}
        Deep water:
        \begin{align}
            \omega &= \sqrt{gk}
        \end{align}
        \end{document}
        "###);
    }
}
