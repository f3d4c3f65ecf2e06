//! Extension-point type definitions for the registry.
//!
//! Commands and environments are the two pluggable shapes the translator
//! dispatches to. Both declare a parameter pattern; the translator parses a
//! flat argument list from the source and [`resolve_args`] matches it against
//! the pattern by kind before the extension's action runs.

use std::fmt;
use std::path::PathBuf;

/// One parameter slot of a command or environment signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A `{...}` argument that must be present.
    Required,
    /// A `[...]` argument that may be absent.
    Optional,
}

/// An ordered parameter signature.
///
/// Built from a compact spec string: `!` for a required slot, `?` for an
/// optional one (`"?!"` reads "optional, then required").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamPattern(Vec<ParamKind>);

impl ParamPattern {
    /// Parse a spec string.
    ///
    /// # Panics
    ///
    /// Panics on characters other than `!` and `?`; signatures are fixed at
    /// registration time, so a bad spec is a programming error.
    pub fn from_spec(spec: &str) -> Self {
        let slots = spec
            .chars()
            .map(|c| match c {
                '!' => ParamKind::Required,
                '?' => ParamKind::Optional,
                other => panic!("invalid parameter spec character `{other}` (expected `!` or `?`)"),
            })
            .collect();
        Self(slots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn slots(&self) -> &[ParamKind] {
        &self.0
    }
}

impl fmt::Display for ParamPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in &self.0 {
            f.write_str(match kind {
                ParamKind::Required => "!",
                ParamKind::Optional => "?",
            })?;
        }
        Ok(())
    }
}

/// One argument as parsed from the source: its text and whether it arrived
/// in brackets (`[...]`) or braces (`{...}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub text: String,
    pub optional: bool,
}

impl Argument {
    pub fn required(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            optional: false,
        }
    }

    pub fn optional(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            optional: true,
        }
    }
}

/// Match a parsed argument list against a parameter pattern.
///
/// Slots are filled by kind, not position alone: a required slot only ever
/// consumes a brace argument, an optional slot only ever consumes a bracket
/// argument (and resolves to `None` when the next parsed argument is not
/// one). The result always has exactly one entry per pattern slot.
///
/// Errors are returned as bare messages; the caller attaches source
/// positions.
pub fn resolve_args(
    name: &str,
    pattern: &ParamPattern,
    args: &[Argument],
) -> Result<Vec<Option<String>>, String> {
    if args.len() > pattern.len() {
        return Err(format!("Too many arguments provided to `\\{name}`"));
    }
    let mut resolved = Vec::with_capacity(pattern.len());
    let mut next = 0;
    for kind in pattern.slots() {
        match kind {
            ParamKind::Required => {
                if next < args.len() && !args[next].optional {
                    resolved.push(Some(args[next].text.clone()));
                    next += 1;
                } else if next >= args.len() {
                    return Err(format!("Missing required argument for `\\{name}`"));
                } else {
                    return Err(format!(
                        "Superfluous optional argument provided to `\\{name}`"
                    ));
                }
            }
            ParamKind::Optional => {
                if next < args.len() && args[next].optional {
                    resolved.push(Some(args[next].text.clone()));
                    next += 1;
                } else {
                    resolved.push(None);
                }
            }
        }
    }
    Ok(resolved)
}

/// Action invoked when a registered command's arguments have been resolved.
/// Receives one entry per pattern slot (`None` for absent optionals).
pub type CommandAction = Box<dyn Fn(&[Option<String>]) -> String + Send + Sync>;

/// Action invoked when a registered environment's body and arguments have
/// been collected. May fail (e.g. a code-execution environment whose run
/// exits nonzero); the message becomes a fatal translation error.
pub type EnvironmentAction =
    Box<dyn Fn(&mut EnvHooks<'_>, &str, &[Option<String>]) -> Result<String, String> + Send + Sync>;

/// Session hooks handed to environment actions.
///
/// Currently the only hook is artifact registration: an action that causes
/// files to be produced (a code run, say) records their paths here, and the
/// caller of `translate` gets the collected list back.
pub struct EnvHooks<'a> {
    pub(crate) artifacts: &'a mut Vec<PathBuf>,
}

impl EnvHooks<'_> {
    /// Record a file produced while translating this environment.
    pub fn register_artifact(&mut self, path: impl Into<PathBuf>) {
        self.artifacts.push(path.into());
    }
}

/// A registered command: a control sequence without a body.
pub struct Command {
    pub name: String,
    pub pattern: ParamPattern,
    /// When set, the command takes a single brace argument scanned verbatim:
    /// comments, escapes, and nested control sequences inside it are inert.
    pub raw_arg: bool,
    pub action: CommandAction,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        spec: &str,
        action: impl Fn(&[Option<String>]) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: ParamPattern::from_spec(spec),
            raw_arg: false,
            action: Box::new(action),
        }
    }

    pub fn raw(
        name: impl Into<String>,
        action: impl Fn(&[Option<String>]) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: ParamPattern::from_spec("!"),
            raw_arg: true,
            action: Box::new(action),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("pattern", &self.pattern.to_string())
            .field("raw_arg", &self.raw_arg)
            .finish_non_exhaustive()
    }
}

/// A registered environment: a control sequence that opens a body with a
/// trailing colon.
pub struct Environment {
    pub name: String,
    pub pattern: ParamPattern,
    /// Raw environments get their body verbatim: the translator interprets
    /// nothing inside them except the dedent that ends the block.
    pub raw: bool,
    pub action: EnvironmentAction,
}

impl Environment {
    pub fn new(
        name: impl Into<String>,
        spec: &str,
        action: impl Fn(&mut EnvHooks<'_>, &str, &[Option<String>]) -> Result<String, String>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: ParamPattern::from_spec(spec),
            raw: false,
            action: Box::new(action),
        }
    }

    pub fn raw(
        name: impl Into<String>,
        spec: &str,
        action: impl Fn(&mut EnvHooks<'_>, &str, &[Option<String>]) -> Result<String, String>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            raw: true,
            ..Self::new(name, spec, action)
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("name", &self.name)
            .field("pattern", &self.pattern.to_string())
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}
