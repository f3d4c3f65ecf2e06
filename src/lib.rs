//! pretex - indentation-structured LaTeX preprocessor
//!
//! A library for translating a whitespace-structured superset of LaTeX
//! (colon + indent instead of `\begin`/`\end` pairs, `===` between preamble
//! and body) into standard LaTeX consumable by an unmodified toolchain.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod position;
pub mod registry;
pub mod runner;
pub mod translator;

pub use config::{find_sources, Manifest, MANIFEST_FILENAME, SOURCE_EXTENSION};
pub use error::{PretexError, Result};
pub use position::{offset_to_location, Location};
pub use registry::{
    resolve_args, Argument, Command, EnvHooks, Environment, ParamKind, ParamPattern, Registry,
    RegistryBuilder,
};
pub use runner::{CodeRunner, ExecOutput, NoopRunner, ProcessRunner};
pub use translator::{
    translate, translate_with_options, SeparatorPolicy, TranslateOptions, Translation, Translator,
    Warning,
};
