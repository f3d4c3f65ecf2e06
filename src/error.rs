use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pretex operations
#[derive(Error, Diagnostic, Debug)]
pub enum PretexError {
    #[error("IO error: {0}")]
    #[diagnostic(code(pretex::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(pretex::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    /// A fatal translation failure. `offset` is the byte offset into the
    /// normalized source at which the problem was detected; translation of
    /// the whole document is abandoned.
    #[error("{message}")]
    #[diagnostic(code(pretex::translate))]
    Translate {
        message: String,
        offset: usize,
        #[help]
        help: Option<String>,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(pretex::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Check failed: {message}")]
    #[diagnostic(code(pretex::check))]
    Check {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, PretexError>;
