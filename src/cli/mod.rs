pub mod check;
pub mod completions;
pub mod init;
pub mod translate;

use clap::{Parser, Subcommand};

/// pretex - indentation-structured LaTeX preprocessor
#[derive(Parser, Debug)]
#[command(name = "pretex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate .ptx sources into standard LaTeX
    Translate(translate::TranslateArgs),

    /// Parse sources and report diagnostics without writing output
    Check(check::CheckArgs),

    /// Initialize a pretex project (generates pretex.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
