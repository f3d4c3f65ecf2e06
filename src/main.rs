use clap::Parser;
use miette::Result;
use pretex::cli::{Cli, Commands};
use pretex::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Translate(args) => pretex::cli::translate::run(args, &printer)?,
        Commands::Check(args) => pretex::cli::check::run(args, &printer)?,
        Commands::Init(args) => pretex::cli::init::run(args, &printer)?,
        Commands::Completions(args) => pretex::cli::completions::run(args)?,
    }

    Ok(())
}
