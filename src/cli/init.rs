//! Init command implementation.
//!
//! Generates a `pretex.yaml` manifest, listing the directories where `.ptx`
//! sources were found.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::config::{find_sources, Manifest, MANIFEST_FILENAME};
use crate::error::{PretexError, Result};
use crate::output::{display_path, plural, Printer};

/// Initialize a pretex project by generating a pretex.yaml manifest
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing pretex.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let manifest_path = args.path.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !args.force {
        return Err(PretexError::Config {
            message: format!("{} already exists", MANIFEST_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    printer.status("Scanning", &display_path(&args.path));
    let sources = find_sources(&Manifest::default(), &args.path);

    // collect unique parent directories, relative to the project root
    let mut source_dirs = BTreeSet::new();
    for file in &sources {
        if let Some(parent) = file.parent() {
            let relative = parent.strip_prefix(&args.path).unwrap_or(parent);
            let dir = if relative == std::path::Path::new("") {
                ".".to_string()
            } else {
                format!("{}/", relative.display())
            };
            source_dirs.insert(dir);
        }
    }

    // build the YAML by hand for clean formatting
    let mut yaml = String::new();
    if !source_dirs.is_empty() && !(source_dirs.len() == 1 && source_dirs.contains(".")) {
        yaml.push_str("sources:\n");
        for dir in &source_dirs {
            yaml.push_str(&format!("  - \"{}\"\n", dir));
        }
    }
    yaml.push_str("output: build\n");
    yaml.push_str("runner: python3\n");
    yaml.push_str("duplicate_separator: literal\n");

    fs::write(&manifest_path, &yaml).map_err(|e| PretexError::Io {
        path: manifest_path.clone(),
        message: format!("Failed to write manifest: {}", e),
    })?;

    printer.success(
        "Created",
        &format!(
            "{} ({} found)",
            MANIFEST_FILENAME,
            plural(sources.len(), "source", "sources")
        ),
    );

    Ok(())
}
