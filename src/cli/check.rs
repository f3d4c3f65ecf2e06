//! Check command implementation.
//!
//! Parses sources and reports diagnostics without writing any output.
//! `\exec` environments are parsed but never executed.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::config::Manifest;
use crate::error::{PretexError, Result};
use crate::output::{display_path, plural, Printer};
use crate::position::offset_to_location;
use crate::registry::Registry;
use crate::runner::NoopRunner;
use crate::translator::{translate_with_options, TranslateOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckFormat {
    Text,
    Json,
}

/// Parse sources and report diagnostics without writing output
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format (diagnostics go to stdout as JSON)
    #[arg(long, value_enum, default_value = "text")]
    pub format: CheckFormat,
}

/// One file's check result, JSON-serializable for tooling.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    warnings: Vec<String>,
}

pub fn run(args: CheckArgs, printer: &Printer) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let manifest = Manifest::load_or_default(&cwd)?;
    // never execute document code from `check`
    let registry = Registry::builtin_with_runner(Arc::new(NoopRunner));
    let options = TranslateOptions {
        duplicate_separator: manifest.duplicate_separator,
    };

    let mut reports = Vec::new();
    for file in &args.files {
        let display = display_path(file);
        let source = fs::read_to_string(file).map_err(|e| PretexError::Io {
            path: file.clone(),
            message: format!("Failed to read file: {}", e),
        })?;

        let report = match translate_with_options(&source, &registry, options) {
            Ok(translation) => FileReport {
                file: display,
                ok: true,
                error: None,
                warnings: translation
                    .warnings
                    .iter()
                    .map(|w| {
                        format!("{}: {}", offset_to_location(&source, w.offset), w.message)
                    })
                    .collect(),
            },
            Err(PretexError::Translate { message, offset, .. }) => FileReport {
                file: display,
                ok: false,
                error: Some(format!(
                    "{}: {}",
                    offset_to_location(&source, offset),
                    message
                )),
                warnings: vec![],
            },
            Err(other) => return Err(other),
        };
        reports.push(report);
    }

    match args.format {
        CheckFormat::Json => {
            let json = serde_json::to_string_pretty(&reports).map_err(|e| PretexError::Check {
                message: format!("Failed to serialize report: {}", e),
                help: None,
            })?;
            println!("{json}");
        }
        CheckFormat::Text => {
            for report in &reports {
                if let Some(error) = &report.error {
                    printer.error("error", &format!("{}: {}", report.file, error));
                }
                for warning in &report.warnings {
                    printer.warning("warning", &format!("{}: {}", report.file, warning));
                }
                if report.ok && report.warnings.is_empty() {
                    printer.status("Checked", &report.file);
                }
            }
        }
    }

    let failed = reports.iter().filter(|r| !r.ok).count();
    if failed > 0 {
        return Err(PretexError::Check {
            message: format!("{} of {} invalid", plural(failed, "file", "files"), reports.len()),
            help: None,
        });
    }
    Ok(())
}
