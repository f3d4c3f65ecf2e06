//! Translate command implementation.
//!
//! Reads `.ptx` sources, runs each through one translation session, and
//! writes the rendered `.tex` next to the chosen output location. With
//! `--watch`, stays alive and re-translates files as they change.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use clap::Args;

use crate::config::{find_sources, Manifest};
use crate::error::{PretexError, Result};
use crate::output::{display_path, plural, Printer};
use crate::position::{excerpt, offset_to_location};
use crate::registry::Registry;
use crate::runner::ProcessRunner;
use crate::translator::{translate_with_options, TranslateOptions, Translation};

/// Translate .ptx sources into standard LaTeX
#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Input files (defaults to the manifest's sources)
    pub files: Vec<PathBuf>,

    /// Output directory (defaults to each input's directory, or the
    /// manifest's `output` when a manifest is present)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Explicit output file (single input only)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Interpreter backing the \exec environment
    #[arg(long)]
    pub runner: Option<String>,

    /// Watch inputs and re-translate on change
    #[arg(long)]
    pub watch: bool,
}

pub fn run(args: TranslateArgs, printer: &Printer) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let manifest_exists = cwd.join(crate::config::MANIFEST_FILENAME).exists();
    let manifest = Manifest::load_or_default(&cwd)?;

    let files = if args.files.is_empty() {
        find_sources(&manifest, &cwd)
    } else {
        args.files.clone()
    };
    if files.is_empty() {
        return Err(PretexError::Config {
            message: "No input files".to_string(),
            help: Some("Pass files explicitly or list sources in pretex.yaml".to_string()),
        });
    }
    if args.out.is_some() && files.len() > 1 {
        return Err(PretexError::Config {
            message: "--out only applies to a single input file".to_string(),
            help: Some("Use --output <dir> for multiple files".to_string()),
        });
    }

    let runner = args
        .runner
        .clone()
        .unwrap_or_else(|| manifest.runner.clone());
    let registry = Registry::builtin_with_runner(Arc::new(ProcessRunner::new(runner)));
    let options = TranslateOptions {
        duplicate_separator: manifest.duplicate_separator,
    };

    // an explicit --output wins; a manifest's output applies project-wide
    let output_dir = args
        .output
        .clone()
        .or_else(|| manifest_exists.then(|| manifest.output.clone()));

    let mut written = 0;
    for file in &files {
        let target = output_path(file, args.out.as_deref(), output_dir.as_deref());
        translate_file(file, &target, &registry, options, printer)?;
        written += 1;
    }
    printer.success("Finished", &plural(written, "file", "files"));

    if args.watch {
        watch(&files, args.out.as_deref(), output_dir.as_deref(), &registry, options, printer)?;
    }

    Ok(())
}

/// Pick the output path: explicit --out, else `<dir>/<stem>.tex`.
fn output_path(input: &Path, out: Option<&Path>, output_dir: Option<&Path>) -> PathBuf {
    if let Some(out) = out {
        return out.to_path_buf();
    }
    let stem = input.file_stem().unwrap_or_default();
    let mut name = PathBuf::from(stem);
    name.set_extension("tex");
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.parent().unwrap_or(Path::new(".")).join(name),
    }
}

fn translate_file(
    input: &Path,
    target: &Path,
    registry: &Registry,
    options: TranslateOptions,
    printer: &Printer,
) -> Result<()> {
    printer.status("Translating", &display_path(input));

    let source = fs::read_to_string(input).map_err(|e| PretexError::Io {
        path: input.to_path_buf(),
        message: format!("Failed to read file: {}", e),
    })?;

    let translation =
        translate_with_options(&source, registry, options).map_err(|e| at_location(e, &source, input))?;

    report_session(&translation, printer);

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| PretexError::Io {
                path: parent.to_path_buf(),
                message: format!("Failed to create output directory: {}", e),
            })?;
        }
    }
    fs::write(target, &translation.text).map_err(|e| PretexError::Io {
        path: target.to_path_buf(),
        message: format!("Failed to write output: {}", e),
    })?;
    printer.status("Wrote", &display_path(target));

    Ok(())
}

fn report_session(translation: &Translation, printer: &Printer) {
    for warning in &translation.warnings {
        printer.warning("warning", &warning.message);
    }
    if !translation.artifacts.is_empty() {
        printer.info(
            "Generated",
            &plural(translation.artifacts.len(), "artifact", "artifacts"),
        );
    }
}

/// Attach file, line:column, and a source excerpt to a translation error.
fn at_location(error: PretexError, source: &str, input: &Path) -> PretexError {
    match error {
        PretexError::Translate { message, offset, help } => {
            let location = offset_to_location(source, offset);
            let peek = excerpt(source, offset, 40);
            PretexError::Translate {
                message: format!("{}:{}: {}", display_path(input), location, message),
                offset,
                help: help.or_else(|| {
                    (!peek.is_empty()).then(|| format!("near `{peek}`"))
                }),
            }
        }
        other => other,
    }
}

/// Re-translate files as they change. Blocks until interrupted.
fn watch(
    files: &[PathBuf],
    out: Option<&Path>,
    output_dir: Option<&Path>,
    registry: &Registry,
    options: TranslateOptions,
    printer: &Printer,
) -> Result<()> {
    use notify::{RecursiveMode, Watcher};

    let watched: Vec<PathBuf> = files
        .iter()
        .map(|f| f.canonicalize().unwrap_or_else(|_| f.clone()))
        .collect();

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |event| {
        let _ = tx.send(event);
    })
    .map_err(|e| PretexError::Config {
        message: format!("Failed to start watcher: {}", e),
        help: None,
    })?;

    let mut dirs: Vec<&Path> = watched
        .iter()
        .filter_map(|f| f.parent())
        .collect();
    dirs.sort();
    dirs.dedup();
    for dir in dirs {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| PretexError::Config {
                message: format!("Failed to watch {}: {}", dir.display(), e),
                help: None,
            })?;
    }

    printer.info("Watching", &plural(watched.len(), "file", "files"));
    loop {
        let event = match rx.recv() {
            Ok(Ok(event)) => event,
            Ok(Err(_)) | Err(_) => continue,
        };
        if !event.kind.is_modify() && !event.kind.is_create() {
            continue;
        }
        // editors often fire bursts of events; let them settle
        std::thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}

        for (index, file) in watched.iter().enumerate() {
            if event.paths.iter().any(|p| p == file) {
                let target = output_path(&files[index], out, output_dir);
                if let Err(error) = translate_file(&files[index], &target, registry, options, printer)
                {
                    printer.error("error", &error.to_string());
                }
            }
        }
    }
}
