//! Code-execution collaborator for `\exec` environments.
//!
//! The translator hands a raw environment body to a [`CodeRunner`] and
//! splices whatever text comes back. Everything about *how* the code runs —
//! interpreter choice, working directory, sandboxing, limits — lives behind
//! the trait; the translator only sees captured stdout or an error message.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Output of a code run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Captured standard output, spliced into the document in place of the
    /// environment.
    pub stdout: String,
    /// Files the run created, reported back to the caller as session
    /// artifacts.
    pub artifacts: Vec<PathBuf>,
}

/// Executes the body of a code environment.
///
/// Failures are reported as plain text (exit status, stderr, spawn error);
/// the translator turns them into fatal translation errors.
pub trait CodeRunner: Send + Sync {
    fn run(&self, source: &str) -> Result<ExecOutput, String>;
}

/// A runner that executes nothing and splices nothing.
///
/// Used by `check`, which must never run document code.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRunner;

impl CodeRunner for NoopRunner {
    fn run(&self, _source: &str) -> Result<ExecOutput, String> {
        Ok(ExecOutput::default())
    }
}

/// Pipes the body to an external interpreter and captures its stdout.
///
/// Files that appear in the working directory during the run are reported as
/// artifacts. No sandboxing is applied here; callers who need isolation
/// supply their own [`CodeRunner`].
pub struct ProcessRunner {
    program: String,
    workdir: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            workdir: PathBuf::from("."),
        }
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = dir.into();
        self
    }

    fn list_files(dir: &Path) -> BTreeSet<PathBuf> {
        let mut files = BTreeSet::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    files.insert(entry.path());
                }
            }
        }
        files
    }
}

impl CodeRunner for ProcessRunner {
    fn run(&self, source: &str) -> Result<ExecOutput, String> {
        let before = Self::list_files(&self.workdir);

        let mut child = Command::new(&self.program)
            .current_dir(&self.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to run `{}`: {}", self.program, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| format!("failed to send code to `{}`: {}", self.program, e))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| format!("failed to wait for `{}`: {}", self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim_end()
            ));
        }

        let after = Self::list_files(&self.workdir);
        let artifacts = after.difference(&before).cloned().collect();

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            artifacts,
        })
    }
}
