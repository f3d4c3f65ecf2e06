//! Project manifest (pretex.yaml) parsing and source discovery.
//!
//! The manifest defines project configuration: where sources live, where
//! translated output goes, which interpreter backs `\exec`, and how a
//! repeated document separator is handled.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{PretexError, Result};
use crate::translator::SeparatorPolicy;

/// Manifest file name looked up in the project root.
pub const MANIFEST_FILENAME: &str = "pretex.yaml";

/// Extension of translatable source files.
pub const SOURCE_EXTENSION: &str = "ptx";

/// Project manifest loaded from pretex.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Source directories to scan for `.ptx` files.
    /// Defaults to the current directory if empty.
    pub sources: Vec<String>,

    /// Output directory for translated `.tex` files.
    pub output: PathBuf,

    /// Interpreter that backs the `\exec` environment.
    pub runner: String,

    /// What a second `===` separator inside the document body means.
    pub duplicate_separator: SeparatorPolicy,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            output: default_output(),
            runner: default_runner(),
            duplicate_separator: SeparatorPolicy::default(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("build")
}

fn default_runner() -> String {
    "python3".to_string()
}

impl Manifest {
    /// Load a manifest from a pretex.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PretexError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Load the manifest from `dir` if one exists there, defaults otherwise.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILENAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a manifest from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| PretexError::Config {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check pretex.yaml syntax".to_string()),
        })
    }

    /// Get effective source paths, defaulting to the current directory.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }
}

/// Recursively collect `.ptx` files under the manifest's source paths,
/// resolved against `root`. Results are sorted for stable output.
pub fn find_sources(manifest: &Manifest, root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for source in manifest.effective_sources() {
        let base = root.join(&source);
        for entry in WalkDir::new(&base).into_iter().flatten() {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION) {
                files.push(path.to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    files
}
