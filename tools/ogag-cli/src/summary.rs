//! GitHub Actions step summary.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Markdown appended to the file named by `GITHUB_STEP_SUMMARY`.
#[derive(Debug, Clone)]
pub struct StepSummary {
    path: PathBuf,
}

impl StepSummary {
    pub const ENV: &'static str = "GITHUB_STEP_SUMMARY";

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `None` outside CI or when the variable is empty.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(Self::ENV)
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a section followed by a blank line.
    pub fn append(&self, markdown: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open step summary: {}", self.path.display()))?;
        write!(file, "{}\n\n", markdown)
            .with_context(|| format!("Failed to write step summary: {}", self.path.display()))
    }
}
