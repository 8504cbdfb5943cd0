use crate::regression::{CompareOptions, SCHEMA_VALIDATION_ASSERTION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Where the baseline snapshot lives
    pub baseline_path: PathBuf,

    /// Where to persist the comparison summary, if anywhere
    pub summary_path: Option<PathBuf>,

    /// Assertion whose pass-to-fail flip is always a regression
    pub schema_assertion_name: String,

    /// Maximum body nesting inspected by the structural diff
    pub max_diff_depth: usize,

    /// Fail the run when a previously passing test disappears
    pub fail_on_removed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baseline_path: PathBuf::from(".nexus/baseline.json"),
            summary_path: None,
            schema_assertion_name: SCHEMA_VALIDATION_ASSERTION.to_string(),
            max_diff_depth: 64,
            fail_on_removed: false,
        }
    }
}

impl Config {
    /// Load from a YAML file. Keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }

    fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            schema_assertion_name: self.schema_assertion_name.clone(),
            max_diff_depth: self.max_diff_depth,
        }
    }
}
