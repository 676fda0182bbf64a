//! Loader for `.toml-doc.yml` settings files.
//!
//! Format:
//! ```yaml
//! strict: true
//! show_all: false
//! recursive: true
//! format: json
//! files:
//!   - pyproject.toml
//!   - config/
//! exclude:
//!   - "target/**"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TomlDocError};

/// Name of the settings file looked up in the working directory
pub const CONFIG_FILENAME: &str = ".toml-doc.yml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Treat rule violations as errors
    pub strict: bool,

    /// List undocumented items too
    pub show_all: bool,

    /// Descend into the full subtree instead of direct children only
    pub recursive: bool,

    pub format: OutputFormat,

    /// Files or directories linted when none are given on the command line
    pub files: Vec<PathBuf>,

    /// Glob patterns skipped while walking directories
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            show_all: false,
            recursive: true,
            format: OutputFormat::Text,
            files: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

/// Command-line values; `None` keeps what the settings file says.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub strict: Option<bool>,
    pub show_all: Option<bool>,
    pub recursive: Option<bool>,
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Applies command-line values on top of the file values. Flags win in
    /// both directions.
    pub fn merge(&self, overrides: ConfigOverrides) -> Self {
        Self {
            strict: overrides.strict.unwrap_or(self.strict),
            show_all: overrides.show_all.unwrap_or(self.show_all),
            recursive: overrides.recursive.unwrap_or(self.recursive),
            format: overrides.format.unwrap_or(self.format),
            files: self.files.clone(),
            exclude: self.exclude.clone(),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| TomlDocError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)
            .map_err(|e| TomlDocError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `explicit` if given, otherwise `dir/.toml-doc.yml` when present.
    pub fn discover(dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
