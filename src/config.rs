//! Tool configuration
//!
//! Read from `~/.config/gentrie/config.json` unless a path is given.
//! Missing files fall back to defaults; unknown fields are rejected.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How command output is rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// zstd level used when writing trie files
    pub compression_level: i32,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Default output format
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            compression_level: 3,
            log_filter: "warn".to_string(),
            output: OutputFormat::Json,
        }
    }
}

impl Config {
    /// Default location (~/.config/gentrie/config.json)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?;
        Ok(config_dir.join("gentrie").join("config.json"))
    }

    /// Load from `path`, or defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.check()?;
        Ok(config)
    }

    /// Load from the given path, else the default location
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load(Self::default_path()?),
        }
    }

    fn check(&self) -> Result<()> {
        let levels = zstd::compression_level_range();
        if !levels.contains(&self.compression_level) {
            return Err(Error::Config(format!(
                "compression_level {} outside {:?}",
                self.compression_level, levels
            )));
        }
        Ok(())
    }
}
