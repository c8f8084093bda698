//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/address-book/config.toml)
//! 3. Environment variables (ADDRESS_BOOK_* prefix)
//!
//! Environment variables take precedence over config file values. Command-line
//! flags take precedence over both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::{DataSource, STDIO_ARG};

/// Environment variable prefix
const ENV_PREFIX: &str = "ADDRESS_BOOK";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Data file used when no `-` or `--datafile` argument is given
    #[serde(default)]
    pub datafile: Option<PathBuf>,

    /// Pretty-print the JSON document on save
    #[serde(default)]
    pub pretty: bool,

    /// Log filter overriding the level derived from `-v`/`-q`
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (ADDRESS_BOOK_DATAFILE, ADDRESS_BOOK_PRETTY, ADDRESS_BOOK_LOG)
    /// 2. Config file (~/.config/address-book/config.toml or ADDRESS_BOOK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(datafile) = std::env::var(format!("{}_DATAFILE", ENV_PREFIX)) {
            self.datafile = if datafile.is_empty() {
                None
            } else {
                Some(PathBuf::from(datafile))
            };
        }

        if let Ok(pretty) = std::env::var(format!("{}_PRETTY", ENV_PREFIX)) {
            self.pretty = pretty == "true" || pretty == "1";
        }

        if let Ok(level) = std::env::var(format!("{}_LOG", ENV_PREFIX)) {
            self.log_level = if level.is_empty() { None } else { Some(level) };
        }
    }

    /// Source to use when the command line does not name one
    ///
    /// Falls back to the standard streams. A configured `-` also selects them.
    pub fn default_source(&self) -> DataSource {
        match &self.datafile {
            Some(path) if path.as_os_str() == STDIO_ARG => DataSource::Stdio,
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Stdio,
        }
    }

    /// Get the config file path
    ///
    /// Can be overridden with ADDRESS_BOOK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("address-book")
            .join("config.toml")
    }
}
