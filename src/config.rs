//! Configuration management for ptdrain
//!
//! The recorder normally runs as root from a `systemd-sleep` hook, so the
//! configuration lives in `/etc/ptdrain/config.toml`. Every field has a
//! default and the file itself is optional.

use crate::drain_log::DEFAULT_LOG_FILE;
use crate::error::{ConfigError, Result};
use crate::power_supply::DEFAULT_POWER_SUPPLY_ROOT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative configuration file
pub const CONFIG_ENV: &str = "PTDRAIN_CONFIG";

/// ptdrain configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Record options
    #[serde(default)]
    pub record: RecordConfig,
}

/// Filesystem locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one subdirectory per power supply
    #[serde(default = "default_power_supply_root")]
    pub power_supply_root: PathBuf,
    /// CSV file records are appended to
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

/// Record options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Action label used when none is given on the command line
    #[serde(default = "default_action")]
    pub default_action: String,
}

// Default value functions
fn default_power_supply_root() -> PathBuf {
    PathBuf::from(DEFAULT_POWER_SUPPLY_ROOT)
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_action() -> String {
    "check".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            power_supply_root: default_power_supply_root(),
            log_file: default_log_file(),
        }
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            default_action: default_action(),
        }
    }
}

impl Config {
    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("/etc/ptdrain/config.toml")
    }

    /// Load configuration from `$PTDRAIN_CONFIG`, or the default path.
    ///
    /// A missing default file yields the built-in defaults; a file named
    /// by the environment variable must exist.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        let config_file = Self::default_path();
        if !config_file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(ConfigError::from)?;

        std::fs::write(path, contents).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
