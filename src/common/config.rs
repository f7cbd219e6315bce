use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::format;
use crate::reader::DEFAULT_MAX_LINE_BYTES;

/// Global fileutil configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Line buffer capacity for `lines`
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,

    /// Skip TLS certificate verification on downloads
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Filesystem used when formatting virtual disks
    #[serde(default = "default_filesystem")]
    pub default_filesystem: String,

    /// Age threshold used by `sweep` when none is given (e.g. "24h", "7d")
    #[serde(default = "default_older_than")]
    pub default_older_than: String,
}

fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}
fn default_filesystem() -> String {
    crate::disk::BTRFS.to_string()
}
fn default_older_than() -> String {
    "24h".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_line_bytes: default_max_line_bytes(),
            accept_invalid_certs: false,
            default_filesystem: default_filesystem(),
            default_older_than: default_older_than(),
        }
    }
}

impl Config {
    /// Get the fileutil data directory (~/.fileutil)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".fileutil")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Load config from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Initialize the fileutil data directory
    pub fn init_dirs() -> Result<()> {
        let dir = Self::data_dir();
        crate::common::paths::create_folder(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        Ok(())
    }

    /// Parsed `default_older_than`
    pub fn default_age(&self) -> Result<Duration> {
        format::parse_age(&self.default_older_than)
            .with_context(|| format!("Invalid default_older_than: {}", self.default_older_than))
    }

    /// Apply a `config set <key> <value>` update
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "max_line_bytes" => self.max_line_bytes = value.parse()?,
            "accept_invalid_certs" => self.accept_invalid_certs = value.parse()?,
            "default_filesystem" => self.default_filesystem = value.to_string(),
            "default_older_than" => {
                format::parse_age(value)?;
                self.default_older_than = value.to_string();
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }
}
