//! Configuration management for bunsik.
//!
//! Loads configuration from ${BUNSIK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for bunsik configuration and data files.
    //!
    //! BUNSIK_HOME resolution order:
    //! 1. BUNSIK_HOME environment variable (if set)
    //! 2. ~/.config/bunsik (default)

    use std::env;
    use std::path::PathBuf;

    /// Returns the bunsik home directory.
    ///
    /// Checks BUNSIK_HOME env var first, falls back to ~/.config/bunsik
    pub fn bunsik_home() -> PathBuf {
        if let Ok(home) = env::var("BUNSIK_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("bunsik"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        bunsik_home().join("config.toml")
    }

    /// Returns the path to the append-only order log.
    pub fn orders_path() -> PathBuf {
        bunsik_home().join("orders.jsonl")
    }

    /// Returns the default ticket spool path.
    pub fn default_spool_path() -> PathBuf {
        bunsik_home().join("receipts.txt")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        bunsik_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Width of rendered ticket lines, in characters.
    pub receipt_width: u16,

    /// Ticket spool destination. Defaults to `${BUNSIK_HOME}/receipts.txt`.
    pub spool_path: Option<PathBuf>,

    /// Prompt for an order number on submit. When false, tickets are
    /// submitted immediately with no header.
    pub ask_order_number: bool,
}

impl Config {
    const DEFAULT_RECEIPT_WIDTH: u16 = 32;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Effective spool path, falling back to the home-relative default.
    pub fn effective_spool_path(&self) -> PathBuf {
        self.spool_path.clone().unwrap_or_else(paths::default_spool_path)
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            receipt_width: Self::DEFAULT_RECEIPT_WIDTH,
            spool_path: None,
            ask_order_number: true,
        }
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}
