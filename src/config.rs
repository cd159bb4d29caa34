//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_KERNEL_FILE, DEFAULT_KEY_CATALOG, DEFAULT_SLOT_KEY,
    DEFAULT_STORE_FILE_NAME, KERNEL_MAX_MACROS, KERNEL_MAX_PAYLOAD_BYTES,
};
use crate::parser::Notation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Kernel-facing control file (e.g., "/proc/keymac_proc")
    pub kernel_file: PathBuf,
    /// Durable macro store written by `store` and read by `reload`
    pub store_file: PathBuf,
    /// Header with `#define KEY_*` definitions
    pub key_catalog: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        let store_file = Config::config_dir()
            .map(|dir| dir.join(DEFAULT_STORE_FILE_NAME))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_FILE_NAME));

        Self {
            kernel_file: PathBuf::from(DEFAULT_KERNEL_FILE),
            store_file,
            key_catalog: PathBuf::from(DEFAULT_KEY_CATALOG),
        }
    }
}

/// Editing preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Key written into newly added output slots
    #[serde(default = "default_slot_key")]
    pub default_slot_key: String,
    /// How keys are spelled in the durable store
    #[serde(default)]
    pub store_notation: Notation,
}

fn default_slot_key() -> String {
    DEFAULT_SLOT_KEY.to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_slot_key: default_slot_key(),
            store_notation: Notation::default(),
        }
    }
}

/// Limits of the kernel module's macro table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Maximum number of macros the module holds
    #[serde(default = "default_max_macros")]
    pub max_macros: usize,
    /// Maximum size of one write to the control file
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

const fn default_max_macros() -> usize {
    KERNEL_MAX_MACROS
}

const fn default_max_payload_bytes() -> usize {
    KERNEL_MAX_PAYLOAD_BYTES
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_macros: default_max_macros(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/keymac/config.toml`
/// - macOS: `~/Library/Application Support/keymac/config.toml`
/// - `$KEYMAC_CONFIG_DIR/config.toml` when the variable is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Editing preferences
    #[serde(default)]
    pub editor: EditorConfig,
    /// Kernel module limits
    #[serde(default)]
    pub kernel: KernelConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the config directory path.
    ///
    /// `KEYMAC_CONFIG_DIR` wins over the platform directory.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to an explicit path.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - `default_slot_key` is a single non-empty token
    /// - kernel limits are non-zero
    /// - paths are not empty
    pub fn validate(&self) -> Result<()> {
        let slot_key = &self.editor.default_slot_key;
        if slot_key.is_empty() || slot_key.split_whitespace().count() != 1 {
            anyhow::bail!("default_slot_key must be a single key name, got '{slot_key}'");
        }

        if self.kernel.max_macros == 0 {
            anyhow::bail!("kernel.max_macros must be at least 1");
        }

        if self.kernel.max_payload_bytes == 0 {
            anyhow::bail!("kernel.max_payload_bytes must be at least 1");
        }

        for (name, path) in [
            ("kernel_file", &self.paths.kernel_file),
            ("store_file", &self.paths.store_file),
            ("key_catalog", &self.paths.key_catalog),
        ] {
            if path.as_os_str().is_empty() {
                anyhow::bail!("paths.{name} cannot be empty");
            }
        }

        Ok(())
    }
}
