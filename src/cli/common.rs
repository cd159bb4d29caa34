//! Shared plumbing for CLI commands: error type, exit codes and the
//! global path overrides.

use crate::config::Config;
use crate::error::MacroError;
use crate::key_catalog::KeyCatalog;
use crate::models::Trigger;
use crate::parser::parse_trigger;
use crate::services::MacroStore;
use clap::Args;
use std::fmt;
use std::path::PathBuf;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Input was rejected (bad key, unbalanced output, unknown trigger...)
    ValidationError = 1,
    /// A file could not be read or written
    IoError = 2,
}

impl ExitCode {
    /// Numeric code for `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by CLI commands.
#[derive(Debug)]
pub struct CliError {
    /// Exit code the process should end with
    pub code: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// An I/O failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::IoError,
            message: message.into(),
        }
    }

    /// A rejected input (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::ValidationError,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<MacroError> for CliError {
    fn from(err: MacroError) -> Self {
        if err.is_validation() {
            Self::validation(err.to_string())
        } else {
            Self::io(err.to_string())
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Path overrides accepted by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Kernel control file (default: /proc/keymac_proc)
    #[arg(long, global = true, value_name = "FILE")]
    pub kernel_file: Option<PathBuf>,

    /// Durable macro store
    #[arg(long, global = true, value_name = "FILE")]
    pub store_file: Option<PathBuf>,

    /// Header with KEY_* definitions
    #[arg(long, global = true, value_name = "FILE")]
    pub key_catalog: Option<PathBuf>,
}

impl GlobalArgs {
    /// Loads the configuration and applies the command-line overrides.
    pub fn config(&self) -> CliResult<Config> {
        let mut config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if let Some(path) = &self.kernel_file {
            config.paths.kernel_file.clone_from(path);
        }
        if let Some(path) = &self.store_file {
            config.paths.store_file.clone_from(path);
        }
        if let Some(path) = &self.key_catalog {
            config.paths.key_catalog.clone_from(path);
        }
        Ok(config)
    }

    /// Loads the key catalog named by the configuration.
    pub fn catalog(&self) -> CliResult<KeyCatalog> {
        Ok(KeyCatalog::load_or_builtin(&self.config()?.paths.key_catalog))
    }

    /// Opens a macro store synced with the kernel control file.
    pub fn open_store(&self) -> CliResult<MacroStore> {
        let config = self.config()?;
        let catalog = KeyCatalog::load_or_builtin(&config.paths.key_catalog);
        Ok(MacroStore::from_config(&config, catalog)?)
    }
}

/// Splits a whitespace-separated list of keys.
pub fn split_keys(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Parses a `--trigger` argument against the store's catalog.
pub fn trigger_arg(store: &MacroStore, text: &str) -> CliResult<Trigger> {
    Ok(parse_trigger(text, store.catalog())?)
}
