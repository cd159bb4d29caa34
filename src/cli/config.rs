//! Configuration management CLI commands.

use crate::cli::common::{CliError, CliResult};
use crate::cli::list::print_json;
use crate::config::Config;
use crate::constants::APP_BINARY_NAME;
use crate::parser::Notation;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Kernel control file
    #[arg(long, value_name = "FILE")]
    kernel_path: Option<PathBuf>,

    /// Durable macro store
    #[arg(long, value_name = "FILE")]
    store_path: Option<PathBuf>,

    /// Header with KEY_* definitions
    #[arg(long, value_name = "FILE")]
    catalog_path: Option<PathBuf>,

    /// Key placed in new output slots
    #[arg(long, value_name = "KEY")]
    slot_key: Option<String>,

    /// Key notation in the store file (code or name)
    #[arg(long, value_name = "NOTATION")]
    notation: Option<String>,

    /// Maximum number of macros the kernel module holds
    #[arg(long, value_name = "N")]
    max_macros: Option<usize>,

    /// Size of the kernel control buffer in bytes
    #[arg(long, value_name = "BYTES")]
    max_payload: Option<usize>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            return print_json(&config);
        }

        println!("Paths:");
        println!("  kernel_file:       {}", config.paths.kernel_file.display());
        println!("  store_file:        {}", config.paths.store_file.display());
        println!("  key_catalog:       {}", config.paths.key_catalog.display());
        println!("Editor:");
        println!("  default_slot_key:  {}", config.editor.default_slot_key);
        println!("  store_notation:    {}", config.editor.store_notation);
        println!("Kernel:");
        println!("  max_macros:        {}", config.kernel.max_macros);
        println!("  max_payload_bytes: {}", config.kernel.max_payload_bytes);
        Ok(())
    }
}

impl ConfigSetArgs {
    fn is_empty(&self) -> bool {
        self.kernel_path.is_none()
            && self.store_path.is_none()
            && self.catalog_path.is_none()
            && self.slot_key.is_none()
            && self.notation.is_none()
            && self.max_macros.is_none()
            && self.max_payload.is_none()
    }

    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.is_empty() {
            return Err(CliError::validation(format!(
                "At least one configuration option must be specified (see '{APP_BINARY_NAME} config set --help')"
            )));
        }

        let mut config = Config::load().unwrap_or_default();

        if let Some(path) = &self.kernel_path {
            config.paths.kernel_file.clone_from(path);
        }
        if let Some(path) = &self.store_path {
            config.paths.store_file.clone_from(path);
        }
        if let Some(path) = &self.catalog_path {
            if !path.is_file() {
                return Err(CliError::validation(format!(
                    "Key definitions file does not exist: {}",
                    path.display()
                )));
            }
            config.paths.key_catalog.clone_from(path);
        }
        if let Some(key) = &self.slot_key {
            config.editor.default_slot_key.clone_from(key);
        }
        if let Some(notation) = &self.notation {
            config.editor.store_notation = notation
                .parse::<Notation>()
                .map_err(CliError::validation)?;
        }
        if let Some(max) = self.max_macros {
            config.kernel.max_macros = max;
        }
        if let Some(max) = self.max_payload {
            config.kernel.max_payload_bytes = max;
        }

        config.validate().map_err(|e| CliError::validation(e.to_string()))?;
        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");
        Ok(())
    }
}
