//! Commands that move macros between the kernel and the durable store.

use crate::cli::common::{CliResult, GlobalArgs};
use clap::Args;

/// Save the kernel's macros to the durable store
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {}

/// Load the durable store and push it to the kernel
#[derive(Debug, Clone, Args)]
pub struct ReloadArgs {}

impl StoreArgs {
    /// Execute the store command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let store = global.open_store()?;
        store.store_to_disk()?;
        println!(
            "✓ Stored {} macro(s) to {}",
            store.list_macros().len(),
            store.sync_channel().store_file().display()
        );
        Ok(())
    }
}

impl ReloadArgs {
    /// Execute the reload command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let mut store = global.open_store()?;
        store.reload_from_disk()?;
        println!(
            "✓ Loaded {} macro(s) from {}",
            store.list_macros().len(),
            store.sync_channel().store_file().display()
        );
        Ok(())
    }
}
