//! Commands that change the macro set.
//!
//! Every command here runs as one edit session: it opens the store from the
//! kernel file, applies a single change and commits it. The change reaches
//! the kernel before anything is reported as done.

use crate::cli::common::{split_keys, trigger_arg, CliError, CliResult, GlobalArgs};
use clap::Args;

/// Replace the output of an existing macro
#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// Trigger combination, e.g. "KEY_A KEY_B KEY_C"
    #[arg(short, long, value_name = "KEYS")]
    pub trigger: String,

    /// New output sequence; every key must appear an even number of times
    #[arg(short, long, value_name = "KEYS", allow_hyphen_values = true)]
    pub output: String,
}

/// Add a new macro
#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Trigger combination of three keys
    #[arg(short, long, value_name = "KEYS")]
    pub trigger: String,

    /// Output sequence; at least one press/release pair
    #[arg(short, long, value_name = "KEYS", allow_hyphen_values = true)]
    pub output: String,
}

/// Delete a macro
#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Trigger combination of the macro to delete
    #[arg(short, long, value_name = "KEYS")]
    pub trigger: String,
}

/// Append a press/release pair of the default key to a macro
#[derive(Debug, Clone, Args)]
pub struct AddSlotsArgs {
    /// Trigger combination of the macro to extend
    #[arg(short, long, value_name = "KEYS")]
    pub trigger: String,
}

/// Remove the last two output slots of a macro
#[derive(Debug, Clone, Args)]
pub struct RemoveSlotsArgs {
    /// Trigger combination of the macro to shorten
    #[arg(short, long, value_name = "KEYS")]
    pub trigger: String,
}

/// Change the keys in one or more output slots
///
/// Slots and keys pair up in order: `--slot 0 --key KEY_B --slot 1 --key KEY_B`.
#[derive(Debug, Clone, Args)]
pub struct RebindArgs {
    /// Trigger combination of the macro to edit
    #[arg(short, long, value_name = "KEYS")]
    pub trigger: String,

    /// Zero-based slot index (repeatable)
    #[arg(short, long = "slot", value_name = "N", required = true)]
    pub slots: Vec<usize>,

    /// Key to place in the matching slot (repeatable)
    #[arg(short, long = "key", value_name = "KEY", required = true)]
    pub keys: Vec<String>,
}

impl SetArgs {
    /// Execute the set command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let mut store = global.open_store()?;
        let trigger = trigger_arg(&store, &self.trigger)?;
        store.commit_edit(&trigger, &split_keys(&self.output))?;
        println!("✓ Updated macro {trigger}");
        Ok(())
    }
}

impl AddArgs {
    /// Execute the add command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let mut store = global.open_store()?;
        let trigger = trigger_arg(&store, &self.trigger)?;
        let shadowed = store.get(&trigger).is_some();

        store.add_macro(trigger.clone(), &split_keys(&self.output))?;
        println!("✓ Added macro {trigger}");
        if shadowed {
            println!("⚠ An earlier macro already uses this trigger and takes precedence");
        }
        Ok(())
    }
}

impl DeleteArgs {
    /// Execute the delete command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let mut store = global.open_store()?;
        let trigger = trigger_arg(&store, &self.trigger)?;
        store.delete_macro(&trigger)?;
        println!("✓ Deleted macro {trigger}");
        Ok(())
    }
}

impl AddSlotsArgs {
    /// Execute the add-slots command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let mut store = global.open_store()?;
        let trigger = trigger_arg(&store, &self.trigger)?;
        let len = store.add_output_slots(&trigger)?;
        store.commit_draft(&trigger)?;
        println!("✓ Macro {trigger} now has {len} output slots");
        Ok(())
    }
}

impl RemoveSlotsArgs {
    /// Execute the remove-slots command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let mut store = global.open_store()?;
        let trigger = trigger_arg(&store, &self.trigger)?;
        let len = store.remove_output_slots(&trigger)?;
        store.commit_draft(&trigger)?;
        println!("✓ Macro {trigger} now has {len} output slots");
        Ok(())
    }
}

impl RebindArgs {
    /// Execute the rebind command
    ///
    /// Changing one slot alone always leaves two keys unbalanced, so the
    /// rebinds are applied to one draft and committed together.
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        if self.slots.len() != self.keys.len() {
            return Err(CliError::validation(format!(
                "Got {} --slot values but {} --key values",
                self.slots.len(),
                self.keys.len()
            )));
        }

        let mut store = global.open_store()?;
        let trigger = trigger_arg(&store, &self.trigger)?;
        for (slot, key) in self.slots.iter().zip(&self.keys) {
            store.rebind_slot(&trigger, *slot, key)?;
        }
        store.commit_draft(&trigger)?;

        for (slot, key) in self.slots.iter().zip(&self.keys) {
            println!("✓ Slot {slot} of macro {trigger} is now {key}");
        }
        Ok(())
    }
}
