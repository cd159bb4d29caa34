//! Read-only commands: list every macro, or show one.

use crate::cli::common::{trigger_arg, CliError, CliResult, GlobalArgs};
use crate::models::Macro;
use clap::Args;
use serde::Serialize;

/// List the macros currently loaded in the kernel
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show a single macro
#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    /// Trigger combination, e.g. "KEY_A KEY_B KEY_C"
    #[arg(short, long, value_name = "KEYS")]
    pub trigger: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct MacroListing<'a> {
    count: usize,
    macros: Vec<&'a Macro>,
}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let store = global.open_store()?;
        let macros = store.list_macros();

        if self.json {
            let listing = MacroListing {
                count: macros.len(),
                macros: macros.iter().collect(),
            };
            print_json(&listing)?;
            return Ok(());
        }

        if macros.is_empty() {
            println!("No macros loaded.");
            return Ok(());
        }

        for (index, entry) in macros.iter().enumerate() {
            println!("{:>2}. {}", index + 1, describe(entry));
        }
        println!("\n{} macro(s)", macros.len());
        Ok(())
    }
}

impl ShowArgs {
    /// Execute the show command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let store = global.open_store()?;
        let trigger = trigger_arg(&store, &self.trigger)?;
        let entry = store
            .get(&trigger)
            .ok_or_else(|| CliError::validation(format!("No macro with trigger '{trigger}'")))?;

        if self.json {
            return print_json(entry);
        }

        println!("Trigger: {}", entry.trigger);
        println!("Output:");
        for (slot, key) in entry.output.iter().enumerate() {
            println!("  [{slot}] {key} ({})", key.code());
        }
        if entry.output.is_empty() {
            println!("  (empty)");
        }
        Ok(())
    }
}

fn describe(entry: &Macro) -> String {
    let output: Vec<&str> = entry.output.iter().map(|k| k.name()).collect();
    format!("{} : {}", entry.trigger, output.join(" "))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
