//! Key catalog lookup.

use crate::cli::common::{CliResult, GlobalArgs};
use crate::cli::list::print_json;
use crate::models::Key;
use clap::Args;
use serde::Serialize;

/// List or search the keys that can be used in macros
#[derive(Debug, Clone, Args)]
pub struct KeysArgs {
    /// Search term (matches names with or without the KEY_ prefix)
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Maximum number of results
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct KeyEntry {
    name: String,
    code: u16,
}

impl From<&Key> for KeyEntry {
    fn from(key: &Key) -> Self {
        Self {
            name: key.name().to_string(),
            code: key.code(),
        }
    }
}

impl KeysArgs {
    /// Execute the keys command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let catalog = global.catalog()?;
        let mut keys: Vec<Key> = match &self.query {
            Some(query) => catalog.search(query),
            None => catalog.keys().collect(),
        };
        if let Some(limit) = self.limit {
            keys.truncate(limit);
        }

        if self.json {
            let entries: Vec<KeyEntry> = keys.iter().map(KeyEntry::from).collect();
            return print_json(&entries);
        }

        if keys.is_empty() {
            println!("No matching keys.");
            return Ok(());
        }
        for key in &keys {
            println!("{:<24} {:>4}", key.name(), key.code());
        }
        Ok(())
    }
}
