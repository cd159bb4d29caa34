//! Offline check of a macro file.

use crate::cli::common::{CliError, CliResult, GlobalArgs};
use crate::cli::list::print_json;
use crate::validator::{MacroValidator, Severity};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Check a macro file for errors and warnings without touching the kernel
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Macro file to check (defaults to the configured store file)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct ValidationResponse {
    valid: bool,
    macros: usize,
    issues: Vec<ValidationMessage>,
}

#[derive(Debug, Serialize)]
struct ValidationMessage {
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    message: String,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let config = global.config()?;
        let path = self
            .file
            .clone()
            .unwrap_or_else(|| config.paths.store_file.clone());

        let content = std::fs::read_to_string(&path)
            .map_err(|e| CliError::io(format!("Failed to read {}: {e}", path.display())))?;

        let catalog = global.catalog()?;
        let report = MacroValidator::new(&catalog, &config.kernel).validate_text(&content);

        if self.json {
            let response = ValidationResponse {
                valid: report.is_valid(),
                macros: report.macro_count,
                issues: report
                    .issues
                    .iter()
                    .map(|issue| ValidationMessage {
                        severity: match issue.severity {
                            Severity::Error => "error",
                            Severity::Warning => "warning",
                        },
                        line: issue.line,
                        message: issue.message.clone(),
                    })
                    .collect(),
            };
            print_json(&response)?;
        } else {
            if report.is_valid() {
                println!("✓ Validation passed ({} macros)", report.macro_count);
            } else {
                println!("✗ Validation failed");
            }
            if !report.issues.is_empty() {
                println!("\nIssues:");
                print!("{}", report.format_message());
            }
        }

        if !report.is_valid() {
            return Err(CliError::validation("Validation failed"));
        }
        if self.strict && report.has_warnings() {
            return Err(CliError::validation("Warnings found in strict mode"));
        }
        Ok(())
    }
}
