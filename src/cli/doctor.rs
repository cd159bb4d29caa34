//! Doctor command for environment checking.

use crate::cli::common::{CliError, CliResult, GlobalArgs};
use crate::doctor::{CheckStatus, DoctorFormatter, EnvironmentChecker, OutputFormat};
use clap::Args;

/// Check the key definitions, kernel module and macro store
#[derive(Debug, Clone, Args)]
pub struct DoctorArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl DoctorArgs {
    /// Execute the doctor command
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        let config = global.config()?;
        let results = EnvironmentChecker::new(&config).check_all();

        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Terminal
        };
        println!("{}", DoctorFormatter::with_format(format).format_results(&results));

        if results.iter().any(|r| r.status == CheckStatus::Failed) {
            Err(CliError::validation("Some checks failed"))
        } else {
            Ok(())
        }
    }
}
