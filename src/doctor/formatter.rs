//! Output formatting for environment check results.
//!
//! Terminal output uses ✓/✗/⚠ indicators with dot-padded names and a
//! summary; JSON output is meant for scripts.

use crate::constants::{APP_BINARY_NAME, APP_NAME};
use crate::doctor::{CheckResult, CheckStatus};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Output format for doctor results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Terminal,
    /// Machine-readable JSON output
    Json,
}

/// JSON output structure for doctor results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Overall health status
    pub status: String,
    /// Number of passing checks
    pub passed: usize,
    /// Number of failed checks
    pub failed: usize,
    /// Number of warnings
    pub warnings: usize,
    /// Individual check results
    pub checks: Vec<JsonCheck>,
}

/// JSON representation of a single check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCheck {
    /// Component name
    pub name: String,
    /// Status (ok, failed, warning)
    pub status: String,
    /// Short detail for passing checks
    pub detail: Option<String>,
    /// Status message
    pub message: String,
    /// Suggested fix
    pub hint: Option<String>,
}

/// Formatter for environment check results.
pub struct DoctorFormatter {
    format: OutputFormat,
}

struct Counts {
    passed: usize,
    failed: usize,
    warnings: usize,
}

fn count(results: &[CheckResult]) -> Counts {
    let of = |status: CheckStatus| results.iter().filter(|r| r.status == status).count();
    Counts {
        passed: of(CheckStatus::Ok),
        failed: of(CheckStatus::Failed),
        warnings: of(CheckStatus::Warning),
    }
}

impl DoctorFormatter {
    /// Creates a formatter with terminal output.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            format: OutputFormat::Terminal,
        }
    }

    /// Creates a formatter with the given output format.
    #[must_use]
    pub const fn with_format(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats check results for display or parsing.
    #[must_use]
    pub fn format_results(&self, results: &[CheckResult]) -> String {
        match self.format {
            OutputFormat::Terminal => Self::format_terminal(results),
            OutputFormat::Json => Self::format_json(results),
        }
    }

    fn format_terminal(results: &[CheckResult]) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "{APP_NAME} Environment Status");
        output.push_str("═════════════════════════\n\n");

        let counts = count(results);

        for result in results {
            let (symbol, status_text) = match result.status {
                CheckStatus::Ok => ("✓", "OK"),
                CheckStatus::Failed => ("✗", "FAILED"),
                CheckStatus::Warning => ("⚠", "WARNING"),
            };

            // ✓ Kernel module ....... OK (3 macros loaded)
            let name_width: usize = 20;
            let dots = ".".repeat(name_width.saturating_sub(result.name.len()));
            let _ = write!(output, "{symbol} {} {dots} {status_text}", result.name);
            if let Some(detail) = &result.detail {
                let _ = write!(output, " ({detail})");
            }
            output.push('\n');

            if result.status != CheckStatus::Ok {
                for line in result.message.lines() {
                    let _ = writeln!(output, "    {line}");
                }
                if let Some(hint) = &result.hint {
                    let _ = writeln!(output, "    Fix: {hint}");
                }
            }
            output.push('\n');
        }

        output.push_str("─────────────────────────\n");
        let _ = write!(output, "Summary: {} passed", counts.passed);
        if counts.failed > 0 {
            let _ = write!(output, ", {} failed", counts.failed);
        }
        if counts.warnings > 0 {
            let _ = write!(output, ", {} warnings", counts.warnings);
        }
        output.push('\n');

        if counts.failed == 0 && counts.warnings == 0 {
            output.push_str("\n✓ Ready to edit macros\n");
        } else if counts.failed > 0 {
            output.push_str("\n✗ Macro editing is not available\n");
            let _ = writeln!(
                output,
                "  Fix the problems above and run '{APP_BINARY_NAME} doctor' again."
            );
        } else {
            output.push_str("\n⚠ Macro editing is available with warnings\n");
        }

        output
    }

    fn format_json(results: &[CheckResult]) -> String {
        let counts = count(results);
        let status = if counts.failed > 0 {
            "failed"
        } else if counts.warnings > 0 {
            "warnings"
        } else {
            "ready"
        };

        let checks = results
            .iter()
            .map(|r| JsonCheck {
                name: r.name.clone(),
                status: match r.status {
                    CheckStatus::Ok => "ok",
                    CheckStatus::Failed => "failed",
                    CheckStatus::Warning => "warning",
                }
                .to_string(),
                detail: r.detail.clone(),
                message: r.message.clone(),
                hint: r.hint.clone(),
            })
            .collect();

        let json_output = JsonOutput {
            status: status.to_string(),
            passed: counts.passed,
            failed: counts.failed,
            warnings: counts.warnings,
            checks,
        };

        serde_json::to_string_pretty(&json_output).unwrap_or_else(|_| {
            r#"{"status":"error","message":"Failed to serialize JSON output"}"#.to_string()
        })
    }
}

impl Default for DoctorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> Vec<CheckResult> {
        vec![
            CheckResult::ok("Key definitions", "250 keys"),
            CheckResult::failed("Kernel module", "Control file not found: /proc/keymac_proc")
                .with_hint("Load the module with: sudo insmod KeyMac.ko"),
            CheckResult::warning("Macro store", "No stored macros yet: macros.txt"),
        ]
    }

    #[test]
    fn test_format_terminal() {
        let output = DoctorFormatter::new().format_results(&sample_results());

        assert!(output.contains("KeyMac Environment Status"));
        assert!(output.contains("✓ Key definitions"));
        assert!(output.contains("(250 keys)"));
        assert!(output.contains("✗ Kernel module"));
        assert!(output.contains("    Fix: Load the module"));
        assert!(output.contains("⚠ Macro store"));
        assert!(output.contains("Summary: 1 passed, 1 failed, 1 warnings"));
        assert!(output.contains("Macro editing is not available"));
    }

    #[test]
    fn test_format_terminal_all_passed() {
        let results = vec![
            CheckResult::ok("Key definitions", "250 keys"),
            CheckResult::ok("Kernel module", "0 macros loaded"),
        ];
        let output = DoctorFormatter::new().format_results(&results);
        assert!(output.contains("Summary: 2 passed\n"));
        assert!(output.contains("Ready to edit macros"));
    }

    #[test]
    fn test_format_json() {
        let output =
            DoctorFormatter::with_format(OutputFormat::Json).format_results(&sample_results());
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["passed"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["warnings"], 1);
        assert_eq!(json["checks"][1]["status"], "failed");
        assert!(json["checks"][1]["hint"].as_str().unwrap().contains("insmod"));
        assert!(json["checks"][2]["detail"].is_null());
    }
}
