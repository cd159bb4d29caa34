//! Environment checks for the macro editor.
//!
//! Verifies that the pieces `keymac` talks to are in place: the key
//! definitions header, the kernel module's control file, and the durable
//! macro store.
//!
//! # Example
//!
//! ```no_run
//! use keymac::config::Config;
//! use keymac::doctor::{CheckStatus, EnvironmentChecker};
//!
//! let config = Config::load().unwrap_or_default();
//! for result in EnvironmentChecker::new(&config).check_all() {
//!     if result.status != CheckStatus::Ok {
//!         println!("{}: {}", result.name, result.message);
//!     }
//! }
//! ```
//!
//! All checks are non-panicking and return structured results.

use crate::config::Config;
use crate::key_catalog::KeyCatalog;
use crate::parser::parse_macro_text;
use std::fs::OpenOptions;
use std::path::Path;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Present and working
    Ok,
    /// Missing or broken; editing will fail
    Failed,
    /// Usable, but something needs attention
    Warning,
}

/// Result of checking one component.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Component name (e.g., "Kernel module")
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
    /// Short detail shown next to OK results (e.g., "3 macros")
    pub detail: Option<String>,
    /// Human-readable explanation
    pub message: String,
    /// What to do about a failure or warning
    pub hint: Option<String>,
}

impl CheckResult {
    /// Creates a passing result.
    pub fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
            message: detail.clone(),
            detail: Some(detail),
            hint: None,
        }
    }

    /// Creates a failing result.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed,
            detail: None,
            message: message.into(),
            hint: None,
        }
    }

    /// Creates a warning result.
    pub fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning,
            detail: None,
            message: message.into(),
            hint: None,
        }
    }

    /// Attaches a hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Runs the environment checks for one configuration.
pub struct EnvironmentChecker<'a> {
    config: &'a Config,
}

impl<'a> EnvironmentChecker<'a> {
    /// Creates a checker for `config`.
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Runs every check in display order.
    #[must_use]
    pub fn check_all(&self) -> Vec<CheckResult> {
        let (catalog_result, catalog) = self.check_key_catalog();
        vec![
            catalog_result,
            self.check_kernel_file(&catalog),
            self.check_store_file(&catalog),
        ]
    }

    /// Loads the key definitions, falling back to the built-in set.
    pub fn check_key_catalog(&self) -> (CheckResult, KeyCatalog) {
        let path = &self.config.paths.key_catalog;
        match KeyCatalog::load(path) {
            Ok(catalog) => (
                CheckResult::ok("Key definitions", format!("{} keys", catalog.len())),
                catalog,
            ),
            Err(e) => (
                CheckResult::warning(
                    "Key definitions",
                    format!("{e:#}\nUsing the built-in key list instead."),
                )
                .with_hint("Install the Linux kernel headers (e.g. linux-libc-dev)"),
                KeyCatalog::builtin(),
            ),
        }
    }

    /// Checks the kernel control file is present, writable and decodable.
    pub fn check_kernel_file(&self, catalog: &KeyCatalog) -> CheckResult {
        let path = &self.config.paths.kernel_file;
        const NAME: &str = "Kernel module";

        if !path.exists() {
            return CheckResult::failed(
                NAME,
                format!("Control file not found: {}", path.display()),
            )
            .with_hint("Load the module with: sudo insmod KeyMac.ko");
        }

        if let Err(e) = OpenOptions::new().write(true).open(path) {
            return CheckResult::failed(
                NAME,
                format!("Control file is not writable: {} ({e})", path.display()),
            )
            .with_hint("Run as a user with write access to the control file");
        }

        match decode(path, catalog) {
            Ok(count) => CheckResult::ok(NAME, format!("{count} macros loaded")),
            Err(message) => CheckResult::failed(NAME, message),
        }
    }

    /// Checks the durable store decodes, if it exists.
    pub fn check_store_file(&self, catalog: &KeyCatalog) -> CheckResult {
        let path = &self.config.paths.store_file;
        const NAME: &str = "Macro store";

        if !path.exists() {
            return CheckResult::warning(
                NAME,
                format!("No stored macros yet: {}", path.display()),
            )
            .with_hint("Save the current macros with: keymac store");
        }

        match decode(path, catalog) {
            Ok(count) => CheckResult::ok(NAME, format!("{count} macros stored")),
            Err(message) => CheckResult::failed(NAME, message)
                .with_hint("Fix the file or overwrite it with: keymac store"),
        }
    }
}

fn decode(path: &Path, catalog: &KeyCatalog) -> Result<usize, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_macro_text(&content, catalog)
        .map(|set| set.len())
        .map_err(|e| format!("Failed to decode {}: {e}", path.display()))
}
