//! Environment checks.
//!
//! This module checks that the key definitions, the kernel module and the
//! macro store are in place before editing.

pub mod checker;
pub mod formatter;

pub use checker::{CheckResult, CheckStatus, EnvironmentChecker};
pub use formatter::{DoctorFormatter, OutputFormat};
