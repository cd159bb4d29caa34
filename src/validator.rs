//! Output sequence validation and whole-file macro checks.
//!
//! [`validate_output`] is the gate every edit passes before it can reach the
//! kernel. [`MacroValidator`] runs the same rules over a complete macro file
//! and collects every problem instead of stopping at the first one.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

use crate::config::KernelConfig;
use crate::error::{MacroError, MacroResult};
use crate::key_catalog::KeyCatalog;
use crate::models::{Key, Macro, MacroSet};
use crate::parser::macro_text::{generate_macro_text, parse_macro_line, Notation};
use std::collections::{HashMap, HashSet};

/// Resolves and checks a proposed output sequence.
///
/// 1. Every token must be a known key, else [`MacroError::InvalidKey`].
/// 2. Every distinct key must occur an even number of times, else
///    [`MacroError::UnbalancedKey`] naming the first such key (in sequence
///    order) and the index of its last occurrence.
pub fn validate_output<S: AsRef<str>>(tokens: &[S], catalog: &KeyCatalog) -> MacroResult<Vec<Key>> {
    let keys = tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            catalog
                .resolve(token)
                .map_err(|_| MacroError::InvalidKey(token.to_string()))
        })
        .collect::<MacroResult<Vec<Key>>>()?;

    check_balanced(&keys)?;
    Ok(keys)
}

/// Checks that every key in `keys` is pressed and released.
pub fn check_balanced(keys: &[Key]) -> MacroResult<()> {
    match unbalanced_keys(keys).into_iter().next() {
        Some((key, index)) => Err(MacroError::UnbalancedKey {
            key: key.name().to_string(),
            index,
        }),
        None => Ok(()),
    }
}

/// Every key with an odd count, paired with its last index.
///
/// Keys are listed in order of first appearance.
#[must_use]
pub fn unbalanced_keys(keys: &[Key]) -> Vec<(&Key, usize)> {
    let mut counts: HashMap<&Key, (usize, usize)> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        let entry = counts.entry(key).or_insert((0, idx));
        entry.0 += 1;
        entry.1 = idx;
    }

    let mut seen = HashSet::new();
    keys.iter()
        .filter(|key| seen.insert(*key))
        .filter_map(|key| {
            let (count, last) = counts[key];
            (count % 2 == 1).then_some((key, last))
        })
        .collect()
}

/// Severity of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Would be rejected by the store or the kernel
    Error,
    /// Accepted, but probably not what was intended
    Warning,
}

/// A problem found while checking a macro file.
#[derive(Debug, Clone)]
pub struct Issue {
    /// How serious the issue is
    pub severity: Severity,
    /// 1-based line number, if the issue belongs to one line
    pub line: Option<usize>,
    /// Human-readable description
    pub message: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "[line {line}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Result of checking a whole macro file.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Every issue found, in line order
    pub issues: Vec<Issue>,
    /// Number of lines that decoded into a macro
    pub macro_count: usize,
}

impl ValidationReport {
    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Returns true if any warning was reported.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    fn error(&mut self, line: Option<usize>, message: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Error,
            line,
            message: message.into(),
        });
    }

    fn warning(&mut self, line: Option<usize>, message: impl Into<String>) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            line,
            message: message.into(),
        });
    }

    /// Formats the report as a user-friendly message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();
        for issue in &self.issues {
            let prefix = match issue.severity {
                Severity::Error => "✗",
                Severity::Warning => "⚠",
            };
            message.push_str(&format!("  {prefix} {issue}\n"));
        }
        message
    }
}

/// Checks macro files against the catalog and the kernel limits.
pub struct MacroValidator<'a> {
    catalog: &'a KeyCatalog,
    limits: &'a KernelConfig,
}

impl<'a> MacroValidator<'a> {
    /// Creates a new validator.
    #[must_use]
    pub const fn new(catalog: &'a KeyCatalog, limits: &'a KernelConfig) -> Self {
        Self { catalog, limits }
    }

    /// Validates macro text line by line.
    ///
    /// Checks:
    /// - each line decodes (separator, trigger length, known keys)
    /// - every output key is released
    /// - duplicate triggers (only the first one is ever used)
    /// - empty output sequences (the kernel module cannot store them)
    /// - macro count and payload size against the kernel limits
    #[must_use]
    pub fn validate_text(&self, content: &str) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut set = MacroSet::new();
        let mut first_line_of: Vec<(Macro, usize)> = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let entry = match parse_macro_line(line, line_no, self.catalog) {
                Ok(entry) => entry,
                Err(MacroError::Format { reason, .. }) => {
                    report.error(Some(line_no), reason);
                    continue;
                }
                Err(e) => {
                    report.error(Some(line_no), e.to_string());
                    continue;
                }
            };

            self.check_entry(&mut report, &entry, line_no);

            if let Some((_, first)) = first_line_of
                .iter()
                .find(|(seen, _)| seen.trigger == entry.trigger)
            {
                report.warning(
                    Some(line_no),
                    format!(
                        "Trigger '{}' already defined on line {first}; this macro is never used",
                        entry.trigger
                    ),
                );
            } else {
                first_line_of.push((entry.clone(), line_no));
            }

            set.push(entry);
        }

        report.macro_count = set.len();
        self.check_limits(&mut report, &set);
        report
    }

    fn check_entry(&self, report: &mut ValidationReport, entry: &Macro, line_no: usize) {
        if entry.output.is_empty() {
            report.error(
                Some(line_no),
                MacroError::EmptyOutput(entry.trigger.to_string()).to_string(),
            );
        }

        for (key, index) in unbalanced_keys(&entry.output) {
            report.error(
                Some(line_no),
                format!("{key} not released at location {index}"),
            );
        }
    }

    fn check_limits(&self, report: &mut ValidationReport, set: &MacroSet) {
        if set.len() > self.limits.max_macros {
            report.error(
                None,
                format!(
                    "{} macros defined, the kernel module holds at most {}",
                    set.len(),
                    self.limits.max_macros
                ),
            );
        }

        let payload = generate_macro_text(set, Notation::Code).len();
        if payload > self.limits.max_payload_bytes {
            report.error(
                None,
                format!(
                    "Encoded size is {payload} bytes, the kernel control file accepts at most {}",
                    self.limits.max_payload_bytes
                ),
            );
        }
    }
}
