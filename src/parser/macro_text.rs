//! Line-oriented macro text format.
//!
//! Shared by the kernel control file and the durable macro store:
//!
//! ```text
//! KEY_LEFTCTRL KEY_LEFTSHIFT KEY_1 : KEY_H KEY_I KEY_I KEY_H
//! 29 42 2 : 35 23 23 35
//! ```
//!
//! One macro per line: the trigger keys, a `:` separator, then the output
//! sequence. Tokens are separated by whitespace and may be symbolic names or
//! numeric codes. The kernel module only understands numeric codes, so text
//! headed for the control file is always written in [`Notation::Code`].

use crate::error::{MacroError, MacroResult};
use crate::key_catalog::KeyCatalog;
use crate::models::{Key, Macro, MacroSet, Trigger, TRIGGER_LEN};
use serde::{Deserialize, Serialize};

/// How keys are spelled when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// Numeric input-event codes (`30`)
    #[default]
    Code,
    /// Symbolic names (`KEY_A`)
    Name,
}

impl std::fmt::Display for Notation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code => f.write_str("code"),
            Self::Name => f.write_str("name"),
        }
    }
}

impl std::str::FromStr for Notation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "code" => Ok(Self::Code),
            "name" => Ok(Self::Name),
            other => Err(format!("Invalid notation '{other}'. Must be 'code' or 'name'")),
        }
    }
}

/// Decodes macro text into a [`MacroSet`].
///
/// Blank lines are skipped. Every key is resolved against the catalog while
/// parsing, so an unknown key fails here rather than later.
///
/// # Errors
///
/// Returns [`MacroError::Format`] (with a 1-based line number) when a line
/// does not have exactly one `:`, the trigger is not [`TRIGGER_LEN`] keys,
/// or any token is not a known key.
pub fn parse_macro_text(content: &str, catalog: &KeyCatalog) -> MacroResult<MacroSet> {
    let mut set = MacroSet::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        set.push(parse_macro_line(line, idx + 1, catalog)?);
    }

    Ok(set)
}

/// Decodes a single `trigger : output` line.
pub fn parse_macro_line(line: &str, line_no: usize, catalog: &KeyCatalog) -> MacroResult<Macro> {
    let mut parts = line.split(':');
    let (Some(lhs), Some(rhs), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(MacroError::format(
            line_no,
            "expected exactly one ':' between trigger and output",
        ));
    };

    let trigger = resolve_trigger(lhs, catalog)
        .map_err(|reason| MacroError::format(line_no, format!("trigger: {reason}")))?;

    let output = resolve_keys(rhs, catalog)
        .map_err(|reason| MacroError::format(line_no, format!("output: {reason}")))?;

    Ok(Macro::new(trigger, output))
}

/// Parses a whitespace-separated trigger combination, e.g. `"KEY_A KEY_B KEY_C"`.
///
/// Used for triggers typed on the command line; errors are reported as
/// line 1.
pub fn parse_trigger(text: &str, catalog: &KeyCatalog) -> MacroResult<Trigger> {
    resolve_trigger(text, catalog)
        .map_err(|reason| MacroError::format(1, format!("trigger: {reason}")))
}

fn resolve_trigger(text: &str, catalog: &KeyCatalog) -> Result<Trigger, String> {
    let keys = resolve_keys(text, catalog)?;
    Trigger::from_vec(keys)
        .map_err(|keys| format!("expected {TRIGGER_LEN} keys, found {}", keys.len()))
}

fn resolve_keys(text: &str, catalog: &KeyCatalog) -> Result<Vec<Key>, String> {
    text.split_whitespace()
        .map(|token| catalog.resolve(token).map_err(|e| e.to_string()))
        .collect()
}

/// Encodes a [`MacroSet`] as text, one line per macro.
///
/// There is no trailing newline and no blank lines, so the output decodes
/// back to an equal set.
#[must_use]
pub fn generate_macro_text(set: &MacroSet, notation: Notation) -> String {
    set.iter()
        .map(|entry| generate_macro_line(entry, notation))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Encodes a single macro as `trigger : output`.
#[must_use]
pub fn generate_macro_line(entry: &Macro, notation: Notation) -> String {
    let spell = |key: &Key| match notation {
        Notation::Code => key.code().to_string(),
        Notation::Name => key.name().to_string(),
    };

    let lhs: Vec<String> = entry.trigger.keys().iter().map(spell).collect();
    let rhs: Vec<String> = entry.output.iter().map(spell).collect();

    if rhs.is_empty() {
        format!("{} :", lhs.join(" "))
    } else {
        format!("{} : {}", lhs.join(" "), rhs.join(" "))
    }
}
