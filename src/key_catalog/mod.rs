//! Key catalog: numeric input-event codes and their symbolic names.
//!
//! The catalog is built once at startup from a Linux `input-event-codes.h`
//! style header and provides O(1) lookup in both directions. It is the only
//! place that turns raw text into a [`Key`].

use crate::error::{MacroError, MacroResult};
use crate::models::Key;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

/// Key definitions compiled into the binary.
const BUILTIN_HEADER: &str = include_str!("input-event-codes.h");

/// Range markers in the header that are not real keys.
const SENTINELS: &[&str] = &["KEY_MAX", "KEY_CNT", "KEY_MIN_INTERESTING"];

static DEFINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#define\s+(KEY_[A-Za-z0-9_]+)\s+(\S+)").expect("define pattern is valid")
});

/// Two-way lookup between key codes and key names.
#[derive(Debug, Clone, Default)]
pub struct KeyCatalog {
    /// Every known name (aliases included) to its code
    by_name: HashMap<String, u16>,
    /// Code to canonical name (first definition wins)
    by_code: BTreeMap<u16, String>,
}

impl KeyCatalog {
    /// Loads the catalog from a header file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read key definitions: {}", path.display()))?;

        let catalog = Self::parse(&content);
        if catalog.is_empty() {
            anyhow::bail!("No KEY_ definitions found in {}", path.display());
        }

        tracing::debug!(
            path = %path.display(),
            keys = catalog.len(),
            "loaded key catalog"
        );
        Ok(catalog)
    }

    /// Returns the catalog compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_HEADER)
    }

    /// Loads from `path`, falling back to the built-in catalog if that fails.
    #[must_use]
    pub fn load_or_builtin(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!("{e:#}; using built-in key definitions");
                Self::builtin()
            }
        }
    }

    /// Parses `#define KEY_* <value>` lines.
    ///
    /// Values may be decimal, hexadecimal, or the name of a key defined
    /// earlier. Lines that don't fit are ignored, as are `KEY_RESERVED`
    /// (code 0 is skipped by the kernel parser) and range sentinels.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut catalog = Self::default();

        for line in content.lines() {
            let Some(caps) = DEFINE_RE.captures(line) else {
                continue;
            };
            let name = &caps[1];
            if SENTINELS.contains(&name) {
                continue;
            }

            let Some(code) = catalog.parse_value(&caps[2]) else {
                continue;
            };
            if code == 0 {
                continue;
            }

            catalog.by_name.insert(name.to_string(), code);
            catalog
                .by_code
                .entry(code)
                .or_insert_with(|| name.to_string());
        }

        catalog
    }

    fn parse_value(&self, value: &str) -> Option<u16> {
        if let Some(hex) = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
        {
            return u16::from_str_radix(hex, 16).ok();
        }
        if let Ok(code) = value.parse::<u16>() {
            return Some(code);
        }
        self.by_name.get(value).copied()
    }

    /// Resolves a key name or decimal code to a [`Key`].
    ///
    /// Aliases resolve to the canonical name for their code, so two spellings
    /// of the same key compare equal.
    pub fn resolve(&self, token: &str) -> MacroResult<Key> {
        let code = match token.parse::<u16>() {
            Ok(code) => code,
            Err(_) => *self
                .by_name
                .get(token)
                .ok_or_else(|| MacroError::UnknownKey(token.to_string()))?,
        };
        self.key_for_code(code)
            .ok_or_else(|| MacroError::UnknownKey(token.to_string()))
    }

    /// Looks up a key by its numeric code.
    #[must_use]
    pub fn key_for_code(&self, code: u16) -> Option<Key> {
        self.by_code.get(&code).map(|name| Key::new(code, name.as_str()))
    }

    /// Looks up a key by symbolic name (aliases accepted).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Key> {
        self.by_name
            .get(name)
            .and_then(|code| self.key_for_code(*code))
    }

    /// True if `name` is a known key name.
    #[must_use]
    pub fn is_valid(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Searches canonical key names, case-insensitively.
    ///
    /// Exact matches rank first, then prefix matches (with or without the
    /// `KEY_` prefix), then substring matches. Ties keep code order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Key> {
        if query.is_empty() {
            return self.keys().collect();
        }

        let query_upper = query.to_uppercase();
        let mut results: Vec<(Key, i32)> = self
            .keys()
            .filter_map(|key| {
                let name = key.name();
                let short = name.strip_prefix("KEY_").unwrap_or(name);

                let score = if name == query_upper || short == query_upper {
                    100
                } else if name.starts_with(&query_upper) || short.starts_with(&query_upper) {
                    50
                } else if name.contains(&query_upper) {
                    10
                } else {
                    return None;
                };
                Some((key, score))
            })
            .collect();

        // Stable sort keeps code order within a score
        results.sort_by(|a, b| b.1.cmp(&a.1));
        results.into_iter().map(|(key, _)| key).collect()
    }

    /// All canonical keys in code order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.by_code
            .iter()
            .map(|(code, name)| Key::new(*code, name.as_str()))
    }

    /// Number of distinct key codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// True if no keys were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_common_keys() {
        let catalog = KeyCatalog::builtin();
        assert!(catalog.len() > 100);
        assert_eq!(catalog.get("KEY_A").unwrap().code(), 30);
        assert_eq!(catalog.get("KEY_LEFTCTRL").unwrap().code(), 29);
        assert_eq!(catalog.key_for_code(45).unwrap().name(), "KEY_X");
    }

    #[test]
    fn test_parse_hex_and_trailing_comment() {
        let catalog = KeyCatalog::builtin();
        assert_eq!(catalog.get("KEY_BRIGHTNESS_ZERO").unwrap().code(), 0x244);
        assert_eq!(catalog.get("KEY_POWER").unwrap().code(), 116);
    }

    #[test]
    fn test_alias_resolves_to_canonical_name() {
        let catalog = KeyCatalog::builtin();
        let alias = catalog.resolve("KEY_HANGUEL").unwrap();
        let canonical = catalog.resolve("KEY_HANGEUL").unwrap();
        assert_eq!(alias, canonical);
        assert_eq!(alias.name(), "KEY_HANGEUL");
        assert_eq!(catalog.resolve("KEY_SCREENLOCK").unwrap().name(), "KEY_COFFEE");
    }

    #[test]
    fn test_reserved_and_sentinels_excluded() {
        let catalog = KeyCatalog::builtin();
        assert!(!catalog.is_valid("KEY_RESERVED"));
        assert!(!catalog.is_valid("KEY_MAX"));
        assert!(!catalog.is_valid("KEY_CNT"));
        assert!(!catalog.is_valid("KEY_MIN_INTERESTING"));
        assert!(catalog.key_for_code(0).is_none());
    }

    #[test]
    fn test_resolve_numeric_code() {
        let catalog = KeyCatalog::builtin();
        let key = catalog.resolve("30").unwrap();
        assert_eq!(key.name(), "KEY_A");
    }

    #[test]
    fn test_resolve_unknown() {
        let catalog = KeyCatalog::builtin();
        assert!(matches!(
            catalog.resolve("KEY_NOPE"),
            Err(MacroError::UnknownKey(name)) if name == "KEY_NOPE"
        ));
        assert!(matches!(catalog.resolve("9999"), Err(MacroError::UnknownKey(_))));
        assert!(matches!(catalog.resolve(""), Err(MacroError::UnknownKey(_))));
    }

    #[test]
    fn test_parse_ignores_non_key_lines() {
        let catalog = KeyCatalog::parse(
            "#define BTN_LEFT 0x110\n#define EV_KEY 0x01\n#define KEY_Q 16\nrandom text\n",
        );
        assert_eq!(catalog.len(), 1);
        assert!(catalog.is_valid("KEY_Q"));
    }

    #[test]
    fn test_search_ranks_exact_first() {
        let catalog = KeyCatalog::builtin();
        let results = catalog.search("a");
        assert_eq!(results[0].name(), "KEY_A");

        let results = catalog.search("ctrl");
        assert!(results.iter().any(|k| k.name() == "KEY_LEFTCTRL"));
        assert!(results.iter().all(|k| k.name().contains("CTRL")));
    }

    #[test]
    fn test_search_empty_returns_all() {
        let catalog = KeyCatalog::builtin();
        assert_eq!(catalog.search("").len(), catalog.len());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let catalog = KeyCatalog::load_or_builtin(Path::new("/nonexistent/input-event-codes.h"));
        assert!(catalog.is_valid("KEY_A"));
    }
}
