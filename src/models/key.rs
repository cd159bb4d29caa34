//! Typed key tokens.

use serde::{Serialize, Serializer};

/// A key resolved through the [`KeyCatalog`](crate::key_catalog::KeyCatalog).
///
/// Holds the numeric input-event code together with the canonical symbolic
/// name. There is no public constructor: a `Key` only exists once the catalog
/// has recognised the token, so raw strings never travel past the decode
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    code: u16,
    name: String,
}

impl Key {
    pub(crate) fn new(code: u16, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }

    /// Numeric input-event code (e.g. 30 for `KEY_A`).
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Canonical symbolic name (e.g. `KEY_A`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}
