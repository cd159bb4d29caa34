//! Macro definitions and the ordered macro set.

use crate::models::Key;
use serde::Serialize;

/// Number of keys in a trigger combination.
///
/// The kernel module stores exactly three identifier codes per macro.
pub const TRIGGER_LEN: usize = 3;

/// Keys held together to fire a macro.
///
/// Identity is exact sequence equality: `A B C` and `C B A` are different
/// triggers even though they describe the same chord.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Trigger([Key; TRIGGER_LEN]);

impl Trigger {
    /// Creates a trigger from exactly [`TRIGGER_LEN`] keys.
    #[must_use]
    pub const fn new(keys: [Key; TRIGGER_LEN]) -> Self {
        Self(keys)
    }

    /// Creates a trigger from a vector, returning it back if the length is wrong.
    pub fn from_vec(keys: Vec<Key>) -> Result<Self, Vec<Key>> {
        <[Key; TRIGGER_LEN]>::try_from(keys).map(Self)
    }

    /// The trigger keys in order.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.0
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Key::name).collect();
        f.write_str(&names.join(" "))
    }
}

/// A trigger combination and the press/release sequence it plays back.
///
/// Each key in `output` toggles: first occurrence presses, the next one
/// releases. A sequence is only pushed to the kernel when every key occurs
/// an even number of times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Macro {
    /// Identifying key combination
    pub trigger: Trigger,
    /// Keys emitted in order when the trigger fires
    pub output: Vec<Key>,
}

impl Macro {
    /// Creates a new macro.
    #[must_use]
    pub const fn new(trigger: Trigger, output: Vec<Key>) -> Self {
        Self { trigger, output }
    }
}

/// Ordered collection of macros.
///
/// Insertion order is kept so that text round-trips line for line. Duplicate
/// triggers are allowed; lookups always resolve to the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MacroSet {
    macros: Vec<Macro>,
}

impl MacroSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { macros: Vec::new() }
    }

    /// Index of the first macro with the given trigger.
    #[must_use]
    pub fn position(&self, trigger: &Trigger) -> Option<usize> {
        self.macros.iter().position(|m| &m.trigger == trigger)
    }

    /// First macro with the given trigger.
    #[must_use]
    pub fn find(&self, trigger: &Trigger) -> Option<&Macro> {
        self.macros.iter().find(|m| &m.trigger == trigger)
    }

    /// Mutable access to the first macro with the given trigger.
    pub fn find_mut(&mut self, trigger: &Trigger) -> Option<&mut Macro> {
        self.macros.iter_mut().find(|m| &m.trigger == trigger)
    }

    /// Appends a macro at the end.
    pub fn push(&mut self, entry: Macro) {
        self.macros.push(entry);
    }

    /// Removes the first macro with the given trigger.
    pub fn remove(&mut self, trigger: &Trigger) -> Option<Macro> {
        let idx = self.position(trigger)?;
        Some(self.macros.remove(idx))
    }

    /// Iterates macros in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Macro> {
        self.macros.iter()
    }

    /// Number of macros.
    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// True if there are no macros.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

impl From<Vec<Macro>> for MacroSet {
    fn from(macros: Vec<Macro>) -> Self {
        Self { macros }
    }
}

impl<'a> IntoIterator for &'a MacroSet {
    type Item = &'a Macro;
    type IntoIter = std::slice::Iter<'a, Macro>;

    fn into_iter(self) -> Self::IntoIter {
        self.macros.iter()
    }
}
