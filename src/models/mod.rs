//! Data models for keys and macros.
//!
//! Models are plain data; validation lives in [`crate::validator`] and
//! mutation goes through [`crate::services::MacroStore`].

pub mod key;
pub mod macro_def;

pub use key::Key;
pub use macro_def::{Macro, MacroSet, Trigger, TRIGGER_LEN};
