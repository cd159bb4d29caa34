//! Parsing and serialization of macro text.
//!
//! The same format is used for the kernel control file and the durable
//! macro store.

pub mod macro_text;

pub use macro_text::{generate_macro_text, parse_macro_text, parse_trigger, Notation};
