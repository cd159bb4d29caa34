//! KeyMac library
//!
//! Editing core for the KeyMac kernel module: the key catalog, the macro
//! text codec, output validation, and the macro store that keeps the
//! in-memory set in step with the kernel control file and a durable store.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod doctor;
pub mod error;
pub mod key_catalog;
pub mod models;
pub mod parser;
pub mod services;
pub mod validator;
