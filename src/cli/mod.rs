//! CLI command handlers for KeyMac.
//!
//! Each invocation is one edit session: the macro set is read from the
//! kernel control file, one change is applied and pushed back.

pub mod common;
pub mod config;
pub mod doctor;
pub mod edit;
pub mod keys;
pub mod list;
pub mod sync;
pub mod validate;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode, GlobalArgs};
pub use config::ConfigArgs;
pub use doctor::DoctorArgs;
pub use edit::{AddArgs, AddSlotsArgs, DeleteArgs, RebindArgs, RemoveSlotsArgs, SetArgs};
pub use keys::KeysArgs;
pub use list::{ListArgs, ShowArgs};
pub use sync::{ReloadArgs, StoreArgs};
pub use validate::ValidateArgs;
