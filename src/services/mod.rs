//! Service layer for business logic.
//!
//! [`MacroStore`] owns the macro set and all edits; [`SyncChannel`] is the
//! only code that touches the kernel control file and the durable store.

pub mod macro_store;
pub mod sync;

pub use macro_store::MacroStore;
pub use sync::SyncChannel;
