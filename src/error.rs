//! Error types for the macro engine.
//!
//! Every expected failure of a store, codec or sync operation is an ordinary
//! [`MacroError`] value. Nothing in the engine panics on user input.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for macro engine operations.
pub type MacroResult<T> = Result<T, MacroError>;

/// Which file a sync failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    /// The kernel-facing control file
    Kernel,
    /// The durable macro store on disk
    Store,
}

impl std::fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kernel => write!(f, "kernel control file"),
            Self::Store => write!(f, "macro store"),
        }
    }
}

/// Errors produced by the macro codec, store and sync channel.
#[derive(Debug, Error)]
pub enum MacroError {
    /// A line of macro text could not be decoded.
    #[error("line {line}: {reason}")]
    Format {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A key name or code that the key catalog does not know.
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    /// A proposed output sequence contains a key the catalog does not know.
    #[error("{0} is not a valid key")]
    InvalidKey(String),

    /// A key occurs an odd number of times, so it is never released.
    #[error("{key} not released at location {index}")]
    UnbalancedKey {
        /// Offending key name
        key: String,
        /// Position of the last occurrence of the key
        index: usize,
    },

    /// A macro with no output keys; the kernel parser cannot represent it.
    #[error("macro '{0}' has no output keys")]
    EmptyOutput(String),

    /// No macro has the given trigger combination.
    #[error("no macro with trigger '{0}'")]
    NotFound(String),

    /// Fewer than two output slots are left to remove.
    #[error("cannot remove slots: only {len} left")]
    Underflow {
        /// Current output length
        len: usize,
    },

    /// A slot index past the end of the output sequence.
    #[error("slot {index} out of range (output has {len} slots)")]
    SlotOutOfRange {
        /// Requested slot
        index: usize,
        /// Current output length
        len: usize,
    },

    /// The kernel table or control buffer would overflow.
    #[error("{what} exceeds kernel limit of {limit}")]
    CapacityExceeded {
        /// What overflowed ("macro count", "payload size")
        what: &'static str,
        /// The configured limit
        limit: usize,
    },

    /// Reading or writing the kernel file or the durable store failed.
    #[error("{target} {}: {source}", .path.display())]
    Sync {
        /// Which side of the channel failed
        target: SyncTarget,
        /// File that was being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl MacroError {
    /// Builds a [`MacroError::Format`] for the given line.
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }

    /// Returns true for rejected input; nothing was written and state is
    /// unchanged.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Format { .. }
                | Self::UnknownKey(_)
                | Self::InvalidKey(_)
                | Self::UnbalancedKey { .. }
                | Self::EmptyOutput(_)
                | Self::NotFound(_)
                | Self::Underflow { .. }
                | Self::SlotOutOfRange { .. }
                | Self::CapacityExceeded { .. }
        )
    }

    /// Returns true if the error came from file I/O.
    #[must_use]
    pub const fn is_sync(&self) -> bool {
        matches!(self, Self::Sync { .. })
    }
}
