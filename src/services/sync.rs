//! Sync channel between the in-memory macro set and the two files.
//!
//! The kernel control file is always replaced as a whole in a single write:
//! the module clears its macro table and re-parses the buffer on every
//! write. The durable store is written with temp file + rename so it is
//! never left half written.

use crate::config::{Config, KernelConfig};
use crate::error::{MacroError, MacroResult, SyncTarget};
use crate::key_catalog::KeyCatalog;
use crate::models::MacroSet;
use crate::parser::macro_text::{generate_macro_text, parse_macro_text, Notation};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and writes the kernel control file and the durable macro store.
#[derive(Debug, Clone)]
pub struct SyncChannel {
    kernel_file: PathBuf,
    store_file: PathBuf,
    store_notation: Notation,
    limits: KernelConfig,
}

impl SyncChannel {
    /// Creates a channel with default notation and kernel limits.
    pub fn new(kernel_file: impl Into<PathBuf>, store_file: impl Into<PathBuf>) -> Self {
        Self {
            kernel_file: kernel_file.into(),
            store_file: store_file.into(),
            store_notation: Notation::default(),
            limits: KernelConfig::default(),
        }
    }

    /// Creates a channel from the application configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.paths.kernel_file, &config.paths.store_file)
            .with_store_notation(config.editor.store_notation)
            .with_limits(config.kernel)
    }

    /// Sets how keys are spelled in the durable store.
    #[must_use]
    pub fn with_store_notation(mut self, notation: Notation) -> Self {
        self.store_notation = notation;
        self
    }

    /// Sets the kernel table limits.
    #[must_use]
    pub fn with_limits(mut self, limits: KernelConfig) -> Self {
        self.limits = limits;
        self
    }

    /// Path of the kernel control file.
    #[must_use]
    pub fn kernel_file(&self) -> &Path {
        &self.kernel_file
    }

    /// Path of the durable store.
    #[must_use]
    pub fn store_file(&self) -> &Path {
        &self.store_file
    }

    /// Encodes `set` for the kernel, checking it fits the module's table.
    ///
    /// The module only advances to the next table entry after an output
    /// value, so a macro with no output keys would swallow the following
    /// line. Such sets are refused with [`MacroError::EmptyOutput`].
    pub fn encode_for_kernel(&self, set: &MacroSet) -> MacroResult<String> {
        if let Some(entry) = set.iter().find(|entry| entry.output.is_empty()) {
            return Err(MacroError::EmptyOutput(entry.trigger.to_string()));
        }

        if set.len() > self.limits.max_macros {
            return Err(MacroError::CapacityExceeded {
                what: "macro count",
                limit: self.limits.max_macros,
            });
        }

        let payload = generate_macro_text(set, Notation::Code);
        if payload.len() > self.limits.max_payload_bytes {
            return Err(MacroError::CapacityExceeded {
                what: "payload size",
                limit: self.limits.max_payload_bytes,
            });
        }

        Ok(payload)
    }

    /// Replaces the kernel's macro table with `set`.
    ///
    /// The file must already exist (the module creates it). Capacity is
    /// checked before the file is opened, so a `CapacityExceeded` error
    /// leaves the kernel untouched; any `Sync` error means the kernel state
    /// is unknown.
    pub fn push_to_kernel(&self, set: &MacroSet) -> MacroResult<()> {
        let payload = self.encode_for_kernel(set)?;
        let sync_err = |source: std::io::Error| MacroError::Sync {
            target: SyncTarget::Kernel,
            path: self.kernel_file.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.kernel_file)
            .map_err(sync_err)?;

        let written = file.write(payload.as_bytes()).map_err(sync_err)?;
        if written != payload.len() {
            return Err(sync_err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("short write: {written} of {} bytes", payload.len()),
            )));
        }
        file.flush().map_err(sync_err)?;

        tracing::info!(
            path = %self.kernel_file.display(),
            macros = set.len(),
            bytes = written,
            "pushed macros to kernel"
        );
        Ok(())
    }

    /// Reads and decodes the kernel's current macro table.
    pub fn pull_from_kernel(&self, catalog: &KeyCatalog) -> MacroResult<MacroSet> {
        let content = self.read(SyncTarget::Kernel, &self.kernel_file)?;
        let set = parse_macro_text(&content, catalog)?;
        tracing::debug!(macros = set.len(), "pulled macros from kernel");
        Ok(set)
    }

    /// Writes `set` to the durable store.
    pub fn persist(&self, set: &MacroSet) -> MacroResult<()> {
        let content = generate_macro_text(set, self.store_notation);
        let sync_err = |source: std::io::Error| MacroError::Sync {
            target: SyncTarget::Store,
            path: self.store_file.clone(),
            source,
        };

        if let Some(parent) = self.store_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(sync_err)?;
            }
        }

        let temp_path = self.store_file.with_extension("tmp");
        fs::write(&temp_path, content).map_err(sync_err)?;
        fs::rename(&temp_path, &self.store_file).map_err(sync_err)?;

        tracing::info!(
            path = %self.store_file.display(),
            macros = set.len(),
            "stored macros"
        );
        Ok(())
    }

    /// Reads and decodes the durable store.
    pub fn restore(&self, catalog: &KeyCatalog) -> MacroResult<MacroSet> {
        let content = self.read(SyncTarget::Store, &self.store_file)?;
        let set = parse_macro_text(&content, catalog)?;
        tracing::info!(
            path = %self.store_file.display(),
            macros = set.len(),
            "restored macros"
        );
        Ok(set)
    }

    fn read(&self, target: SyncTarget, path: &Path) -> MacroResult<String> {
        fs::read_to_string(path).map_err(|source| MacroError::Sync {
            target,
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SyncChannel) {
        let temp_dir = TempDir::new().unwrap();
        let kernel = temp_dir.path().join("keymac_proc");
        fs::write(&kernel, "").unwrap();
        let channel = SyncChannel::new(kernel, temp_dir.path().join("store").join("macros.txt"));
        (temp_dir, channel)
    }

    fn sample(catalog: &KeyCatalog) -> MacroSet {
        parse_macro_text(
            "KEY_A KEY_B KEY_C : KEY_X KEY_Y KEY_Y KEY_X\nKEY_D KEY_E KEY_F : KEY_Z KEY_Z",
            catalog,
        )
        .unwrap()
    }

    #[test]
    fn test_push_writes_codes_and_replaces_content() {
        let catalog = KeyCatalog::builtin();
        let (_temp, channel) = setup();
        fs::write(channel.kernel_file(), "stale content that is much longer than the payload")
            .unwrap();

        channel.push_to_kernel(&sample(&catalog)).unwrap();

        let written = fs::read_to_string(channel.kernel_file()).unwrap();
        assert_eq!(written, "30 48 46 : 45 21 21 45\n32 18 33 : 44 44");
        assert_eq!(channel.pull_from_kernel(&catalog).unwrap(), sample(&catalog));
    }

    #[test]
    fn test_push_requires_existing_kernel_file() {
        let catalog = KeyCatalog::builtin();
        let (_temp, channel) = setup();
        fs::remove_file(channel.kernel_file()).unwrap();

        let err = channel.push_to_kernel(&sample(&catalog)).unwrap_err();
        assert!(matches!(
            err,
            MacroError::Sync {
                target: SyncTarget::Kernel,
                ..
            }
        ));
        assert!(!channel.kernel_file().exists());
    }

    #[test]
    fn test_push_rejects_oversized_table_before_writing() {
        let catalog = KeyCatalog::builtin();
        let (_temp, channel) = setup();
        let channel = channel.with_limits(KernelConfig {
            max_macros: 1,
            max_payload_bytes: 1000,
        });
        fs::write(channel.kernel_file(), "29 42 2 : 30 30").unwrap();

        let err = channel.push_to_kernel(&sample(&catalog)).unwrap_err();
        assert!(matches!(err, MacroError::CapacityExceeded { limit: 1, .. }));
        assert_eq!(
            fs::read_to_string(channel.kernel_file()).unwrap(),
            "29 42 2 : 30 30"
        );
    }

    #[test]
    fn test_push_rejects_oversized_payload() {
        let catalog = KeyCatalog::builtin();
        let (_temp, channel) = setup();
        let channel = channel.with_limits(KernelConfig {
            max_macros: 10,
            max_payload_bytes: 10,
        });

        let err = channel.push_to_kernel(&sample(&catalog)).unwrap_err();
        assert!(matches!(
            err,
            MacroError::CapacityExceeded {
                what: "payload size",
                ..
            }
        ));
    }

    #[test]
    fn test_push_rejects_empty_output_before_writing() {
        let catalog = KeyCatalog::builtin();
        let (_temp, channel) = setup();
        fs::write(channel.kernel_file(), "32 18 33 : 44 44").unwrap();

        // An empty macro first would merge with the line after it in the kernel
        let set = parse_macro_text("KEY_A KEY_B KEY_C :\nKEY_D KEY_E KEY_F : KEY_Z KEY_Z", &catalog)
            .unwrap();
        let err = channel.push_to_kernel(&set).unwrap_err();
        assert!(matches!(err, MacroError::EmptyOutput(ref t) if t == "KEY_A KEY_B KEY_C"));
        assert_eq!(
            fs::read_to_string(channel.kernel_file()).unwrap(),
            "32 18 33 : 44 44"
        );

        // Same when it is the last line
        let set = parse_macro_text("KEY_D KEY_E KEY_F : KEY_Z KEY_Z\nKEY_A KEY_B KEY_C :", &catalog)
            .unwrap();
        assert!(matches!(
            channel.encode_for_kernel(&set),
            Err(MacroError::EmptyOutput(_))
        ));
    }

    #[test]
    fn test_persist_and_restore_round_trip() {
        let catalog = KeyCatalog::builtin();
        let (_temp, channel) = setup();
        let channel = channel.with_store_notation(Notation::Name);

        channel.persist(&sample(&catalog)).unwrap();

        let stored = fs::read_to_string(channel.store_file()).unwrap();
        assert!(stored.starts_with("KEY_A KEY_B KEY_C : KEY_X"));
        assert!(!stored.ends_with('\n'));
        assert!(!channel.store_file().with_extension("tmp").exists());

        assert_eq!(channel.restore(&catalog).unwrap(), sample(&catalog));
    }

    #[test]
    fn test_restore_missing_store_is_sync_error() {
        let catalog = KeyCatalog::builtin();
        let (_temp, channel) = setup();
        let err = channel.restore(&catalog).unwrap_err();
        assert!(matches!(
            err,
            MacroError::Sync {
                target: SyncTarget::Store,
                ..
            }
        ));
    }

    #[test]
    fn test_pull_rejects_malformed_kernel_content() {
        let catalog = KeyCatalog::builtin();
        let (_temp, channel) = setup();
        fs::write(channel.kernel_file(), "29 42 : 30 30").unwrap();
        assert!(matches!(
            channel.pull_from_kernel(&catalog),
            Err(MacroError::Format { line: 1, .. })
        ));
    }
}
