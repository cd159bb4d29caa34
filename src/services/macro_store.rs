//! The macro store: owner of the macro set and every mutation on it.
//!
//! Slot edits (`add_output_slots`, `remove_output_slots`, `rebind_slot`)
//! work on a per-trigger draft and never reach the kernel. Only
//! `commit_edit`, `add_macro`, `delete_macro` and `reload_from_disk` change
//! the committed set, and each of them validates first and pushes the whole
//! set to the kernel before the change becomes visible. If the push fails
//! the committed set is left as it was.

use crate::config::Config;
use crate::constants::DEFAULT_SLOT_KEY;
use crate::error::{MacroError, MacroResult};
use crate::key_catalog::KeyCatalog;
use crate::models::{Key, Macro, MacroSet, Trigger};
use crate::services::sync::SyncChannel;
use crate::validator::validate_output;

/// In-memory macro set kept in step with the kernel control file.
#[derive(Debug)]
pub struct MacroStore {
    catalog: KeyCatalog,
    sync: SyncChannel,
    macros: MacroSet,
    drafts: Vec<(Trigger, Vec<Key>)>,
    default_slot_key: Key,
    synced: bool,
}

impl MacroStore {
    /// Builds the store from the kernel's current macro table.
    ///
    /// # Errors
    ///
    /// A [`MacroError::Format`] here is fatal: the kernel file must decode
    /// before anything can be edited.
    pub fn open(catalog: KeyCatalog, sync: SyncChannel) -> MacroResult<Self> {
        let macros = sync.pull_from_kernel(&catalog)?;
        tracing::info!(
            path = %sync.kernel_file().display(),
            macros = macros.len(),
            "loaded macros from kernel"
        );
        Self::with_macros(catalog, sync, macros)
    }

    /// Builds the store from configuration, pulling from the kernel file.
    pub fn from_config(config: &Config, catalog: KeyCatalog) -> MacroResult<Self> {
        Self::open(catalog, SyncChannel::from_config(config))?
            .with_default_slot_key(&config.editor.default_slot_key)
    }

    /// Builds the store around a set that is already known to match the kernel.
    pub fn with_macros(
        catalog: KeyCatalog,
        sync: SyncChannel,
        macros: MacroSet,
    ) -> MacroResult<Self> {
        let default_slot_key = catalog.resolve(DEFAULT_SLOT_KEY)?;
        Ok(Self {
            catalog,
            sync,
            macros,
            drafts: Vec::new(),
            default_slot_key,
            synced: true,
        })
    }

    /// Sets the key placed in newly added output slots.
    pub fn with_default_slot_key(mut self, name: &str) -> MacroResult<Self> {
        self.default_slot_key = self.catalog.resolve(name)?;
        Ok(self)
    }

    /// The committed macro set (what the kernel holds).
    #[must_use]
    pub fn list_macros(&self) -> &MacroSet {
        &self.macros
    }

    /// The key catalog used for validation.
    #[must_use]
    pub fn catalog(&self) -> &KeyCatalog {
        &self.catalog
    }

    /// The sync channel.
    #[must_use]
    pub fn sync_channel(&self) -> &SyncChannel {
        &self.sync
    }

    /// False after a failed push: the kernel state is unknown until
    /// [`retry_push`](Self::retry_push) or
    /// [`resync_from_kernel`](Self::resync_from_kernel) succeeds.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// First committed macro with the given trigger.
    #[must_use]
    pub fn get(&self, trigger: &Trigger) -> Option<&Macro> {
        self.macros.find(trigger)
    }

    /// Output being edited for `trigger`: the draft if there is one,
    /// otherwise the committed output.
    pub fn draft_output(&self, trigger: &Trigger) -> MacroResult<&[Key]> {
        if let Some((_, draft)) = self.drafts.iter().find(|(t, _)| t == trigger) {
            return Ok(draft);
        }
        self.macros
            .find(trigger)
            .map(|entry| entry.output.as_slice())
            .ok_or_else(|| MacroError::NotFound(trigger.to_string()))
    }

    /// True if `trigger` has uncommitted slot edits.
    #[must_use]
    pub fn has_draft(&self, trigger: &Trigger) -> bool {
        self.drafts.iter().any(|(t, _)| t == trigger)
    }

    fn draft_mut(&mut self, trigger: &Trigger) -> MacroResult<&mut Vec<Key>> {
        if let Some(idx) = self.drafts.iter().position(|(t, _)| t == trigger) {
            return Ok(&mut self.drafts[idx].1);
        }

        let entry = self
            .macros
            .find(trigger)
            .ok_or_else(|| MacroError::NotFound(trigger.to_string()))?;
        self.drafts.push((trigger.clone(), entry.output.clone()));

        let last = self.drafts.len() - 1;
        Ok(&mut self.drafts[last].1)
    }

    /// Appends two default keys (a press and its release) to the draft.
    ///
    /// Returns the new draft length.
    pub fn add_output_slots(&mut self, trigger: &Trigger) -> MacroResult<usize> {
        let key = self.default_slot_key.clone();
        let draft = self.draft_mut(trigger)?;
        draft.push(key.clone());
        draft.push(key);
        Ok(draft.len())
    }

    /// Removes the last two keys of the draft.
    ///
    /// Returns the new draft length, or [`MacroError::Underflow`] (draft
    /// unchanged) when fewer than two keys are left.
    pub fn remove_output_slots(&mut self, trigger: &Trigger) -> MacroResult<usize> {
        let draft = self.draft_mut(trigger)?;
        if draft.len() < 2 {
            return Err(MacroError::Underflow { len: draft.len() });
        }
        draft.truncate(draft.len() - 2);
        Ok(draft.len())
    }

    /// Replaces one key of the draft.
    pub fn rebind_slot(&mut self, trigger: &Trigger, slot: usize, name: &str) -> MacroResult<()> {
        let key = self.catalog.resolve(name)?;
        let draft = self.draft_mut(trigger)?;
        let len = draft.len();
        let target = draft
            .get_mut(slot)
            .ok_or(MacroError::SlotOutOfRange { index: slot, len })?;
        *target = key;
        Ok(())
    }

    /// Drops uncommitted slot edits for `trigger`.
    pub fn discard_draft(&mut self, trigger: &Trigger) {
        self.drafts.retain(|(t, _)| t != trigger);
    }

    /// Commits the current draft for `trigger` through [`commit_edit`](Self::commit_edit).
    pub fn commit_draft(&mut self, trigger: &Trigger) -> MacroResult<()> {
        let names: Vec<String> = self
            .draft_output(trigger)?
            .iter()
            .map(|key| key.name().to_string())
            .collect();
        self.commit_edit(trigger, &names)
    }

    /// Replaces the output of the macro matching `trigger` in one step.
    ///
    /// The proposal is validated first ([`MacroError::InvalidKey`],
    /// [`MacroError::UnbalancedKey`]); on any failure nothing changes and
    /// nothing is pushed.
    pub fn commit_edit<S: AsRef<str>>(&mut self, trigger: &Trigger, proposed: &[S]) -> MacroResult<()> {
        let idx = self
            .macros
            .position(trigger)
            .ok_or_else(|| MacroError::NotFound(trigger.to_string()))?;

        let output = validate_output(proposed, &self.catalog).inspect_err(|e| {
            tracing::warn!(trigger = %trigger, "rejected edit: {e}");
        })?;

        let mut next = self.macros.clone();
        if let Some(entry) = next.find_mut(trigger) {
            entry.output = output;
        }
        self.apply(next)?;
        self.discard_draft(trigger);

        tracing::info!(trigger = %trigger, index = idx, "committed macro");
        Ok(())
    }

    /// Appends a new macro after validating its output.
    ///
    /// A trigger that is already in use is not rejected; the earlier macro
    /// keeps shadowing the new one.
    pub fn add_macro<S: AsRef<str>>(&mut self, trigger: Trigger, output: &[S]) -> MacroResult<()> {
        let output = validate_output(output, &self.catalog)?;
        if self.macros.find(&trigger).is_some() {
            tracing::warn!(trigger = %trigger, "trigger already in use; new macro is shadowed");
        }

        let mut next = self.macros.clone();
        next.push(Macro::new(trigger.clone(), output));
        self.apply(next)?;

        tracing::info!(trigger = %trigger, "added macro");
        Ok(())
    }

    /// Removes the first macro with `trigger` and pushes the result.
    pub fn delete_macro(&mut self, trigger: &Trigger) -> MacroResult<Macro> {
        let mut next = self.macros.clone();
        let removed = next
            .remove(trigger)
            .ok_or_else(|| MacroError::NotFound(trigger.to_string()))?;
        self.apply(next)?;

        // Another macro may share the trigger; its draft must not survive either
        self.discard_draft(trigger);
        tracing::info!(trigger = %trigger, "deleted macro");
        Ok(removed)
    }

    /// Writes the committed set to the durable store.
    pub fn store_to_disk(&self) -> MacroResult<()> {
        self.sync.persist(&self.macros)
    }

    /// Replaces the committed set with the durable store and pushes it.
    ///
    /// Pending drafts are discarded.
    pub fn reload_from_disk(&mut self) -> MacroResult<()> {
        let restored = self.sync.restore(&self.catalog)?;
        self.apply(restored)?;
        self.drafts.clear();
        Ok(())
    }

    /// Pushes the committed set again after a failed push.
    pub fn retry_push(&mut self) -> MacroResult<()> {
        let current = self.macros.clone();
        self.apply(current)
    }

    /// Re-reads the kernel table and adopts it as the committed set.
    pub fn resync_from_kernel(&mut self) -> MacroResult<()> {
        self.macros = self.sync.pull_from_kernel(&self.catalog)?;
        self.drafts.clear();
        self.synced = true;
        Ok(())
    }

    /// Pushes `next` and makes it the committed set only if that worked.
    fn apply(&mut self, next: MacroSet) -> MacroResult<()> {
        match self.sync.push_to_kernel(&next) {
            Ok(()) => {
                self.macros = next;
                self.synced = true;
                Ok(())
            }
            Err(e) => {
                if e.is_sync() {
                    self.synced = false;
                }
                tracing::warn!("push to kernel failed: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use crate::parser::{parse_macro_text, parse_trigger};
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "KEY_A KEY_B KEY_C : KEY_X KEY_Y KEY_Y KEY_X\nKEY_D KEY_E KEY_F : KEY_Z KEY_Z";

    fn setup(initial: &str) -> (TempDir, MacroStore) {
        let temp_dir = TempDir::new().unwrap();
        let kernel = temp_dir.path().join("keymac_proc");
        fs::write(&kernel, initial).unwrap();

        let sync = SyncChannel::new(kernel, temp_dir.path().join("macros.txt"));
        let store = MacroStore::open(KeyCatalog::builtin(), sync).unwrap();
        (temp_dir, store)
    }

    fn trigger(store: &MacroStore, text: &str) -> Trigger {
        parse_trigger(text, store.catalog()).unwrap()
    }

    fn kernel_set(store: &MacroStore) -> MacroSet {
        let text = fs::read_to_string(store.sync_channel().kernel_file()).unwrap();
        parse_macro_text(&text, store.catalog()).unwrap()
    }

    fn names(keys: &[Key]) -> Vec<&str> {
        keys.iter().map(Key::name).collect()
    }

    #[test]
    fn test_open_reads_kernel_table() {
        let (_temp, store) = setup(SAMPLE);
        assert_eq!(store.list_macros().len(), 2);
        assert!(store.is_synced());
    }

    #[test]
    fn test_open_fails_on_malformed_kernel_file() {
        let temp_dir = TempDir::new().unwrap();
        let kernel = temp_dir.path().join("keymac_proc");
        fs::write(&kernel, "KEY_A KEY_B KEY_C KEY_X").unwrap();
        let sync = SyncChannel::new(kernel, temp_dir.path().join("macros.txt"));

        let err = MacroStore::open(KeyCatalog::builtin(), sync).unwrap_err();
        assert!(matches!(err, MacroError::Format { .. }));
    }

    #[test]
    fn test_commit_balanced_edit_pushes() {
        let (_temp, mut store) = setup("KEY_A KEY_B KEY_C : KEY_X KEY_Y");
        let t = trigger(&store, "KEY_A KEY_B KEY_C");

        store.commit_edit(&t, &["KEY_X", "KEY_X"]).unwrap();

        assert_eq!(names(&store.get(&t).unwrap().output), vec!["KEY_X", "KEY_X"]);
        assert_eq!(&kernel_set(&store), store.list_macros());
    }

    #[test]
    fn test_commit_unbalanced_edit_rejected() {
        let (_temp, mut store) = setup("KEY_A KEY_B KEY_C : KEY_X KEY_Y");
        let t = trigger(&store, "KEY_A KEY_B KEY_C");
        let before_kernel = fs::read_to_string(store.sync_channel().kernel_file()).unwrap();

        let err = store
            .commit_edit(&t, &["KEY_X", "KEY_Y", "KEY_X"])
            .unwrap_err();
        assert!(matches!(
            err,
            MacroError::UnbalancedKey { ref key, index: 1 } if key == "KEY_Y"
        ));

        assert_eq!(names(&store.get(&t).unwrap().output), vec!["KEY_X", "KEY_Y"]);
        assert_eq!(
            fs::read_to_string(store.sync_channel().kernel_file()).unwrap(),
            before_kernel
        );
    }

    #[test]
    fn test_commit_invalid_key_rejected() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_A KEY_B KEY_C");
        let before = store.list_macros().clone();

        let err = store.commit_edit(&t, &["KEY_X", "KEY_NOPE"]).unwrap_err();
        assert!(matches!(err, MacroError::InvalidKey(ref k) if k == "KEY_NOPE"));
        assert_eq!(store.list_macros(), &before);
    }

    #[test]
    fn test_commit_unknown_trigger() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_Q KEY_W KEY_E");
        assert!(matches!(
            store.commit_edit(&t, &["KEY_X", "KEY_X"]),
            Err(MacroError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_slots_grows_draft_by_two_without_pushing() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_D KEY_E KEY_F");

        assert_eq!(store.add_output_slots(&t).unwrap(), 4);
        assert_eq!(store.add_output_slots(&t).unwrap(), 6);
        assert_eq!(
            names(store.draft_output(&t).unwrap()),
            vec!["KEY_Z", "KEY_Z", "KEY_A", "KEY_A", "KEY_A", "KEY_A"]
        );

        // Committed set and kernel are untouched until commit
        assert_eq!(store.get(&t).unwrap().output.len(), 2);
        assert_eq!(&kernel_set(&store), store.list_macros());

        store.commit_draft(&t).unwrap();
        assert_eq!(store.get(&t).unwrap().output.len(), 6);
        assert!(!store.has_draft(&t));
        assert_eq!(&kernel_set(&store), store.list_macros());
    }

    #[test]
    fn test_remove_slots_and_underflow() {
        let (_temp, mut store) = setup("KEY_A KEY_B KEY_C : KEY_X KEY_X\nKEY_D KEY_E KEY_F :");
        let t = trigger(&store, "KEY_A KEY_B KEY_C");

        assert_eq!(store.remove_output_slots(&t).unwrap(), 0);
        assert!(matches!(
            store.remove_output_slots(&t),
            Err(MacroError::Underflow { len: 0 })
        ));

        let empty = trigger(&store, "KEY_D KEY_E KEY_F");
        assert!(matches!(
            store.remove_output_slots(&empty),
            Err(MacroError::Underflow { len: 0 })
        ));
    }

    #[test]
    fn test_remove_slots_can_unbalance_draft_but_not_kernel() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_A KEY_B KEY_C");

        assert_eq!(store.remove_output_slots(&t).unwrap(), 2);
        assert!(matches!(
            store.commit_draft(&t),
            Err(MacroError::UnbalancedKey { .. })
        ));
        assert_eq!(store.get(&t).unwrap().output.len(), 4);
        assert!(store.has_draft(&t));

        store.discard_draft(&t);
        assert_eq!(store.draft_output(&t).unwrap().len(), 4);
    }

    #[test]
    fn test_emptied_draft_cannot_be_committed() {
        let (_temp, mut store) = setup("KEY_A KEY_B KEY_C : KEY_X KEY_X\nKEY_D KEY_E KEY_F : KEY_Z KEY_Z");
        let t = trigger(&store, "KEY_A KEY_B KEY_C");
        let before = store.list_macros().clone();

        assert_eq!(store.remove_output_slots(&t).unwrap(), 0);
        assert!(matches!(
            store.commit_draft(&t),
            Err(MacroError::EmptyOutput(ref name)) if name == "KEY_A KEY_B KEY_C"
        ));
        assert_eq!(store.list_macros(), &before);
        assert_eq!(kernel_set(&store), before);
        assert!(store.is_synced());

        let empty: [&str; 0] = [];
        let other = trigger(&store, "KEY_Q KEY_W KEY_E");
        assert!(matches!(
            store.add_macro(other, &empty),
            Err(MacroError::EmptyOutput(_))
        ));
        assert_eq!(store.list_macros(), &before);
    }

    #[test]
    fn test_rebind_slot() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_D KEY_E KEY_F");

        store.rebind_slot(&t, 0, "KEY_Q").unwrap();
        store.rebind_slot(&t, 1, "16").unwrap();
        assert_eq!(names(store.draft_output(&t).unwrap()), vec!["KEY_Q", "KEY_Q"]);

        assert!(matches!(
            store.rebind_slot(&t, 0, "KEY_BOGUS"),
            Err(MacroError::UnknownKey(_))
        ));
        assert!(matches!(
            store.rebind_slot(&t, 2, "KEY_Q"),
            Err(MacroError::SlotOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(names(store.draft_output(&t).unwrap()), vec!["KEY_Q", "KEY_Q"]);
    }

    #[test]
    fn test_slot_ops_on_missing_macro() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_Q KEY_W KEY_E");
        assert!(matches!(store.add_output_slots(&t), Err(MacroError::NotFound(_))));
        assert!(matches!(store.remove_output_slots(&t), Err(MacroError::NotFound(_))));
        assert!(!store.has_draft(&t));
    }

    #[test]
    fn test_custom_default_slot_key() {
        let (_temp, store) = setup(SAMPLE);
        let mut store = store.with_default_slot_key("KEY_SPACE").unwrap();
        let t = trigger(&store, "KEY_D KEY_E KEY_F");
        store.add_output_slots(&t).unwrap();
        assert_eq!(
            names(store.draft_output(&t).unwrap()),
            vec!["KEY_Z", "KEY_Z", "KEY_SPACE", "KEY_SPACE"]
        );
    }

    #[test]
    fn test_delete_macro_then_not_found() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_A KEY_B KEY_C");

        let removed = store.delete_macro(&t).unwrap();
        assert_eq!(removed.output.len(), 4);
        assert_eq!(store.list_macros().len(), 1);
        assert_eq!(&kernel_set(&store), store.list_macros());

        assert!(matches!(store.delete_macro(&t), Err(MacroError::NotFound(_))));
    }

    #[test]
    fn test_delete_affects_first_duplicate_only() {
        let (_temp, mut store) =
            setup("KEY_A KEY_B KEY_C : KEY_X KEY_X\nKEY_A KEY_B KEY_C : KEY_Y KEY_Y");
        let t = trigger(&store, "KEY_A KEY_B KEY_C");

        store.delete_macro(&t).unwrap();
        assert_eq!(names(&store.get(&t).unwrap().output), vec!["KEY_Y", "KEY_Y"]);
    }

    #[test]
    fn test_add_macro() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_LEFTCTRL KEY_LEFTSHIFT KEY_3");

        store
            .add_macro(t.clone(), &["KEY_LEFTSHIFT", "KEY_H", "KEY_H", "KEY_LEFTSHIFT"])
            .unwrap();
        assert_eq!(store.list_macros().len(), 3);
        assert_eq!(&kernel_set(&store), store.list_macros());

        let other = trigger(&store, "KEY_LEFTCTRL KEY_LEFTSHIFT KEY_4");
        assert!(matches!(
            store.add_macro(other, &["KEY_H"]),
            Err(MacroError::UnbalancedKey { .. })
        ));
        assert_eq!(store.list_macros().len(), 3);
    }

    #[test]
    fn test_add_macro_respects_kernel_capacity() {
        let temp_dir = TempDir::new().unwrap();
        let kernel = temp_dir.path().join("keymac_proc");
        fs::write(&kernel, SAMPLE).unwrap();
        let sync = SyncChannel::new(kernel, temp_dir.path().join("macros.txt")).with_limits(
            KernelConfig {
                max_macros: 2,
                max_payload_bytes: 1000,
            },
        );
        let mut store = MacroStore::open(KeyCatalog::builtin(), sync).unwrap();
        let t = trigger(&store, "KEY_Q KEY_W KEY_E");

        assert!(matches!(
            store.add_macro(t, &["KEY_X", "KEY_X"]),
            Err(MacroError::CapacityExceeded { .. })
        ));
        assert_eq!(store.list_macros().len(), 2);
        assert!(store.is_synced());
    }

    #[test]
    fn test_failed_push_keeps_memory_and_flags_unsynced() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_A KEY_B KEY_C");
        let before = store.list_macros().clone();

        fs::remove_file(store.sync_channel().kernel_file()).unwrap();
        let err = store.commit_edit(&t, &["KEY_Q", "KEY_Q"]).unwrap_err();
        assert!(err.is_sync());
        assert!(!store.is_synced());
        assert_eq!(store.list_macros(), &before);

        // Module comes back: retry pushes the last good set
        fs::write(store.sync_channel().kernel_file(), "").unwrap();
        store.retry_push().unwrap();
        assert!(store.is_synced());
        assert_eq!(kernel_set(&store), before);
    }

    #[test]
    fn test_resync_from_kernel() {
        let (_temp, mut store) = setup(SAMPLE);
        let t = trigger(&store, "KEY_A KEY_B KEY_C");
        store.add_output_slots(&t).unwrap();

        fs::write(store.sync_channel().kernel_file(), "29 42 2 : 30 30").unwrap();
        store.resync_from_kernel().unwrap();

        assert_eq!(store.list_macros().len(), 1);
        assert!(!store.has_draft(&t));
    }

    #[test]
    fn test_store_and_reload() {
        let (_temp, mut store) = setup(SAMPLE);
        store.store_to_disk().unwrap();

        let t = trigger(&store, "KEY_A KEY_B KEY_C");
        store.delete_macro(&t).unwrap();
        assert_eq!(store.list_macros().len(), 1);

        store.reload_from_disk().unwrap();
        let first = store.list_macros().clone();
        assert_eq!(first.len(), 2);
        assert_eq!(kernel_set(&store), first);

        store.reload_from_disk().unwrap();
        assert_eq!(store.list_macros(), &first);
    }

    #[test]
    fn test_reload_without_store_file() {
        let (_temp, mut store) = setup(SAMPLE);
        let before = store.list_macros().clone();
        assert!(store.reload_from_disk().unwrap_err().is_sync());
        assert_eq!(store.list_macros(), &before);
    }
}
