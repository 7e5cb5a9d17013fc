//! Slot-based save storage.
//!
//! Each slot is a directory under the store root holding `save.json` and,
//! after the first overwrite, `save.bak`. Loading a slot whose primary file
//! is corrupt or unmigratable falls back to the backup and restores it.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{SaveError, SaveResult};
use crate::file::{backup_path, read_json, write_json_atomic};
use crate::migrate::migrate;
use crate::record::{SaveMetadata, SaveRecord};

/// File name of the primary save inside a slot directory.
pub const SAVE_FILE: &str = "save.json";
/// File name of the backup inside a slot directory.
pub const BACKUP_FILE: &str = "save.bak";
/// Slot written by the engine after every step.
pub const AUTOSAVE_SLOT: &str = "autosave";
/// Slot used by quick-save and quick-load.
pub const QUICK_SLOT: &str = "quick";

/// Lowercase a slot name and keep only `[a-z0-9_-]`.
pub fn normalize_slot(name: &str) -> SaveResult<String> {
    let slot: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if slot.is_empty() {
        return Err(SaveError::InvalidSlot(name.to_string()));
    }
    Ok(slot)
}

/// Read a save file, migrating it to the current schema.
pub fn load_save(path: &Path) -> SaveResult<Option<SaveRecord>> {
    let Some(raw) = read_json::<Value>(path)? else {
        return Ok(None);
    };
    let doc = migrate(raw)?;
    serde_json::from_value(doc)
        .map(Some)
        .map_err(|e| SaveError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Write a save file atomically, keeping the previous one as a backup.
pub fn write_save(path: &Path, record: &SaveRecord) -> SaveResult<()> {
    write_json_atomic(path, record)
}

/// A directory of save slots.
#[derive(Debug, Clone)]
pub struct SaveStore {
    root: PathBuf,
}

impl SaveStore {
    /// Open a store rooted at `root`. Nothing is created until the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the primary file for an already-normalized slot.
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(slot).join(SAVE_FILE)
    }

    /// Save to a user slot. The autosave slot is refused.
    pub fn save(&self, slot: &str, record: &SaveRecord) -> SaveResult<String> {
        let slot = normalize_slot(slot)?;
        if slot == AUTOSAVE_SLOT {
            return Err(SaveError::ReservedSlot);
        }
        self.write_slot(&slot, record)?;
        Ok(slot)
    }

    /// Save to the autosave slot.
    pub fn autosave(&self, record: &SaveRecord) -> SaveResult<()> {
        self.write_slot(AUTOSAVE_SLOT, record)
    }

    fn write_slot(&self, slot: &str, record: &SaveRecord) -> SaveResult<()> {
        let mut record = record.clone();
        record.metadata.slot = slot.to_string();
        write_save(&self.slot_path(slot), &record)?;
        tracing::info!(slot, "game saved");
        Ok(())
    }

    /// Load a slot. A corrupt primary falls back to the backup, which is
    /// then written back as the new primary.
    pub fn load(&self, slot: &str) -> SaveResult<SaveRecord> {
        let slot = normalize_slot(slot)?;
        let primary = self.slot_path(&slot);
        let backup = backup_path(&primary);

        let primary_err = match load_save(&primary) {
            Ok(Some(mut record)) => {
                record.metadata.slot = slot;
                return Ok(record);
            }
            Ok(None) => None,
            Err(e) => Some(e),
        };

        match load_save(&backup) {
            Ok(Some(mut record)) => {
                if let Some(e) = &primary_err {
                    tracing::warn!(slot = %slot, error = %e, "primary save unreadable, restored from backup");
                }
                record.metadata.slot = slot;
                if let Err(e) = fs::copy(&backup, &primary) {
                    tracing::warn!(error = %e, "failed to restore primary save from backup");
                }
                Ok(record)
            }
            Ok(None) => Err(primary_err.unwrap_or(SaveError::NotFound(slot))),
            Err(backup_err) => {
                tracing::warn!(slot = %slot, error = %backup_err, "backup save unreadable");
                Err(primary_err.unwrap_or(backup_err))
            }
        }
    }

    /// Metadata of every loadable slot, sorted by slot name. The autosave
    /// slot is listed only when `include_autosave` is set.
    pub fn list_slots(&self, include_autosave: bool) -> SaveResult<Vec<SaveMetadata>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SaveError::Io {
                    action: "failed to list",
                    path: self.root.clone(),
                    source,
                });
            }
        };

        let mut slots = Vec::new();
        for entry in entries.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == AUTOSAVE_SLOT && !include_autosave {
                continue;
            }
            match self.load(&name) {
                Ok(record) => slots.push(record.metadata),
                Err(e) => tracing::debug!(slot = %name, error = %e, "skipping unreadable slot"),
            }
        }
        slots.sort_by(|a, b| a.slot.cmp(&b.slot));
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::FlagValue;
    use pw_fiction::{PlayerState, Transition};

    fn sample_state() -> PlayerState {
        let mut state = PlayerState::new("square", 7);
        state.start_id = Some("docks".into());
        state.tick_counter = 13;
        state.tags.insert("Weaver".into());
        state.traits.insert("Tide-Touched".into());
        state.add_item("rope", 2);
        state.set_flag("met_guide", Some(FlagValue::Boolean(true)));
        state.reputation.insert("Root Court".into(), 3);
        state.history.push(Transition {
            from: "docks".into(),
            to: "square".into(),
            choice: "Walk uphill".into(),
        });
        state
    }

    #[test]
    fn slot_names_are_normalized() {
        assert_eq!(normalize_slot("  My Slot!1 ").unwrap(), "myslot1");
        assert_eq!(normalize_slot("run_a-b").unwrap(), "run_a-b");
        assert!(matches!(normalize_slot(" ?! "), Err(SaveError::InvalidSlot(_))));
    }

    #[test]
    fn save_then_load_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        let story = pw_core::Story::new("Isles");
        let record = SaveRecord::new("x", sample_state()).for_story(&story);

        let slot = store.save("Slot One", &record).unwrap();
        assert_eq!(slot, "slotone");

        let loaded = store.load("slotone").unwrap();
        assert_eq!(loaded.state, sample_state());
        assert!(loaded.state.traits.contains("Tide-Touched"));
        assert_eq!(loaded.metadata.slot, "slotone");
        assert!(loaded.matches_story(&story));
        assert_eq!(loaded.metadata.story_title.as_deref(), Some("Isles"));
        assert_eq!(loaded.version, 2);
    }

    #[test]
    fn autosave_slot_is_reserved_for_users() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        let record = SaveRecord::new("", sample_state());
        assert!(matches!(
            store.save("AutoSave", &record),
            Err(SaveError::ReservedSlot)
        ));
        store.autosave(&record).unwrap();
        assert_eq!(store.load(AUTOSAVE_SLOT).unwrap().state, sample_state());
    }

    #[test]
    fn backup_sits_next_to_primary() {
        let store = SaveStore::new("saves");
        let backup = backup_path(&store.slot_path(QUICK_SLOT));
        assert_eq!(backup, Path::new("saves").join(QUICK_SLOT).join(BACKUP_FILE));
    }

    #[test]
    fn missing_slot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        assert!(matches!(store.load("nothing"), Err(SaveError::NotFound(_))));
    }

    #[test]
    fn corrupt_primary_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        let first = SaveRecord::new("", sample_state());
        store.save(QUICK_SLOT, &first).unwrap();
        let mut later = sample_state();
        later.current_node = "harbor".into();
        store.save(QUICK_SLOT, &SaveRecord::new("", later)).unwrap();

        let primary = store.slot_path(QUICK_SLOT);
        fs::write(&primary, "{ truncated").unwrap();

        let loaded = store.load(QUICK_SLOT).unwrap();
        assert_eq!(loaded.state.current_node, "square");
        // The backup was written back as the primary.
        let restored = load_save(&primary).unwrap().unwrap();
        assert_eq!(restored.state.current_node, "square");
    }

    #[test]
    fn corrupt_without_backup_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        let primary = store.slot_path("broken");
        fs::create_dir_all(primary.parent().unwrap()).unwrap();
        fs::write(&primary, "[]").unwrap();
        assert!(matches!(store.load("broken"), Err(SaveError::Migration(_))));
    }

    #[test]
    fn legacy_save_is_migrated_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        let primary = store.slot_path("old");
        fs::create_dir_all(primary.parent().unwrap()).unwrap();
        fs::write(
            &primary,
            r#"{"current_node": "dock", "player": {"hp": 4, "items": {"rope": 1}}}"#,
        )
        .unwrap();

        let record = store.load("old").unwrap();
        assert_eq!(record.version, 2);
        assert_eq!(record.state.current_node, "dock");
        assert_eq!(record.state.hp, 4);
        assert_eq!(record.state.item_count("rope"), 1);
        assert!(record.metadata.saved_at.is_none());
    }

    #[test]
    fn listing_hides_autosave_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        let record = SaveRecord::new("", sample_state());
        store.save("beta", &record).unwrap();
        store.save("alpha", &record).unwrap();
        store.autosave(&record).unwrap();

        let names: Vec<String> = store
            .list_slots(false)
            .unwrap()
            .into_iter()
            .map(|m| m.slot)
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(store.list_slots(true).unwrap().len(), 3);
    }

    #[test]
    fn listing_a_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("never-created"));
        assert!(store.list_slots(true).unwrap().is_empty());
    }
}
