//! File-backed persistence for the single state document.
//!
//! Loading is infallible by contract: a missing file, unreadable bytes or a
//! malformed document all degrade to a structurally valid default (with
//! whatever valid pieces survived). Saving filters out entries that lost
//! their identity and maps a full disk to a distinct quota error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{data_dir, State};
use crate::error::StorageError;

/// The 5 MiB budget the original web storage assumed; used for the usage
/// report only, never enforced.
pub const STORAGE_BUDGET_BYTES: u64 = 5 * 1024 * 1024;

/// Handle to the persisted JSON document.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

/// How much of the storage budget the document occupies.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub used_bytes: u64,
    pub budget_bytes: u64,
    pub used_percent: f64,
}

impl StateStore {
    /// Open the store at the default location (`data_dir()/data.json`).
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self {
            path: data_dir()?.join("data.json"),
        })
    }

    /// Open a store at a custom path (tests, tooling).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted state. Never fails the caller: on absence or any
    /// parse problem, a default (or partially recovered) state is returned.
    pub fn load(&self) -> State {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return State::default(),
        };
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(doc) => State::from_document(&doc),
            Err(_) => State::default(),
        }
    }

    /// Persist the state. Entries missing their identity fields (record
    /// without an id, reminder without an id or title) are dropped before
    /// writing.
    pub fn save(&self, state: &State) -> Result<(), StorageError> {
        let mut doc = state.clone();
        doc.records.retain(|r| !r.id.is_empty());
        doc.reminders
            .retain(|r| !r.id.is_empty() && !r.title.is_empty());

        let content =
            serde_json::to_string_pretty(&doc).map_err(|e| StorageError::WriteFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        std::fs::write(&self.path, content).map_err(|e| {
            if e.kind() == ErrorKind::StorageFull || e.kind() == ErrorKind::QuotaExceeded {
                StorageError::QuotaExceeded {
                    path: self.path.clone(),
                }
            } else {
                StorageError::WriteFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                }
            }
        })
    }

    /// Remove the persisted document. `Ok(false)` when nothing existed.
    pub fn clear(&self) -> Result<bool, StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::WriteFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// Size of the document on disk against the storage budget.
    pub fn usage(&self) -> Result<StorageUsage, StorageError> {
        let used_bytes = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };
        Ok(StorageUsage {
            used_bytes,
            budget_bytes: STORAGE_BUDGET_BYTES,
            used_percent: used_bytes as f64 / STORAGE_BUDGET_BYTES as f64 * 100.0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, RecordDetail};
    use crate::reminder::{Reminder, Repeat};

    fn store(dir: &tempfile::TempDir) -> StateStore {
        StateStore::with_path(dir.path().join("data.json"))
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = store(&dir).load();
        assert!(state.records.is_empty());
        assert_eq!(state.settings.baby_name, "Baby");
    }

    #[test]
    fn load_garbage_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "{not json at all").unwrap();
        let state = store.load();
        assert!(state.records.is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let mut state = State::default();
        state.records.push(Record {
            id: "a".into(),
            timestamp: 42,
            time: None,
            detail: RecordDetail::Bath {
                duration: Some(10.0),
                notes: Some("splashy".into()),
            },
        });
        store.save(&state).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].id, "a");
    }

    #[test]
    fn save_filters_identityless_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let mut state = State::default();
        state.records.push(Record {
            id: String::new(),
            timestamp: 1,
            time: None,
            detail: RecordDetail::Diaper {
                diaper_type: None,
                notes: None,
            },
        });
        state.reminders.push(Reminder {
            id: "r".into(),
            title: String::new(),
            time: 1,
            repeat: Repeat::Once,
            kind: String::new(),
            active: true,
            created_at: 0,
        });
        store.save(&state).unwrap();

        let loaded = store.load();
        assert!(loaded.records.is_empty());
        assert!(loaded.reminders.is_empty());
    }

    #[test]
    fn unmutated_save_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let mut state = State::default();
        state.records.push(Record {
            id: "a".into(),
            timestamp: 42,
            time: None,
            detail: RecordDetail::Feeding {
                amount: Some(90.0),
                method: Some("bottle".into()),
                side: None,
                notes: None,
            },
        });
        store.save(&state).unwrap();
        let first = std::fs::read(store.path()).unwrap();

        store.save(&store.load()).unwrap();
        let second = std::fs::read(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn clear_reports_whether_anything_existed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(!store.clear().unwrap());
        store.save(&State::default()).unwrap();
        assert!(store.clear().unwrap());
        assert!(store.load().records.is_empty());
    }

    #[test]
    fn usage_tracks_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert_eq!(store.usage().unwrap().used_bytes, 0);
        store.save(&State::default()).unwrap();
        let usage = store.usage().unwrap();
        assert!(usage.used_bytes > 0);
        assert!(usage.used_percent > 0.0);
        assert_eq!(usage.budget_bytes, STORAGE_BUDGET_BYTES);
    }
}
