//! Import, export and backup of the state document.
//!
//! Import validation fails closed: a document that is not structurally
//! sound is rejected before anything is merged, leaving the current state
//! untouched. Merging never overwrites -- records and reminders already
//! present (by id) silently win over incoming ones.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::record::Record;
use crate::reminder::Reminder;
use crate::storage::{data_dir, State, StateStore};

/// How a merge treats the settings object of the incoming document.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Shallow key-overwrite of settings; off unless the user asked for it.
    pub include_settings: bool,
}

/// Check that `doc` is an importable document.
///
/// Requirements: a JSON object carrying `records` and/or `reminders` as
/// arrays; every record has `type` and `timestamp`; every reminder has
/// `title` and `time`.
pub fn validate(doc: &Value) -> Result<(), ValidationError> {
    let Some(obj) = doc.as_object() else {
        return Err(ValidationError::NotAnObject);
    };

    let records = obj.get("records").and_then(Value::as_array);
    let reminders = obj.get("reminders").and_then(Value::as_array);
    if records.is_none() && reminders.is_none() {
        return Err(ValidationError::NoImportableData);
    }

    if let Some(records) = records {
        for (index, record) in records.iter().enumerate() {
            for field in ["type", "timestamp"] {
                if record.get(field).map_or(true, Value::is_null) {
                    return Err(ValidationError::BadRecord { index, field });
                }
            }
        }
    }
    if let Some(reminders) = reminders {
        for (index, reminder) in reminders.iter().enumerate() {
            for field in ["title", "time"] {
                if reminder.get(field).map_or(true, Value::is_null) {
                    return Err(ValidationError::BadReminder { index, field });
                }
            }
        }
    }

    Ok(())
}

/// Merge a validated document into `current`.
///
/// Records and reminders are deduplicated by id: only ids unseen in
/// `current` are appended, id collisions drop the incoming entry. Elements
/// that fail the typed decode are skipped. The merged state is stamped with
/// `last_backup = now`. Merging the same document twice therefore yields
/// the same set as merging it once.
pub fn merge(current: &State, doc: &Value, options: MergeOptions, now: DateTime<Utc>) -> (State, Event) {
    let mut merged = current.clone();
    let mut new_records = 0;
    let mut new_reminders = 0;

    if let Some(items) = doc.get("records").and_then(Value::as_array) {
        let seen: std::collections::HashSet<&str> =
            current.records.iter().map(|r| r.id.as_str()).collect();
        for item in items {
            let Ok(record) = serde_json::from_value::<Record>(item.clone()) else {
                continue;
            };
            if record.id.is_empty() || seen.contains(record.id.as_str()) {
                continue;
            }
            if merged.records.iter().skip(current.records.len()).any(|r| r.id == record.id) {
                // Duplicate id inside the incoming document itself.
                continue;
            }
            merged.records.push(record);
            new_records += 1;
        }
    }

    if let Some(items) = doc.get("reminders").and_then(Value::as_array) {
        let seen: std::collections::HashSet<&str> =
            current.reminders.iter().map(|r| r.id.as_str()).collect();
        for item in items {
            let Ok(reminder) = serde_json::from_value::<Reminder>(item.clone()) else {
                continue;
            };
            if reminder.id.is_empty() || seen.contains(reminder.id.as_str()) {
                continue;
            }
            if merged
                .reminders
                .iter()
                .skip(current.reminders.len())
                .any(|r| r.id == reminder.id)
            {
                continue;
            }
            merged.reminders.push(reminder);
            new_reminders += 1;
        }
    }

    if options.include_settings {
        if let Some(Value::Object(map)) = doc.get("settings") {
            merged.settings = merged.settings.overlay(map);
        }
    }

    merged.last_backup = Some(now);
    merged.touch(now);

    let event = Event::DataImported {
        new_records,
        new_reminders,
        at: now,
    };
    (merged, event)
}

/// Render the full document as pretty JSON (the downloadable export).
pub fn export_document(state: &State) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Write an export to `path`, stamping `last_backup` on the state first.
/// The caller persists the stamped state through its store.
pub fn export_to_file(state: &mut State, path: &PathBuf, now: DateTime<Utc>) -> Result<Event> {
    state.last_backup = Some(now);
    let content = export_document(state)?;
    std::fs::write(path, content).map_err(CoreError::Io)?;
    Ok(Event::BackupWritten {
        path: path.display().to_string(),
        at: now,
    })
}

/// Daily safety net: when `last_backup` is absent or older than 24 hours,
/// write a dated snapshot under `data_dir()/backups/` and stamp the state.
/// Returns `None` when the last backup is still fresh.
pub fn auto_backup(
    store: &StateStore,
    state: &mut State,
    now: DateTime<Utc>,
) -> Result<Option<Event>> {
    const DAY_MS: i64 = 86_400_000;
    if let Some(last) = state.last_backup {
        if now.timestamp_millis() - last.timestamp_millis() <= DAY_MS {
            return Ok(None);
        }
    }

    let backup_dir = data_dir()?.join("backups");
    std::fs::create_dir_all(&backup_dir).map_err(CoreError::Io)?;
    let path = backup_dir.join(format!("babylog_backup_{}.json", now.format("%Y-%m-%d")));
    let event = export_to_file(state, &path, now)?;
    store.save(state).map_err(CoreError::Storage)?;
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> Value {
        json!({
            "records": [
                { "id": "rec1", "type": "feeding", "timestamp": 1000, "amount": 120 },
                { "id": "rec2", "type": "bath", "timestamp": 2000, "duration": 8 }
            ],
            "reminders": [
                { "id": "rem1", "title": "Feed", "time": 5000, "repeat": "daily",
                  "type": "feeding", "active": true, "createdAt": 1 }
            ],
            "settings": { "babyName": "Imported", "theme": "dark" }
        })
    }

    #[test]
    fn validate_accepts_well_formed_documents() {
        assert!(validate(&sample_doc()).is_ok());
        // Either array alone is enough.
        assert!(validate(&json!({ "records": [] })).is_ok());
        assert!(validate(&json!({ "reminders": [] })).is_ok());
    }

    #[test]
    fn validate_fails_closed() {
        assert!(matches!(
            validate(&json!([1, 2, 3])),
            Err(ValidationError::NotAnObject)
        ));
        assert!(matches!(
            validate(&json!({ "settings": {} })),
            Err(ValidationError::NoImportableData)
        ));
        assert!(matches!(
            validate(&json!({ "records": [{ "type": "feeding" }] })),
            Err(ValidationError::BadRecord { index: 0, field: "timestamp" })
        ));
        assert!(matches!(
            validate(&json!({ "reminders": [{ "time": 1 }] })),
            Err(ValidationError::BadReminder { index: 0, field: "title" })
        ));
    }

    #[test]
    fn merge_appends_only_unseen_ids() {
        let now = Utc::now();
        let (state, event) = merge(&State::default(), &sample_doc(), MergeOptions::default(), now);
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.reminders.len(), 1);
        assert!(matches!(
            event,
            Event::DataImported { new_records: 2, new_reminders: 1, .. }
        ));

        // An id collision drops the incoming entry instead of updating.
        let mut doc = sample_doc();
        doc["records"][0]["amount"] = json!(999);
        let (again, event) = merge(&state, &doc, MergeOptions::default(), now);
        assert_eq!(again.records.len(), 2);
        assert!(matches!(
            event,
            Event::DataImported { new_records: 0, new_reminders: 0, .. }
        ));
    }

    #[test]
    fn merge_is_idempotent() {
        let now = Utc::now();
        let (once, _) = merge(&State::default(), &sample_doc(), MergeOptions::default(), now);
        let (twice, _) = merge(&once, &sample_doc(), MergeOptions::default(), now);
        assert_eq!(once.records.len(), twice.records.len());
        assert_eq!(once.reminders.len(), twice.reminders.len());
    }

    #[test]
    fn merge_settings_only_on_request() {
        let now = Utc::now();
        let (without, _) = merge(&State::default(), &sample_doc(), MergeOptions::default(), now);
        assert_eq!(without.settings.baby_name, "Baby");

        let (with, _) = merge(
            &State::default(),
            &sample_doc(),
            MergeOptions {
                include_settings: true,
            },
            now,
        );
        assert_eq!(with.settings.baby_name, "Imported");
        assert_eq!(with.settings.theme, "dark");
        // Keys the document does not carry stay as they were.
        assert!(with.settings.sound_enabled);
    }

    #[test]
    fn merge_stamps_last_backup() {
        let now = Utc::now();
        let (state, _) = merge(&State::default(), &sample_doc(), MergeOptions::default(), now);
        assert_eq!(state.last_backup, Some(now));
    }

    #[test]
    fn merge_skips_undecodable_elements() {
        let doc = json!({
            "records": [
                { "id": "ok", "type": "bath", "timestamp": 1 },
                { "id": "bad", "type": "spaceship", "timestamp": 2 }
            ]
        });
        let (state, _) = merge(&State::default(), &doc, MergeOptions::default(), Utc::now());
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].id, "ok");
    }

    #[test]
    fn export_roundtrips_through_validate_and_merge() {
        let now = Utc::now();
        let (state, _) = merge(&State::default(), &sample_doc(), MergeOptions::default(), now);
        let exported = export_document(&state).unwrap();
        let doc: Value = serde_json::from_str(&exported).unwrap();
        assert!(validate(&doc).is_ok());

        let (merged, event) = merge(&state, &doc, MergeOptions::default(), now);
        assert_eq!(merged.records.len(), state.records.len());
        assert!(matches!(event, Event::DataImported { new_records: 0, .. }));
    }
}
