//! The persisted application state.
//!
//! The whole application owns exactly one JSON document:
//! records, reminders, settings and the backup/update stamps. Components
//! never reach for ambient storage -- they receive a `&mut State`, mutate
//! it, and the caller persists through [`StateStore`](super::StateStore).
//!
//! The wire shape keeps the field names of the original web app
//! (camelCase, `lastUpdated` in epoch milliseconds, `lastBackup` as an
//! RFC 3339 string).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::reminder::Reminder;

/// User preferences embedded in the state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub baby_name: String,
    pub baby_birthday: String,
    pub theme: String,
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    pub music_volume: f64,
    pub reminder_sound: String,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            baby_name: default_baby_name(),
            baby_birthday: String::new(),
            theme: default_theme(),
            notifications_enabled: true,
            sound_enabled: true,
            vibration_enabled: true,
            music_volume: default_music_volume(),
            reminder_sound: default_reminder_sound(),
            language: default_language(),
        }
    }
}

fn default_baby_name() -> String {
    "Baby".into()
}
fn default_theme() -> String {
    "light".into()
}
fn default_music_volume() -> f64 {
    0.7
}
fn default_reminder_sound() -> String {
    "default".into()
}
fn default_language() -> String {
    "en-US".into()
}

/// Top-level persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct State {
    pub records: Vec<Record>,
    pub reminders: Vec<Reminder>,
    pub settings: Settings,
    /// Epoch milliseconds of the last mutation. Stamped by mutating
    /// operations, never by `save` itself, so an untouched round trip is
    /// byte-stable.
    pub last_updated: i64,
    /// When the document was last exported or merged from a backup.
    #[serde(with = "last_backup_format")]
    pub last_backup: Option<DateTime<Utc>>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            reminders: Vec::new(),
            settings: Settings::default(),
            last_updated: 0,
            last_backup: None,
        }
    }
}

impl State {
    /// Rebuild a structurally valid state from an arbitrary JSON document.
    ///
    /// Field-by-field merge against defaults: the record and reminder arrays
    /// are taken when present, with malformed elements discarded
    /// individually; settings merge key by key over the defaults; everything
    /// else falls back to its default. A document that is not an object
    /// yields the default state.
    pub fn from_document(doc: &serde_json::Value) -> Self {
        let mut state = State::default();
        let Some(obj) = doc.as_object() else {
            return state;
        };

        if let Some(arr) = obj.get("records").and_then(|v| v.as_array()) {
            state.records = arr
                .iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect();
        }
        if let Some(arr) = obj.get("reminders").and_then(|v| v.as_array()) {
            state.reminders = arr
                .iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect();
        }
        if let Some(serde_json::Value::Object(map)) = obj.get("settings") {
            state.settings = merge_settings(map);
        }
        if let Some(ms) = obj.get("lastUpdated").and_then(|v| v.as_i64()) {
            state.last_updated = ms;
        }
        if let Some(v) = obj.get("lastBackup") {
            state.last_backup = last_backup_format::parse(v);
        }

        state
    }

    /// Stamp the mutation time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now.timestamp_millis();
    }
}

/// Overlay user-supplied settings keys onto `base` defaults.
fn merge_settings(map: &serde_json::Map<String, serde_json::Value>) -> Settings {
    Settings::default().overlay(map)
}

impl Settings {
    /// Get a settings value as string by its wire key (e.g. "babyName").
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by wire key, parsing `value` against the
    /// existing type. Unknown keys are an error.
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| crate::error::CoreError::Custom("settings are not an object".into()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| crate::error::CoreError::Custom(format!("unknown settings key: {key}")))?;

        let bad_value = |message: String| {
            crate::error::ValidationError::InvalidValue {
                field: key.to_string(),
                message,
            }
        };
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| bad_value(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<f64>()
                    .map_err(|_| bad_value(format!("cannot parse '{value}' as number")))?;
                serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| bad_value(format!("cannot represent '{value}' as number")))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(key.to_string(), new_value);
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Shallow key-overwrite: keys from `map` replace this settings' values.
    ///
    /// A key whose value does not decode against the settings shape (wrong
    /// type) is dropped; the other keys still apply.
    pub fn overlay(&self, map: &serde_json::Map<String, serde_json::Value>) -> Settings {
        let mut base = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(m)) => m,
            _ => return self.clone(),
        };
        for (key, value) in map {
            let previous = base.insert(key.clone(), value.clone());
            let candidate = serde_json::Value::Object(base.clone());
            if serde_json::from_value::<Settings>(candidate).is_err() {
                match previous {
                    Some(old) => {
                        base.insert(key.clone(), old);
                    }
                    None => {
                        base.remove(key);
                    }
                }
            }
        }
        serde_json::from_value(serde_json::Value::Object(base)).unwrap_or_else(|_| self.clone())
    }
}

/// `lastBackup` is written as an RFC 3339 string (what the original app
/// produced) but epoch milliseconds are accepted on input.
mod last_backup_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(parse(&value))
    }

    pub fn parse(value: &serde_json::Value) -> Option<DateTime<Utc>> {
        match value {
            serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            serde_json::Value::Number(n) => {
                n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis)
            }
            _ => None,
        }
    }
}
