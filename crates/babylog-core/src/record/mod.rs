//! Logged care events.
//!
//! A [`Record`] is one timestamped event of a fixed category. The category
//! and its fields form a tagged union ([`RecordDetail`]) so each variant
//! carries only the fields that belong to it, while the wire shape stays the
//! flat `{id, type, timestamp, ...}` object the original document used.

mod log;
mod stats;

pub use log::{
    add_record, complete_sleep, delete_record, purge_older_than, query_by_type, recent_records,
    NewRecord, SleepCompletion, SleepExtra,
};
pub use stats::{daily_stats, period_summary, today_stats, DailyStats, PeriodSummary};

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

/// The seven record categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Feeding,
    Drinking,
    Diaper,
    Sleep,
    Temperature,
    Bath,
    Medicine,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Feeding => "feeding",
            RecordKind::Drinking => "drinking",
            RecordKind::Diaper => "diaper",
            RecordKind::Sleep => "sleep",
            RecordKind::Temperature => "temperature",
            RecordKind::Bath => "bath",
            RecordKind::Medicine => "medicine",
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feeding" => Ok(RecordKind::Feeding),
            "drinking" => Ok(RecordKind::Drinking),
            "diaper" => Ok(RecordKind::Diaper),
            "sleep" => Ok(RecordKind::Sleep),
            "temperature" => Ok(RecordKind::Temperature),
            "bath" => Ok(RecordKind::Bath),
            "medicine" => Ok(RecordKind::Medicine),
            other => Err(format!("unknown record type: {other}")),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category-specific fields, tagged on the wire by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordDetail {
    Feeding {
        #[serde(
            default,
            deserialize_with = "de_lenient_number",
            skip_serializing_if = "Option::is_none"
        )]
        amount: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        side: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    Drinking {
        #[serde(
            default,
            deserialize_with = "de_lenient_number",
            skip_serializing_if = "Option::is_none"
        )]
        amount: Option<f64>,
        #[serde(default, rename = "drinkType", skip_serializing_if = "Option::is_none")]
        drink_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    Diaper {
        #[serde(default, rename = "diaperType", skip_serializing_if = "Option::is_none")]
        diaper_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    Sleep {
        #[serde(rename = "startTime")]
        start_time: i64,
        /// Absent while the sleep is still in progress.
        #[serde(default, rename = "endTime", skip_serializing_if = "Option::is_none")]
        end_time: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    Temperature {
        #[serde(
            default,
            deserialize_with = "de_lenient_number",
            skip_serializing_if = "Option::is_none"
        )]
        temperature: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    Bath {
        #[serde(
            default,
            deserialize_with = "de_lenient_number",
            skip_serializing_if = "Option::is_none"
        )]
        duration: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    Medicine {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dose: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        purpose: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

impl RecordDetail {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordDetail::Feeding { .. } => RecordKind::Feeding,
            RecordDetail::Drinking { .. } => RecordKind::Drinking,
            RecordDetail::Diaper { .. } => RecordKind::Diaper,
            RecordDetail::Sleep { .. } => RecordKind::Sleep,
            RecordDetail::Temperature { .. } => RecordKind::Temperature,
            RecordDetail::Bath { .. } => RecordKind::Bath,
            RecordDetail::Medicine { .. } => RecordKind::Medicine,
        }
    }
}

/// One logged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    /// Creation time in epoch milliseconds. For sleep records the interval
    /// lives in `startTime`/`endTime`; `timestamp` mirrors the start.
    pub timestamp: i64,
    /// User-chosen event time from the form, when it differs from creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(flatten)]
    pub detail: RecordDetail,
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        self.detail.kind()
    }

    /// The open/closed status of a sleep record; `None` for other kinds.
    pub fn sleep_interval(&self) -> Option<(i64, Option<i64>)> {
        match self.detail {
            RecordDetail::Sleep {
                start_time,
                end_time,
                ..
            } => Some((start_time, end_time)),
            _ => None,
        }
    }

    pub fn is_open_sleep(&self) -> bool {
        matches!(
            self.detail,
            RecordDetail::Sleep { end_time: None, .. }
        )
    }
}

/// Generate an opaque record/reminder id: creation millis in base 36 plus a
/// random base-36 suffix. Unique enough for a single writer, not
/// cryptographic.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);
    let mut rng = rand::thread_rng();
    for _ in 0..7 {
        id.push(BASE36[rng.gen_range(0..36)] as char);
    }
    id
}

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Accept a number or a numeric string; anything else reads as absent.
/// The original forms submitted amounts as strings.
fn de_lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_roundtrips_with_flat_tagged_shape() {
        let record = Record {
            id: "abc123".into(),
            timestamp: 1_700_000_000_000,
            time: None,
            detail: RecordDetail::Feeding {
                amount: Some(120.0),
                method: Some("bottle".into()),
                side: None,
                notes: None,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "feeding");
        assert_eq!(json["amount"], 120.0);
        assert!(json.get("side").is_none());

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), RecordKind::Feeding);
    }

    #[test]
    fn amount_accepts_numeric_strings() {
        let record: Record = serde_json::from_value(serde_json::json!({
            "id": "x", "type": "feeding", "timestamp": 5, "amount": "90"
        }))
        .unwrap();
        match record.detail {
            RecordDetail::Feeding { amount, .. } => assert_eq!(amount, Some(90.0)),
            other => panic!("wrong detail: {other:?}"),
        }

        let record: Record = serde_json::from_value(serde_json::json!({
            "id": "x", "type": "feeding", "timestamp": 5, "amount": "a lot"
        }))
        .unwrap();
        match record.detail {
            RecordDetail::Feeding { amount, .. } => assert_eq!(amount, None),
            other => panic!("wrong detail: {other:?}"),
        }
    }

    #[test]
    fn open_sleep_is_detected() {
        let record: Record = serde_json::from_value(serde_json::json!({
            "id": "s1", "type": "sleep", "timestamp": 10, "startTime": 10
        }))
        .unwrap();
        assert!(record.is_open_sleep());
        assert_eq!(record.sleep_interval(), Some((10, None)));
    }

    #[test]
    fn unknown_type_fails_decode() {
        let result: Result<Record, _> = serde_json::from_value(serde_json::json!({
            "id": "x", "type": "teleport", "timestamp": 5
        }));
        assert!(result.is_err());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(a.len() > 7);
    }

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
