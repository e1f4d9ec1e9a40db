use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::RecordKind;

/// Every observable state change produces an Event.
/// The CLI prints them; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    RecordAdded {
        id: String,
        kind: RecordKind,
        at: DateTime<Utc>,
    },
    /// A sleep interval was closed. `fallback` is true when no matching
    /// open record existed and a closed one was inserted instead -- a
    /// degraded path worth noticing.
    SleepCompleted {
        id: String,
        fallback: bool,
        at: DateTime<Utc>,
    },
    RecordDeleted {
        id: String,
        at: DateTime<Utc>,
    },
    RecordsPurged {
        removed: usize,
        at: DateTime<Utc>,
    },
    ReminderFired {
        id: String,
        title: String,
        /// The trigger that actually elapsed, epoch milliseconds.
        due_time: i64,
        at: DateTime<Utc>,
    },
    ReminderRescheduled {
        id: String,
        next_time: i64,
        at: DateTime<Utc>,
    },
    ReminderDeactivated {
        id: String,
        reason: DeactivationReason,
        at: DateTime<Utc>,
    },
    BackupWritten {
        path: String,
        at: DateTime<Utc>,
    },
    DataImported {
        new_records: usize,
        new_reminders: usize,
        at: DateTime<Utc>,
    },
    DataCleared {
        at: DateTime<Utc>,
    },
}

/// Why a reminder went inactive during a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeactivationReason {
    /// One-shot reminder fired.
    Fired,
    /// Recurrence never reached the future within the step bound.
    RecurrenceOverflow,
}
