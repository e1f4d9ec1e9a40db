//! Reminder definitions and recurrence math.
//!
//! A reminder is either one-shot or recurring. `time` always points at the
//! next trigger; firing a one-shot deactivates it, firing a recurring one
//! advances `time` strictly past the check instant.

mod engine;
mod poller;

pub use engine::{check_due, remove, toggle, upsert, Firing, FiringOutcome, MAX_RESCHEDULE_STEPS};
pub use poller::{ReminderPoller, ReminderService, DEFAULT_POLL_INTERVAL};

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Recurrence cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    Once,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Repeat {
    /// The trigger following `time_ms`, or `None` for one-shot reminders.
    ///
    /// Day-based cadences advance by a fixed number of milliseconds; the
    /// monthly cadence advances by one calendar month, clamping the
    /// day-of-month when the target month is shorter.
    pub fn advance(&self, time_ms: i64) -> Option<i64> {
        match self {
            Repeat::Once => None,
            Repeat::Daily => Some(time_ms + 86_400_000),
            Repeat::Weekly => Some(time_ms + 7 * 86_400_000),
            Repeat::Biweekly => Some(time_ms + 14 * 86_400_000),
            Repeat::Monthly => {
                let dt = DateTime::<Utc>::from_timestamp_millis(time_ms)?;
                dt.checked_add_months(Months::new(1))
                    .map(|next| next.timestamp_millis())
            }
        }
    }
}

impl std::str::FromStr for Repeat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(Repeat::Once),
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "biweekly" => Ok(Repeat::Biweekly),
            "monthly" => Ok(Repeat::Monthly),
            other => Err(format!("unknown repeat cadence: {other}")),
        }
    }
}

/// A user-defined alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    /// Next trigger, epoch milliseconds.
    pub time: i64,
    pub repeat: Repeat,
    /// Category tag (informational only, e.g. "feeding").
    #[serde(rename = "type", default)]
    pub kind: String,
    pub active: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
}
