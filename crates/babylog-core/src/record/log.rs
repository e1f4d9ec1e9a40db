//! Append, complete, delete and query operations over the record log.
//!
//! All operations take the owned [`State`] explicitly; persistence is the
//! caller's load -> mutate -> save cycle.

use chrono::{DateTime, Utc};

use super::{generate_id, Record, RecordDetail, RecordKind};
use crate::error::{CoreError, Result, ValidationError};
use crate::storage::State;

pub const DAY_MS: i64 = 86_400_000;

/// Fields for a record about to be logged. `id` is always assigned here;
/// `timestamp` defaults to `now` when absent.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub detail: RecordDetail,
    pub timestamp: Option<i64>,
    pub time: Option<i64>,
}

impl NewRecord {
    pub fn new(detail: RecordDetail) -> Self {
        Self {
            detail,
            timestamp: None,
            time: None,
        }
    }
}

/// Optional fields merged into a sleep record when it is completed.
#[derive(Debug, Clone, Default)]
pub struct SleepExtra {
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Outcome of [`complete_sleep`]. The fallback path inserts a fresh closed
/// record instead of updating an open one; callers must be able to tell the
/// two apart.
#[derive(Debug, Clone)]
pub enum SleepCompletion {
    /// The matching open record was closed in place.
    Closed(Record),
    /// No matching open record existed; a closed record was inserted.
    Fallback(Record),
}

impl SleepCompletion {
    pub fn record(&self) -> &Record {
        match self {
            SleepCompletion::Closed(r) | SleepCompletion::Fallback(r) => r,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SleepCompletion::Fallback(_))
    }
}

/// Append a record, assigning `id` and defaulting `timestamp` to `now`.
///
/// Opening a sleep interval while another is still open is rejected; the
/// open one must be completed first.
pub fn add_record(state: &mut State, new: NewRecord, now: DateTime<Utc>) -> Result<Record> {
    if matches!(new.detail, RecordDetail::Sleep { end_time: None, .. }) {
        if let Some((start_time, _)) = state
            .records
            .iter()
            .find(|r| r.is_open_sleep())
            .and_then(Record::sleep_interval)
        {
            return Err(CoreError::Validation(ValidationError::OpenSleepExists {
                start_time,
            }));
        }
    }

    let timestamp = new.timestamp.unwrap_or_else(|| match new.detail {
        // A sleep record's timestamp mirrors its start.
        RecordDetail::Sleep { start_time, .. } => start_time,
        _ => now.timestamp_millis(),
    });
    let record = Record {
        id: generate_id(),
        timestamp,
        time: new.time,
        detail: new.detail,
    };
    state.records.push(record.clone());
    state.touch(now);
    Ok(record)
}

/// Close the open sleep record whose start matches `start_time`, merging
/// `extra` in place. When no such record exists the completion degrades to
/// inserting an already-closed record -- reported distinctly as
/// [`SleepCompletion::Fallback`].
pub fn complete_sleep(
    state: &mut State,
    start_time: i64,
    end_time: i64,
    extra: SleepExtra,
    now: DateTime<Utc>,
) -> SleepCompletion {
    let open = state.records.iter_mut().find(|r| {
        matches!(
            r.detail,
            RecordDetail::Sleep {
                start_time: s,
                end_time: None,
                ..
            } if s == start_time
        )
    });

    if let Some(record) = open {
        if let RecordDetail::Sleep {
            end_time: ref mut end,
            ref mut location,
            ref mut notes,
            ..
        } = record.detail
        {
            *end = Some(end_time);
            if extra.location.is_some() {
                *location = extra.location;
            }
            if extra.notes.is_some() {
                *notes = extra.notes;
            }
        }
        let closed = record.clone();
        state.touch(now);
        return SleepCompletion::Closed(closed);
    }

    let record = Record {
        id: generate_id(),
        timestamp: start_time,
        time: None,
        detail: RecordDetail::Sleep {
            start_time,
            end_time: Some(end_time),
            location: extra.location,
            notes: extra.notes,
        },
    };
    state.records.push(record.clone());
    state.touch(now);
    SleepCompletion::Fallback(record)
}

/// Remove a record by id. A missing id is a no-op, not an error.
pub fn delete_record(state: &mut State, id: &str, now: DateTime<Utc>) -> bool {
    let before = state.records.len();
    state.records.retain(|r| r.id != id);
    let removed = state.records.len() < before;
    if removed {
        state.touch(now);
    }
    removed
}

/// Records of one category within the last `since_days` days, newest first.
pub fn query_by_type<'a>(
    state: &'a State,
    kind: RecordKind,
    since_days: i64,
    now: DateTime<Utc>,
) -> Vec<&'a Record> {
    let cutoff = now.timestamp_millis() - since_days * DAY_MS;
    let mut records: Vec<&Record> = state
        .records
        .iter()
        .filter(|r| r.kind() == kind && r.timestamp >= cutoff)
        .collect();
    records.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
    records
}

/// The newest records across all categories, for the dashboard summary.
pub fn recent_records(state: &State, limit: usize) -> Vec<&Record> {
    let mut records: Vec<&Record> = state.records.iter().collect();
    records.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
    records.truncate(limit);
    records
}

/// Retention sweep: drop records older than `cutoff_ms`. Returns the number
/// removed.
pub fn purge_older_than(state: &mut State, cutoff_ms: i64, now: DateTime<Utc>) -> usize {
    let before = state.records.len();
    state.records.retain(|r| r.timestamp >= cutoff_ms);
    let removed = before - state.records.len();
    if removed > 0 {
        state.touch(now);
    }
    removed
}
