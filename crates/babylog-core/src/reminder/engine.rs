//! Due-checking and recurrence rescheduling.
//!
//! `check_due` is a pure pass over the state against a caller-supplied
//! "now" -- no internal thread. The periodic invocation lives in
//! [`ReminderPoller`](super::ReminderPoller); callers with their own loop
//! (and tests) drive this directly.

use chrono::{DateTime, Utc};

use super::{Reminder, Repeat};
use crate::record::generate_id;
use crate::storage::State;

/// Bound on recurrence advancement per firing. Long downtime is fine
/// (4096 days of daily catch-up is over a decade); anything beyond is a
/// pathological definition and deactivates the reminder.
pub const MAX_RESCHEDULE_STEPS: u32 = 4096;

/// How a fired reminder was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiringOutcome {
    /// One-shot reminder, now inactive.
    Deactivated,
    /// Recurring reminder, advanced to the next trigger after "now".
    Rescheduled { next_time: i64 },
    /// Recurrence never reached the future within the step bound; the
    /// reminder was deactivated instead of looping forever.
    Overflowed,
}

/// One due reminder, with a snapshot taken at fire time.
#[derive(Debug, Clone)]
pub struct Firing {
    pub reminder: Reminder,
    pub outcome: FiringOutcome,
}

/// Fire every active reminder whose trigger is at or before `now`.
///
/// Reminders with identical trigger times fire in insertion order. The
/// returned snapshots carry the pre-reschedule `time` so callers can report
/// the trigger that actually elapsed.
pub fn check_due(state: &mut State, now: DateTime<Utc>) -> Vec<Firing> {
    let now_ms = now.timestamp_millis();
    let mut firings = Vec::new();

    for reminder in &mut state.reminders {
        if !reminder.active || reminder.time > now_ms {
            continue;
        }
        let snapshot = reminder.clone();
        let outcome = match reschedule(reminder, now_ms) {
            Reschedule::Deactivated => {
                reminder.active = false;
                FiringOutcome::Deactivated
            }
            Reschedule::Next(next_time) => {
                reminder.time = next_time;
                FiringOutcome::Rescheduled { next_time }
            }
            Reschedule::Overflow => {
                reminder.active = false;
                FiringOutcome::Overflowed
            }
        };
        firings.push(Firing {
            reminder: snapshot,
            outcome,
        });
    }

    if !firings.is_empty() {
        state.touch(now);
    }
    firings
}

enum Reschedule {
    Deactivated,
    Next(i64),
    Overflow,
}

/// Advance a fired reminder's trigger strictly past `now_ms`, stepping at
/// most [`MAX_RESCHEDULE_STEPS`] times.
fn reschedule(reminder: &Reminder, now_ms: i64) -> Reschedule {
    if reminder.repeat == Repeat::Once {
        return Reschedule::Deactivated;
    }
    let mut time = reminder.time;
    for _ in 0..MAX_RESCHEDULE_STEPS {
        match reminder.repeat.advance(time) {
            Some(next) if next > time => time = next,
            // A non-advancing or unrepresentable step can never terminate.
            _ => return Reschedule::Overflow,
        }
        if time > now_ms {
            return Reschedule::Next(time);
        }
    }
    Reschedule::Overflow
}

/// Insert or replace a reminder. An empty id marks a new reminder and gets
/// one assigned, along with `created_at`.
pub fn upsert(state: &mut State, mut reminder: Reminder, now: DateTime<Utc>) -> Reminder {
    if reminder.id.is_empty() {
        reminder.id = generate_id();
        reminder.created_at = now.timestamp_millis();
    }
    match state.reminders.iter_mut().find(|r| r.id == reminder.id) {
        Some(existing) => {
            // Keep the original creation stamp across edits.
            reminder.created_at = existing.created_at;
            *existing = reminder.clone();
        }
        None => state.reminders.push(reminder.clone()),
    }
    state.touch(now);
    reminder
}

/// Enable or disable a reminder, independent of firing.
pub fn toggle(state: &mut State, id: &str, active: bool, now: DateTime<Utc>) -> bool {
    match state.reminders.iter_mut().find(|r| r.id == id) {
        Some(reminder) => {
            reminder.active = active;
            state.touch(now);
            true
        }
        None => false,
    }
}

/// Remove a reminder by id; missing ids are a no-op.
pub fn remove(state: &mut State, id: &str, now: DateTime<Utc>) -> bool {
    let before = state.reminders.len();
    state.reminders.retain(|r| r.id != id);
    let removed = state.reminders.len() < before;
    if removed {
        state.touch(now);
    }
    removed
}
