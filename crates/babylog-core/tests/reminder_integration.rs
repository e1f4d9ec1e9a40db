//! Integration tests driving the reminder engine through the file-backed
//! store and the polling service.

use std::sync::{Arc, Mutex};

use babylog_core::reminder::{check_due, upsert, FiringOutcome, ReminderService};
use babylog_core::{Notifier, Reminder, Repeat, SoundPlayer, StateStore};
use chrono::{Duration, TimeZone, Utc};

fn reminder(title: &str, time_ms: i64, repeat: Repeat) -> Reminder {
    Reminder {
        id: String::new(),
        title: title.into(),
        time: time_ms,
        repeat,
        kind: String::new(),
        active: true,
        created_at: 0,
    }
}

#[derive(Default)]
struct Recording {
    delivered: Mutex<Vec<String>>,
    sounds: Mutex<Vec<String>>,
}

impl Notifier for Recording {
    fn notify(&self, title: &str, _body: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.delivered.lock().unwrap().push(title.to_string());
        Ok(())
    }
}

impl SoundPlayer for Recording {
    fn play(&self, sound_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.sounds.lock().unwrap().push(sound_id.to_string());
        Ok(())
    }
}

#[test]
fn due_check_reschedules_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::with_path(dir.path().join("data.json"));
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();
    let overdue = now.timestamp_millis() - 10 * 60_000;

    let mut state = store.load();
    upsert(&mut state, reminder("Vitamin D", overdue, Repeat::Daily), now);
    upsert(&mut state, reminder("Checkup", overdue, Repeat::Once), now);
    store.save(&state).unwrap();

    let mut state = store.load();
    let firings = check_due(&mut state, now);
    assert_eq!(firings.len(), 2);
    store.save(&state).unwrap();

    let state = store.load();
    let daily = state
        .reminders
        .iter()
        .find(|r| r.title == "Vitamin D")
        .unwrap();
    assert!(daily.active);
    assert!(daily.time > now.timestamp_millis());
    let once = state.reminders.iter().find(|r| r.title == "Checkup").unwrap();
    assert!(!once.active);

    // Nothing fires twice.
    let mut state = store.load();
    assert!(check_due(&mut state, now).is_empty());
}

#[test]
fn weekly_catchup_skips_missed_occurrences() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();
    // Scheduled five weeks ago; one firing must land it in the future, not
    // replay each missed week.
    let five_weeks_ago = (now - Duration::weeks(5)).timestamp_millis();

    let mut state = babylog_core::State::default();
    upsert(&mut state, reminder("Bath", five_weeks_ago, Repeat::Weekly), now);

    let firings = check_due(&mut state, now);
    assert_eq!(firings.len(), 1);
    match firings[0].outcome {
        FiringOutcome::Rescheduled { next_time } => {
            assert!(next_time > now.timestamp_millis());
            assert!(next_time <= now.timestamp_millis() + Duration::weeks(1).num_milliseconds());
        }
        ref other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn service_poll_delivers_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::with_path(dir.path().join("data.json"));
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();

    let mut state = store.load();
    upsert(
        &mut state,
        reminder("Medicine", now.timestamp_millis() - 1, Repeat::Once),
        now,
    );
    store.save(&state).unwrap();

    let sink = Arc::new(Recording::default());
    let service = ReminderService::new(store.clone(), sink.clone(), sink.clone());
    let events = service.poll(now).unwrap();
    assert!(!events.is_empty());
    assert_eq!(sink.delivered.lock().unwrap().as_slice(), ["Medicine"]);
    assert_eq!(sink.sounds.lock().unwrap().as_slice(), ["default"]);

    // Deactivation was written back.
    let state = store.load();
    assert!(!state.reminders[0].active);
}
