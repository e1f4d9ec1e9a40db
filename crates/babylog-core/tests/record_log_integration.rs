//! Integration tests for the record log against a real file-backed store.

use babylog_core::record::{
    add_record, complete_sleep, daily_stats, query_by_type, recent_records, NewRecord, SleepExtra,
};
use babylog_core::{RecordDetail, RecordKind, StateStore};
use chrono::{TimeZone, Utc};

fn feeding(amount: f64, method: &str) -> RecordDetail {
    RecordDetail::Feeding {
        amount: Some(amount),
        method: Some(method.into()),
        side: None,
        notes: None,
    }
}

#[test]
fn full_day_logging_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::with_path(dir.path().join("data.json"));
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 14, 0, 0).unwrap();
    let now_ms = now.timestamp_millis();

    // Morning bottle, a diaper change, and a nap with an open interval.
    let mut state = store.load();
    add_record(
        &mut state,
        NewRecord {
            detail: feeding(120.0, "bottle"),
            timestamp: Some(now_ms - 4 * 3_600_000),
            time: None,
        },
        now,
    )
    .unwrap();
    add_record(
        &mut state,
        NewRecord {
            detail: RecordDetail::Diaper {
                diaper_type: Some("pee".into()),
                notes: None,
            },
            timestamp: Some(now_ms - 3 * 3_600_000),
            time: None,
        },
        now,
    )
    .unwrap();
    let nap_start = now_ms - 2 * 3_600_000;
    add_record(
        &mut state,
        NewRecord::new(RecordDetail::Sleep {
            start_time: nap_start,
            end_time: None,
            location: Some("crib".into()),
            notes: None,
        }),
        now,
    )
    .unwrap();
    store.save(&state).unwrap();

    // A fresh load sees the open nap; complete it 90 minutes in.
    let mut state = store.load();
    assert_eq!(state.records.iter().filter(|r| r.is_open_sleep()).count(), 1);
    let done = complete_sleep(
        &mut state,
        nap_start,
        nap_start + 90 * 60_000,
        SleepExtra::default(),
        now,
    );
    assert!(!done.is_fallback());
    store.save(&state).unwrap();

    // Queries and stats over the persisted document.
    let state = store.load();
    let feedings = query_by_type(&state, RecordKind::Feeding, 7, now);
    assert_eq!(feedings.len(), 1);

    let recent = recent_records(&state, 5);
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].kind(), RecordKind::Sleep);

    let stats = daily_stats(&state, now.date_naive(), now);
    assert_eq!(stats.feeding_count, 1);
    assert_eq!(stats.total_feed_amount, 120.0);
    assert_eq!(stats.diaper_count, 1);
    assert_eq!(stats.total_sleep_minutes, 90);
}

#[test]
fn state_survives_lenient_reload_with_foreign_junk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    // A document written by some other version: junk record in the middle,
    // unknown top-level key, settings as partial object.
    std::fs::write(
        &path,
        r#"{
            "records": [
                { "id": "ok1", "type": "bath", "timestamp": 1000, "duration": "12" },
                { "corrupt": true },
                { "id": "ok2", "type": "medicine", "timestamp": 2000, "name": "Vitamin D", "dose": "1 drop" }
            ],
            "reminders": [],
            "settings": { "babyName": "June" },
            "schemaVersion": 9
        }"#,
    )
    .unwrap();

    let store = StateStore::with_path(&path);
    let state = store.load();
    assert_eq!(state.records.len(), 2);
    assert_eq!(state.settings.baby_name, "June");
    assert_eq!(state.settings.theme, "light");

    // Saving the recovered state normalizes the document; the survivors keep
    // their ids.
    store.save(&state).unwrap();
    let reloaded = store.load();
    let ids: Vec<&str> = reloaded.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["ok1", "ok2"]);
}
