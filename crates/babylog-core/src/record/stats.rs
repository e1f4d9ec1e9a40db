//! Per-day aggregates for the dashboard.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use super::log::DAY_MS;
use super::RecordDetail;
use crate::storage::State;

/// Aggregates for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub day: NaiveDate,
    pub feeding_count: usize,
    /// Sum of numeric feeding amounts; non-numeric amounts count as 0.
    pub total_feed_amount: f64,
    pub diaper_count: usize,
    pub bath_count: usize,
    /// Sleep minutes inside the day. Intervals straddling midnight are
    /// clamped to the day; an open sleep counts up to `now`.
    pub total_sleep_minutes: i64,
    /// Value of the most recent temperature reading that day.
    pub latest_temperature: Option<f64>,
}

/// Aggregate the given day's records.
pub fn daily_stats(state: &State, day: NaiveDate, now: DateTime<Utc>) -> DailyStats {
    let day_start = Utc
        .from_utc_datetime(&day.and_time(NaiveTime::MIN))
        .timestamp_millis();
    let day_end = day_start + DAY_MS;
    let in_day = |ts: i64| ts >= day_start && ts < day_end;

    let mut stats = DailyStats {
        day,
        feeding_count: 0,
        total_feed_amount: 0.0,
        diaper_count: 0,
        bath_count: 0,
        total_sleep_minutes: 0,
        latest_temperature: None,
    };
    let mut latest_temperature_at = i64::MIN;

    for record in &state.records {
        match record.detail {
            RecordDetail::Feeding { amount, .. } if in_day(record.timestamp) => {
                stats.feeding_count += 1;
                stats.total_feed_amount += amount.unwrap_or(0.0);
            }
            RecordDetail::Diaper { .. } if in_day(record.timestamp) => {
                stats.diaper_count += 1;
            }
            RecordDetail::Bath { .. } if in_day(record.timestamp) => {
                stats.bath_count += 1;
            }
            RecordDetail::Temperature { temperature, .. }
                if temperature.is_some()
                    && in_day(record.timestamp)
                    && record.timestamp > latest_temperature_at =>
            {
                latest_temperature_at = record.timestamp;
                stats.latest_temperature = temperature;
            }
            RecordDetail::Sleep {
                start_time,
                end_time,
                ..
            } => {
                let end = end_time.unwrap_or_else(|| now.timestamp_millis());
                let clamped_start = start_time.max(day_start);
                let clamped_end = end.min(day_end);
                if clamped_end > clamped_start {
                    stats.total_sleep_minutes +=
                        ((clamped_end - clamped_start) as f64 / 60_000.0).round() as i64;
                }
            }
            _ => {}
        }
    }

    stats
}

/// Convenience: today's stats in UTC.
pub fn today_stats(state: &State, now: DateTime<Utc>) -> DailyStats {
    daily_stats(state, now.date_naive(), now)
}

/// Record counts over the trailing `days`-day window ending at `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub days: u32,
    pub total_records: usize,
    /// Count per record type; types with no records are omitted.
    pub records_by_type: BTreeMap<&'static str, usize>,
}

/// Count records newer than `days` days, grouped by type.
pub fn period_summary(state: &State, days: u32, now: DateTime<Utc>) -> PeriodSummary {
    let cutoff = now.timestamp_millis() - i64::from(days) * DAY_MS;
    let mut summary = PeriodSummary {
        days,
        total_records: 0,
        records_by_type: BTreeMap::new(),
    };
    for record in &state.records {
        if record.timestamp >= cutoff {
            summary.total_records += 1;
            *summary
                .records_by_type
                .entry(record.kind().as_str())
                .or_insert(0) += 1;
        }
    }
    summary
}
