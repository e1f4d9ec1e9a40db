use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use babylog_core::record::{daily_stats, period_summary, today_stats};
use babylog_core::StateStore;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Show statistics for one day
    Day {
        /// Day to summarize, `YYYY-MM-DD`; defaults to today (UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record counts by type over the last N days
    Summary {
        /// Window size in days
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::open()?;
    let now = Utc::now();

    match action {
        StatsAction::Day { date } => {
            let state = store.load();
            let stats = match date {
                Some(day) => daily_stats(&state, day, now),
                None => today_stats(&state, now),
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Summary { days } => {
            let state = store.load();
            let summary = period_summary(&state, days, now);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
