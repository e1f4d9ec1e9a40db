//! Care record commands: one subcommand per record category plus the
//! sleep start/end pair, listing and deletion.

use chrono::Utc;
use clap::Subcommand;

use babylog_core::record::{
    add_record, complete_sleep, delete_record, query_by_type, recent_records, NewRecord, SleepExtra,
};
use babylog_core::{Event, Record, RecordDetail, RecordKind, StateStore};

use super::parse_when;

#[derive(Subcommand)]
pub enum RecordAction {
    /// Log a feeding
    AddFeeding {
        /// Amount in ml
        #[arg(long)]
        amount: Option<f64>,
        /// Feeding method (e.g. "bottle", "breast")
        #[arg(long)]
        method: Option<String>,
        /// Breast side when applicable
        #[arg(long)]
        side: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Log a drink
    AddDrinking {
        /// Amount in ml
        #[arg(long)]
        amount: Option<f64>,
        /// Drink type (e.g. "water", "juice")
        #[arg(long)]
        drink_type: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Log a diaper change
    AddDiaper {
        /// Diaper content (e.g. "pee", "poop", "both")
        diaper_type: String,
        #[arg(long)]
        notes: Option<String>,
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Log a temperature measurement
    AddTemperature {
        /// Temperature in degrees Celsius
        temperature: f64,
        /// Measurement method (e.g. "ear", "forehead")
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Log a bath
    AddBath {
        /// Duration in minutes
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Log a medicine dose
    AddMedicine {
        /// Medicine name
        name: String,
        /// Dose (free text, e.g. "2.5 ml")
        #[arg(long)]
        dose: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Open a sleep interval
    SleepStart {
        /// Start time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Close the open sleep interval
    SleepEnd {
        /// End time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long)]
        at: Option<String>,
        /// Start time of the interval to close; defaults to the open one
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List records of one category
    List {
        /// Record category (feeding, drinking, diaper, sleep, temperature, bath, medicine)
        kind: RecordKind,
        /// How many days back to include
        #[arg(long, default_value = "7")]
        days: i64,
    },
    /// Show the most recent records across all categories
    Recent {
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Delete a record by id
    Delete {
        /// Record ID
        id: String,
    },
}

pub fn run(action: RecordAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::open()?;
    let now = Utc::now();

    match action {
        RecordAction::AddFeeding {
            amount,
            method,
            side,
            notes,
            at,
        } => add(
            &store,
            RecordDetail::Feeding {
                amount,
                method,
                side,
                notes,
            },
            at,
        )?,
        RecordAction::AddDrinking {
            amount,
            drink_type,
            notes,
            at,
        } => add(
            &store,
            RecordDetail::Drinking {
                amount,
                drink_type,
                notes,
            },
            at,
        )?,
        RecordAction::AddDiaper {
            diaper_type,
            notes,
            at,
        } => add(
            &store,
            RecordDetail::Diaper {
                diaper_type: Some(diaper_type),
                notes,
            },
            at,
        )?,
        RecordAction::AddTemperature {
            temperature,
            method,
            notes,
            at,
        } => add(
            &store,
            RecordDetail::Temperature {
                temperature: Some(temperature),
                method,
                notes,
            },
            at,
        )?,
        RecordAction::AddBath {
            duration,
            notes,
            at,
        } => add(
            &store,
            RecordDetail::Bath { duration, notes },
            at,
        )?,
        RecordAction::AddMedicine {
            name,
            dose,
            purpose,
            notes,
            at,
        } => add(
            &store,
            RecordDetail::Medicine {
                name: Some(name),
                dose,
                purpose,
                notes,
            },
            at,
        )?,
        RecordAction::SleepStart {
            at,
            location,
            notes,
        } => {
            let start = match at {
                Some(s) => parse_when(&s)?,
                None => now.timestamp_millis(),
            };
            let mut state = store.load();
            let record = add_record(
                &mut state,
                NewRecord::new(RecordDetail::Sleep {
                    start_time: start,
                    end_time: None,
                    location,
                    notes,
                }),
                now,
            )?;
            let event = Event::RecordAdded {
                id: record.id.clone(),
                kind: record.kind(),
                at: now,
            };
            store.save(&state)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        RecordAction::SleepEnd {
            at,
            start,
            location,
            notes,
        } => {
            let mut state = store.load();
            let start = match start {
                Some(s) => parse_when(&s)?,
                None => match state.records.iter().find(|r| r.is_open_sleep()) {
                    Some(open) => open.sleep_interval().map(|(s, _)| s).unwrap_or_default(),
                    None => return Err("no open sleep to close".into()),
                },
            };
            let end = match at {
                Some(s) => parse_when(&s)?,
                None => now.timestamp_millis(),
            };
            let done = complete_sleep(
                &mut state,
                start,
                end,
                SleepExtra { location, notes },
                now,
            );
            let event = Event::SleepCompleted {
                id: done.record().id.clone(),
                fallback: done.is_fallback(),
                at: now,
            };
            store.save(&state)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        RecordAction::List { kind, days } => {
            let state = store.load();
            let records = query_by_type(&state, kind, days, now);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        RecordAction::Recent { limit } => {
            let state = store.load();
            let records = recent_records(&state, limit);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        RecordAction::Delete { id } => {
            let mut state = store.load();
            if delete_record(&mut state, &id, now) {
                store.save(&state)?;
                let event = Event::RecordDeleted { id, at: now };
                println!("{}", serde_json::to_string_pretty(&event)?);
            } else {
                println!("Record not found: {id}");
            }
        }
    }
    Ok(())
}

fn add(
    store: &StateStore,
    detail: RecordDetail,
    at: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let mut state = store.load();
    let mut new = NewRecord::new(detail);
    if let Some(s) = at {
        new.timestamp = Some(parse_when(&s)?);
    }
    let record: Record = add_record(&mut state, new, now)?;
    let event = Event::RecordAdded {
        id: record.id.clone(),
        kind: record.kind(),
        at: now,
    };
    store.save(&state)?;
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}
