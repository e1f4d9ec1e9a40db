//! Reminder commands, including the foreground watch loop that hosts the
//! polling service.

use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;

use babylog_core::reminder::{
    check_due, remove, toggle, upsert, ReminderPoller, ReminderService, DEFAULT_POLL_INTERVAL,
};
use babylog_core::{Event, Notifier, Reminder, Repeat, SoundPlayer, StateStore};

use super::parse_when;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Create a reminder
    Add {
        /// Reminder title
        title: String,
        /// Trigger time (RFC 3339 or epoch milliseconds)
        #[arg(long)]
        at: String,
        /// Recurrence: once, daily, weekly, biweekly, monthly
        #[arg(long, default_value = "once")]
        repeat: Repeat,
        /// Category tag (e.g. "feeding", "medicine")
        #[arg(long, default_value = "")]
        kind: String,
    },
    /// List reminders
    List,
    /// Reactivate a reminder
    Enable {
        /// Reminder ID
        id: String,
    },
    /// Deactivate a reminder without deleting it
    Disable {
        /// Reminder ID
        id: String,
    },
    /// Delete a reminder
    Remove {
        /// Reminder ID
        id: String,
    },
    /// Run one due check now and print what fired
    Check,
    /// Keep checking in the foreground, delivering console notifications
    Watch {
        /// Seconds between due checks
        #[arg(long, default_value = "60")]
        interval_secs: u64,
    },
}

/// Console delivery for `watch`: prints instead of raising OS notifications.
struct ConsoleSink;

impl Notifier for ConsoleSink {
    fn notify(&self, title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>> {
        println!("[reminder] {title}: {body}");
        Ok(())
    }
}

impl SoundPlayer for ConsoleSink {
    fn play(&self, sound_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        println!("[sound] {sound_id}");
        Ok(())
    }
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::open()?;
    let now = Utc::now();

    match action {
        ReminderAction::Add {
            title,
            at,
            repeat,
            kind,
        } => {
            let mut state = store.load();
            let reminder = upsert(
                &mut state,
                Reminder {
                    id: String::new(),
                    title,
                    time: parse_when(&at)?,
                    repeat,
                    kind,
                    active: true,
                    created_at: 0,
                },
                now,
            );
            store.save(&state)?;
            println!("Reminder created: {}", reminder.id);
            println!("{}", serde_json::to_string_pretty(&reminder)?);
        }
        ReminderAction::List => {
            let state = store.load();
            println!("{}", serde_json::to_string_pretty(&state.reminders)?);
        }
        ReminderAction::Enable { id } => set_active(&store, &id, true)?,
        ReminderAction::Disable { id } => set_active(&store, &id, false)?,
        ReminderAction::Remove { id } => {
            let mut state = store.load();
            if remove(&mut state, &id, now) {
                store.save(&state)?;
                println!("Reminder deleted: {id}");
            } else {
                println!("Reminder not found: {id}");
            }
        }
        ReminderAction::Check => {
            let mut state = store.load();
            let firings = check_due(&mut state, now);
            store.save(&state)?;
            let fired: Vec<Event> = firings
                .iter()
                .map(|f| Event::ReminderFired {
                    id: f.reminder.id.clone(),
                    title: f.reminder.title.clone(),
                    due_time: f.reminder.time,
                    at: now,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&fired)?);
        }
        ReminderAction::Watch { interval_secs } => {
            let sink = Arc::new(ConsoleSink);
            let service = ReminderService::new(store, sink.clone(), sink);
            let interval = if interval_secs == 0 {
                DEFAULT_POLL_INTERVAL
            } else {
                std::time::Duration::from_secs(interval_secs)
            };

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_time()
                .build()?;
            runtime.block_on(async {
                let mut poller = ReminderPoller::new();
                poller.start(service, interval);
                // Runs until the process is killed.
                std::future::pending::<()>().await;
            });
        }
    }
    Ok(())
}

fn set_active(
    store: &StateStore,
    id: &str,
    active: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = store.load();
    if toggle(&mut state, id, active, Utc::now()) {
        store.save(&state)?;
        println!("Reminder {}: {id}", if active { "enabled" } else { "disabled" });
    } else {
        println!("Reminder not found: {id}");
    }
    Ok(())
}
