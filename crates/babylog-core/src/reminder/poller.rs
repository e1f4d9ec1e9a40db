//! The periodic due-check task.
//!
//! One poll is a full load -> check_due -> deliver -> save cycle. The
//! [`ReminderPoller`] owns the single periodic task; starting it again
//! cancels the previous instance, so duplicate firing loops cannot exist.
//! There is no at-most-once guarantee across restarts -- a trigger missed
//! while the process was down fires on the first poll after start.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::engine::{check_due, FiringOutcome};
use crate::error::Result;
use crate::events::{DeactivationReason, Event};
use crate::notify::{Notifier, SoundPlayer};
use crate::storage::StateStore;

/// Design-target cadence: once per minute.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Wires the due-check to the store and the delivery ports.
#[derive(Clone)]
pub struct ReminderService {
    store: StateStore,
    notifier: Arc<dyn Notifier>,
    sound: Arc<dyn SoundPlayer>,
}

impl ReminderService {
    pub fn new(store: StateStore, notifier: Arc<dyn Notifier>, sound: Arc<dyn SoundPlayer>) -> Self {
        Self {
            store,
            notifier,
            sound,
        }
    }

    /// Run one poll cycle against `now`.
    ///
    /// Failed notification delivery does not abort the cycle; the firing is
    /// still returned so the caller can show an in-app alert instead.
    pub fn poll(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut state = self.store.load();
        let firings = check_due(&mut state, now);
        if firings.is_empty() {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        for firing in &firings {
            if state.settings.notifications_enabled {
                let body = if firing.reminder.kind.is_empty() {
                    "Reminder due".to_string()
                } else {
                    format!("{} reminder", firing.reminder.kind)
                };
                let _ = self.notifier.notify(&firing.reminder.title, &body);
            }
            if state.settings.sound_enabled {
                let _ = self.sound.play(&state.settings.reminder_sound);
            }

            events.push(Event::ReminderFired {
                id: firing.reminder.id.clone(),
                title: firing.reminder.title.clone(),
                due_time: firing.reminder.time,
                at: now,
            });
            events.push(match firing.outcome {
                FiringOutcome::Rescheduled { next_time } => Event::ReminderRescheduled {
                    id: firing.reminder.id.clone(),
                    next_time,
                    at: now,
                },
                FiringOutcome::Deactivated => Event::ReminderDeactivated {
                    id: firing.reminder.id.clone(),
                    reason: DeactivationReason::Fired,
                    at: now,
                },
                FiringOutcome::Overflowed => Event::ReminderDeactivated {
                    id: firing.reminder.id.clone(),
                    reason: DeactivationReason::RecurrenceOverflow,
                    at: now,
                },
            });
        }

        self.store.save(&state)?;
        Ok(events)
    }
}

/// Owns the single cancellable periodic poll task.
#[derive(Default)]
pub struct ReminderPoller {
    handle: Option<JoinHandle<()>>,
}

impl ReminderPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling. Any previously started task is cancelled first, so at
    /// most one poll loop exists per poller. The first poll runs
    /// immediately.
    pub fn start(&mut self, service: ReminderService, interval: Duration) {
        self.stop();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                // The first tick completes immediately: one check at startup.
                ticker.tick().await;
                if let Err(err) = service.poll(Utc::now()) {
                    eprintln!("reminder poll failed: {err}");
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ReminderPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
