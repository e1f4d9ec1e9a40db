//! # Babylog Core Library
//!
//! Core business logic for Babylog, a local-first baby-care logger. All
//! operations are available through this library; the CLI binary is a thin
//! layer over it.
//!
//! ## Architecture
//!
//! - **Storage**: one JSON state document owned by [`StateStore`]; every
//!   mutation is a load -> mutate -> save cycle over an explicit [`State`]
//! - **Record log**: append/complete/delete/query of seven event
//!   categories, including the open/close semantics of sleep intervals
//! - **Reminder engine**: wall-clock due-check with recurrence
//!   rescheduling; the caller (or [`ReminderPoller`]) polls periodically
//! - **Backup**: validated import with id-deduplicating merge, JSON export,
//!   daily auto-backup
//! - **Player**: ambient-sound playlist state with a cancellable sleep
//!   timer; audio output itself stays behind the [`SoundPlayer`] port
//!
//! ## Key Components
//!
//! - [`StateStore`]: persistence for the single state document
//! - [`check_due`]: the reminder due-check and rescheduler
//! - [`ReminderService`] / [`ReminderPoller`]: periodic delivery
//! - [`Notifier`] / [`SoundPlayer`]: delivery ports for the host shell

pub mod backup;
pub mod error;
pub mod events;
pub mod notify;
pub mod player;
pub mod record;
pub mod reminder;
pub mod storage;

pub use error::{CoreError, StorageError, ValidationError};
pub use events::{DeactivationReason, Event};
pub use notify::{Notifier, NullNotifier, SoundPlayer};
pub use player::{Player, RepeatMode, Track};
pub use record::{Record, RecordDetail, RecordKind, SleepCompletion};
pub use reminder::{check_due, Reminder, ReminderPoller, ReminderService, Repeat};
pub use storage::{data_dir, Settings, State, StateStore};
