//! Delivery ports for reminders.
//!
//! Notification display and audio output are external collaborators; the
//! core only talks to these traits. Delivery is best-effort -- a failed
//! `notify` (no permission, no display) is reported back so the caller can
//! fall back to an in-app alert, and never aborts the poll cycle.

/// Shows a user-visible notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>>;
}

/// Plays a named alert sound.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, sound_id: &str) -> Result<(), Box<dyn std::error::Error>>;
}

/// Discards everything. Useful when notifications are disabled and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _body: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

impl SoundPlayer for NullNotifier {
    fn play(&self, _sound_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
