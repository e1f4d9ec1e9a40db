//! Ambient-sound player state.
//!
//! Pure state machine over a fixed track list -- no internal thread and no
//! audio I/O. Actual playback goes through the [`SoundPlayer`] port; the
//! caller ticks the sleep timer periodically, the same wall-clock pattern
//! the reminder poller uses.
//!
//! [`SoundPlayer`]: crate::notify::SoundPlayer

use serde::{Deserialize, Serialize};

/// One entry in the ambient playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    Off,
    All,
    One,
}

/// Player state machine.
#[derive(Debug, Clone)]
pub struct Player {
    tracks: Vec<Track>,
    current: usize,
    playing: bool,
    shuffle: bool,
    repeat: RepeatMode,
    volume: f64,
    /// Sleep timer deadline, epoch milliseconds. Setting a new timer
    /// replaces any previous one.
    sleep_deadline_ms: Option<i64>,
}

impl Player {
    pub fn new(tracks: Vec<Track>, volume: f64) -> Self {
        Self {
            tracks,
            current: 0,
            playing: false,
            shuffle: false,
            repeat: RepeatMode::Off,
            volume: volume.clamp(0.0, 1.0),
            sleep_deadline_ms: None,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn sleep_deadline_ms(&self) -> Option<i64> {
        self.sleep_deadline_ms
    }

    pub fn play(&mut self) {
        if !self.tracks.is_empty() {
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
    }

    /// Advance to the next track. Shuffle picks a different random track;
    /// otherwise the list wraps only when repeating, and playback stops at
    /// the end of the list when it does not.
    pub fn next(&mut self) {
        if self.tracks.len() < 2 {
            return;
        }
        if self.shuffle {
            let mut pick = rand::Rng::gen_range(&mut rand::thread_rng(), 0..self.tracks.len() - 1);
            if pick >= self.current {
                pick += 1;
            }
            self.current = pick;
            return;
        }
        if self.current + 1 < self.tracks.len() {
            self.current += 1;
        } else if self.repeat == RepeatMode::All {
            self.current = 0;
        } else {
            self.playing = false;
        }
    }

    pub fn previous(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        if self.current > 0 {
            self.current -= 1;
        } else {
            self.current = self.tracks.len() - 1;
        }
    }

    /// What plays after a track ends on its own: repeat-one replays,
    /// otherwise behaves like [`next`](Self::next).
    pub fn on_track_ended(&mut self) {
        if self.repeat == RepeatMode::One {
            return;
        }
        self.next();
    }

    /// Arm the sleep timer `minutes` from `now_ms`, replacing any previous
    /// deadline.
    pub fn set_sleep_timer(&mut self, now_ms: i64, minutes: i64) {
        self.sleep_deadline_ms = Some(now_ms + minutes * 60_000);
    }

    pub fn clear_sleep_timer(&mut self) {
        self.sleep_deadline_ms = None;
    }

    /// Check the sleep timer against the clock. Returns true when the
    /// deadline elapsed on this tick; the deadline is consumed, so it
    /// cannot fire twice.
    pub fn tick(&mut self, now_ms: i64) -> bool {
        match self.sleep_deadline_ms {
            Some(deadline) if deadline <= now_ms => {
                self.sleep_deadline_ms = None;
                self.playing = false;
                true
            }
            _ => false,
        }
    }
}
