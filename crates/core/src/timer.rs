use serde::{Deserialize, Serialize};

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Durable record of the countdown, written periodically while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub remaining_seconds: u32,
    pub paused: bool,
    pub saved_at_epoch_millis: i64,
}

impl TimerSnapshot {
    #[must_use]
    pub fn new(remaining_seconds: u32, paused: bool, saved_at_epoch_millis: i64) -> Self {
        Self {
            remaining_seconds,
            paused,
            saved_at_epoch_millis,
        }
    }

    /// Remaining seconds as of `now_millis`.
    ///
    /// A running snapshot loses the whole seconds that passed since it was
    /// written, floored at zero. A paused snapshot is returned as saved.
    #[must_use]
    pub fn remaining_at(&self, now_millis: i64) -> u32 {
        if self.paused {
            return self.remaining_seconds;
        }
        let elapsed_ms = now_millis.saturating_sub(self.saved_at_epoch_millis).max(0);
        let elapsed_secs = u32::try_from(elapsed_ms / 1000).unwrap_or(u32::MAX);
        self.remaining_seconds.saturating_sub(elapsed_secs)
    }
}

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// Outcome of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining: u32 },
    Paused,
    /// Reported exactly once, on the tick that reaches zero.
    Expired,
    Stopped,
}

/// Exam countdown in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total: u32,
    remaining: u32,
    paused: bool,
    stopped: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(total_secs: u32) -> Self {
        Self {
            total: total_secs,
            remaining: total_secs,
            paused: false,
            stopped: false,
        }
    }

    /// Rebuild a countdown from a stored snapshot.
    ///
    /// Remaining time never exceeds the configured total.
    #[must_use]
    pub fn resume(total_secs: u32, snapshot: &TimerSnapshot, now_millis: i64) -> Self {
        Self {
            total: total_secs,
            remaining: snapshot.remaining_at(now_millis).min(total_secs),
            paused: snapshot.paused,
            stopped: false,
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.stopped {
            return Tick::Stopped;
        }
        if self.paused {
            return Tick::Paused;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.stopped = true;
            return Tick::Expired;
        }
        self.remaining -= 1;
        Tick::Running {
            remaining: self.remaining,
        }
    }

    /// Flip the pause flag and return the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Pause if running; returns true when the state changed.
    pub fn pause(&mut self) -> bool {
        if self.paused || self.stopped {
            return false;
        }
        self.paused = true;
        true
    }

    /// Freeze the countdown for good.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    #[must_use]
    pub fn snapshot(&self, now_millis: i64) -> TimerSnapshot {
        TimerSnapshot::new(self.remaining, self.paused, now_millis)
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds used so far: configured total minus remaining.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.total.saturating_sub(self.remaining)
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
