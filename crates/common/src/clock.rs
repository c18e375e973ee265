//! Clock and timing utilities for process supervision.
//!
//! - [`UptimeClock`] anchors a monotonic instant to the wall-clock time it
//!   was taken at, so a running process can report both "started at" and
//!   "up for".
//! - [`RestartBackoff`] produces the exponential delays used between
//!   encoder relaunches.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// A monotonic clock anchored to a wall-clock start time.
#[derive(Debug, Clone)]
pub struct UptimeClock {
    /// The instant the clock started.
    epoch: Instant,

    /// Wall-clock time at epoch.
    epoch_wall: DateTime<Utc>,
}

impl UptimeClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: Utc::now(),
        }
    }

    /// Time elapsed since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Wall-clock time at start.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.epoch_wall
    }
}

/// Exponential backoff between restarts of a crashing process.
///
/// Delays run `initial, 2*initial, 4*initial, ...` capped at `max`. A process
/// that stayed up for at least `max` before exiting is considered healthy
/// again and the sequence restarts from `initial`.
#[derive(Debug, Clone)]
pub struct RestartBackoff {
    initial: Duration,
    max: Duration,
    next: Duration,
    attempts: u32,
}

impl RestartBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(Duration::from_millis(1));
        let max = max.max(initial);
        Self {
            initial,
            max,
            next: initial,
            attempts: 0,
        }
    }

    /// Delay to wait before the next restart, given how long the previous
    /// run lasted.
    pub fn next_delay(&mut self, last_uptime: Duration) -> Duration {
        if last_uptime >= self.max {
            self.reset();
        }
        let delay = self.next;
        self.next = (self.next * 2).min(self.max);
        self.attempts += 1;
        delay
    }

    /// Forget previous failures.
    pub fn reset(&mut self) {
        self.next = self.initial;
    }

    /// Total number of delays handed out.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
