//! Playback position of the currently-airing item

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Elapsed/total time pair for an airing item
///
/// Invariant: `elapsed <= total`. Every constructor clamps, so feed latency
/// or clock skew can never produce a position past the end of the item or
/// before its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    elapsed: Duration,
    total: Duration,
}

impl Position {
    /// Creates a position, clamping `elapsed` to `total`
    pub fn new(elapsed: Duration, total: Duration) -> Self {
        Self {
            elapsed: elapsed.min(total),
            total,
        }
    }

    /// Creates a position from a signed elapsed time
    ///
    /// Negative values (item starts in the future) clamp to zero, values
    /// past the end clamp to `total`.
    pub fn from_signed(elapsed: TimeDelta, total: Duration) -> Self {
        let elapsed = elapsed.to_std().unwrap_or(Duration::ZERO);
        Self::new(elapsed, total)
    }

    /// Time since the item started
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Declared duration of the item
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time until the item is expected to finish
    pub fn remaining(&self) -> Duration {
        self.total - self.elapsed
    }

    /// Renders a fixed-width progress bar such as `===-------`
    ///
    /// Partially elapsed cells round up, and an item with zero duration is
    /// shown as finished.
    pub fn progress_bar(&self, scale: usize) -> String {
        let done = if self.total.is_zero() || self.elapsed >= self.total {
            scale
        } else {
            let ratio = self.elapsed.as_secs_f64() / self.total.as_secs_f64();
            ((ratio * scale as f64).ceil() as usize).min(scale)
        };

        format!("{}{}", "=".repeat(done), "-".repeat(scale - done))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = |d: Duration| {
            let secs = d.as_secs();
            ((secs / 60) % 60, secs % 60)
        };
        let (em, es) = clock(self.elapsed);
        let (tm, ts) = clock(self.total);
        write!(f, "{:02}:{:02}/{:02}:{:02}", em, es, tm, ts)
    }
}
