// crates/sync-engine/src/interval.rs
//! Scheduling of the next sync cycle

use chrono::{DateTime, Utc};
use radiosync_core::{DownstreamTrack, ParseError, UpstreamItem};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default fixed wait between cycles
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default lower bound on adaptive waits
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(10);

/// Errors raised while deriving an adaptive wait
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    /// The cycle carried no currently airing item
    #[error("No currently airing item in cycle")]
    CurrentUnknown,

    /// An item's timing fields could not be decoded
    #[error("Unusable timing for '{item}': {source}")]
    Timing {
        item: String,
        #[source]
        source: ParseError,
    },
}

/// What happened to one eligible-window item during a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// Found downstream and present in the playlist
    Matched,
    /// Music, but could not be found or added
    Unmatched,
    /// Not music
    Skipped,
}

/// Per-item outcome of a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub item: UpstreamItem,
    pub status: ItemStatus,
    /// The downstream match, when there is one
    pub track: Option<DownstreamTrack>,
}

impl ItemOutcome {
    pub fn matched(item: UpstreamItem, track: DownstreamTrack) -> Self {
        Self {
            item,
            status: ItemStatus::Matched,
            track: Some(track),
        }
    }

    pub fn unmatched(item: UpstreamItem) -> Self {
        Self {
            item,
            status: ItemStatus::Unmatched,
            track: None,
        }
    }

    pub fn skipped(item: UpstreamItem) -> Self {
        Self {
            item,
            status: ItemStatus::Skipped,
            track: None,
        }
    }
}

/// Result of reconciling the current/next sub-window
///
/// Outcomes are in window order; the first one is the currently airing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCycleResult {
    pub outcomes: Vec<ItemOutcome>,
    /// When the feed window was observed
    pub observed_at: DateTime<Utc>,
}

impl SyncCycleResult {
    pub fn new(outcomes: Vec<ItemOutcome>, observed_at: DateTime<Utc>) -> Self {
        Self {
            outcomes,
            observed_at,
        }
    }

    /// The currently airing item
    pub fn current(&self) -> Option<&UpstreamItem> {
        self.outcomes.first().map(|o| &o.item)
    }

    /// Items that were matched and are present downstream
    pub fn matched(&self) -> impl Iterator<Item = &UpstreamItem> {
        self.outcomes
            .iter()
            .filter(|o| o.status == ItemStatus::Matched)
            .map(|o| &o.item)
    }

    pub fn matched_count(&self) -> usize {
        self.count(ItemStatus::Matched)
    }

    /// Number of music items in the sub-window
    pub fn eligible_count(&self) -> usize {
        self.outcomes.len() - self.count(ItemStatus::Skipped)
    }

    /// True when every music item was matched
    pub fn fully_matched(&self) -> bool {
        self.count(ItemStatus::Unmatched) == 0
    }

    fn count(&self, status: ItemStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// Why a wait was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleBasis {
    /// The configured fixed interval
    Fixed,
    /// Derived from the remaining airtime of matched items
    Adaptive,
    /// Adaptive mode, but some music item was not matched
    PartialMatch { matched: usize, eligible: usize },
    /// The cycle failed or timing could not be derived
    Fallback,
}

/// The wait before the next cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub wait: Duration,
    pub basis: ScheduleBasis,
}

impl Schedule {
    pub fn new(wait: Duration, basis: ScheduleBasis) -> Self {
        Self { wait, basis }
    }
}

/// Decides how long to wait after a cycle
pub trait IntervalStrategy: Send + Sync {
    /// Derives the next wait from a completed cycle
    fn next_interval(&self, cycle: &SyncCycleResult) -> Result<Schedule, IntervalError>;

    /// Wait to use when a cycle fails or `next_interval` errors
    fn fallback(&self) -> Duration;

    /// Short description for startup logging
    fn describe(&self) -> String;
}

/// Always waits the same amount of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedInterval {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl IntervalStrategy for FixedInterval {
    fn next_interval(&self, _cycle: &SyncCycleResult) -> Result<Schedule, IntervalError> {
        Ok(Schedule::new(self.interval, ScheduleBasis::Fixed))
    }

    fn fallback(&self) -> Duration {
        self.interval
    }

    fn describe(&self) -> String {
        format!("Syncing every {}", format_duration(self.interval))
    }
}

/// Waits until the last matched item is expected to end
///
/// The wait is the remaining airtime of the current item, if it was matched,
/// plus the full declared duration of every later item that was matched.
/// Skipped items contribute nothing. If any music item went unmatched the
/// fixed interval is used instead, so a track the search missed gets another
/// chance soon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveInterval {
    fallback: Duration,
    floor: Duration,
}

impl AdaptiveInterval {
    pub fn new(fallback: Duration) -> Self {
        Self {
            fallback,
            floor: DEFAULT_MIN_INTERVAL,
        }
    }

    /// Sets the minimum wait
    pub fn with_floor(mut self, floor: Duration) -> Self {
        self.floor = floor;
        self
    }
}

impl IntervalStrategy for AdaptiveInterval {
    fn next_interval(&self, cycle: &SyncCycleResult) -> Result<Schedule, IntervalError> {
        if !cycle.fully_matched() {
            return Ok(Schedule::new(
                self.fallback,
                ScheduleBasis::PartialMatch {
                    matched: cycle.matched_count(),
                    eligible: cycle.eligible_count(),
                },
            ));
        }

        let (current, rest) = cycle
            .outcomes
            .split_first()
            .ok_or(IntervalError::CurrentUnknown)?;

        let mut wait = Duration::ZERO;
        if current.status == ItemStatus::Matched {
            wait += current
                .item
                .position_at(cycle.observed_at)
                .map_err(|source| timing_error(&current.item, source))?
                .remaining();
        }
        for outcome in rest.iter().filter(|o| o.status == ItemStatus::Matched) {
            wait += outcome
                .item
                .duration()
                .map_err(|source| timing_error(&outcome.item, source))?;
        }

        Ok(Schedule::new(wait.max(self.floor), ScheduleBasis::Adaptive))
    }

    fn fallback(&self) -> Duration {
        self.fallback
    }

    fn describe(&self) -> String {
        format!(
            "Using adaptive interval (fallback {})",
            format_duration(self.fallback)
        )
    }
}

fn timing_error(item: &UpstreamItem, source: ParseError) -> IntervalError {
    IntervalError::Timing {
        item: item.to_string(),
        source,
    }
}

/// Formats a duration as e.g. `4m19s`, `1h0m5s` or `750ms`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return format!("{}ms", duration.as_millis());
    }

    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.wait))
    }
}
