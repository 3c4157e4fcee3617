//! Upstream feed items

use crate::error::ParseResult;
use crate::types::encoding::{parse_duration, parse_start_time};
use crate::types::Position;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Type tag of items eligible for sync
pub const MUSIC_TYPE: &str = "Music";

/// One slot of the live feed
///
/// Start time and duration are kept in the feed's native encoding and only
/// decoded on demand, so a malformed field fails the item that carries it
/// rather than the whole window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamItem {
    /// Display title
    pub title: String,
    /// Display artist
    pub artist: String,
    /// Type tag; only `"Music"` items are synced
    pub kind: String,
    /// Raw start time, e.g. `/Date(1405971945000+0200)/`
    pub start_time: String,
    /// Raw duration, e.g. `PT6M10S`
    pub duration: String,
}

impl UpstreamItem {
    /// Creates a new item from raw feed fields
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        kind: impl Into<String>,
        start_time: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            kind: kind.into(),
            start_time: start_time.into(),
            duration: duration.into(),
        }
    }

    /// Returns true if the item is eligible for sync
    pub fn is_music(&self) -> bool {
        self.kind == MUSIC_TYPE
    }

    /// Decodes the start time
    pub fn start_time(&self) -> ParseResult<DateTime<Utc>> {
        parse_start_time(&self.start_time)
    }

    /// Decodes the declared duration
    pub fn duration(&self) -> ParseResult<Duration> {
        parse_duration(&self.duration)
    }

    /// Computes the position of this item at `now`
    ///
    /// `now` is truncated to whole seconds, matching the resolution of the
    /// feed's start times.
    pub fn position_at(&self, now: DateTime<Utc>) -> ParseResult<Position> {
        let start = self.start_time()?;
        let total = self.duration()?;
        let elapsed = chrono::TimeDelta::seconds(now.timestamp() - start.timestamp());
        Ok(Position::from_signed(elapsed, total))
    }
}

impl fmt::Display for UpstreamItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}
