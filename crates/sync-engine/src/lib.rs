// crates/sync-engine/src/lib.rs
//! Live feed to playlist synchronization
//!
//! This crate reconciles a radio station's "now playing" feed into a
//! playlist on a music service:
//! - [`TrackCache`] remembers recently added tracks and reports evictions
//! - [`IntervalStrategy`] picks the wait between cycles
//! - [`SyncOrchestrator`] drives startup and the sync loop
//!
//! The feed and the service are reached through the [`UpstreamFeed`] and
//! [`DownstreamService`] traits, so the loop can run against any backend.
//!
//! # Example
//!
//! ```rust
//! use radiosync_sync_engine::{TrackCache, DownstreamTrack};
//!
//! let mut cache = TrackCache::new(2);
//! cache.add(DownstreamTrack::new("a", "First", "spotify:track:a"));
//! cache.add(DownstreamTrack::new("b", "Second", "spotify:track:b"));
//!
//! let evicted = cache.add(DownstreamTrack::new("c", "Third", "spotify:track:c"));
//! assert_eq!(evicted.map(|t| t.name), Some("First".to_string()));
//! ```

mod cache;
mod error;
mod events;
mod interval;
mod orchestrator;
mod traits;

pub use cache::{CacheEntry, EvictionListener, TrackCache};
pub use error::{ErrorKind, SyncError, SyncResult};
pub use events::{EventSink, LogSink, MemorySink, Operation, SyncEvent};
pub use interval::{
    format_duration, AdaptiveInterval, FixedInterval, IntervalError, IntervalStrategy,
    ItemOutcome, ItemStatus, Schedule, ScheduleBasis, SyncCycleResult, DEFAULT_INTERVAL,
    DEFAULT_MIN_INTERVAL,
};
pub use orchestrator::{CycleReport, SyncConfig, SyncOrchestrator, SyncState, DEFAULT_CACHE_SIZE};
pub use traits::{DownstreamService, UpstreamFeed};

pub use radiosync_core::{DownstreamTrack, Playlist, UpstreamItem};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _config = SyncConfig::default();
        let _cache = TrackCache::new(DEFAULT_CACHE_SIZE);
        let _fixed = FixedInterval::default();
        let _sink = LogSink;
    }
}
