// crates/sync-engine/src/events.rs
//! Observable progress of the sync loop
//!
//! The orchestrator reports everything it does as a [`SyncEvent`] to an
//! injected [`EventSink`]. [`LogSink`] writes them through the `log` facade;
//! [`MemorySink`] records them for inspection.

use crate::interval::format_duration;
use radiosync_core::Position;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Remote operations performed by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ResolvePlaylist,
    FetchRecentTracks,
    FetchWindow,
    Search,
    AddTrack,
    DeleteTrack,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ResolvePlaylist => "resolve playlist",
            Operation::FetchRecentTracks => "fetch recent tracks",
            Operation::FetchWindow => "fetch feed window",
            Operation::Search => "search",
            Operation::AddTrack => "add track",
            Operation::DeleteTrack => "delete track",
        };
        f.write_str(name)
    }
}

/// Something the orchestrator did or observed
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Initializing { playlist: String },
    PlaylistReady { playlist: String },
    CachePrimed { size: usize, capacity: usize },
    ScheduleMode { description: String },
    CycleStarted { cycle: u64 },
    Retrying {
        operation: Operation,
        error: String,
        delay: Duration,
    },
    NowPlaying {
        station: String,
        item: String,
        kind: String,
        position: Option<Position>,
    },
    PositionUnavailable { item: String, error: String },
    Searching { item: String },
    NotMusic { item: String },
    NotFound { item: String },
    SearchFailed { item: String, error: String },
    AlreadyAdded { track: String },
    Added { track: String },
    AddFailed { track: String, error: String },
    Evicted { track: String },
    Deleted { track: String },
    DeleteFailed { track: String, error: String },
    CacheSize { size: usize, capacity: usize },
    PartialMatch { matched: usize, eligible: usize },
    IntervalFailed { error: String },
    CycleFailed { error: String },
    NextSync { wait: Duration },
    ShuttingDown,
}

/// Receives orchestrator events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SyncEvent);
}

/// Writes events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &SyncEvent) {
        match event {
            SyncEvent::Initializing { playlist } => {
                log::info!("Initializing playlist '{}'", playlist)
            }
            SyncEvent::PlaylistReady { playlist } => log::info!("Playlist: {}", playlist),
            SyncEvent::CachePrimed { size, capacity } => {
                log::info!("Cache primed: {}/{}", size, capacity)
            }
            SyncEvent::ScheduleMode { description } => log::info!("{}", description),
            SyncEvent::CycleStarted { cycle } => log::info!("Running sync #{}", cycle),
            SyncEvent::Retrying {
                operation,
                error,
                delay,
            } => log::warn!(
                "Failed to {}: {}. Retrying in {}",
                operation,
                error,
                format_duration(*delay)
            ),
            SyncEvent::NowPlaying {
                station,
                item,
                kind,
                position,
            } => match position {
                Some(position) => log::info!(
                    "{} is currently playing: {} ({}) [{}] {}",
                    station,
                    item,
                    kind,
                    position,
                    position.progress_bar(20)
                ),
                None => log::info!("{} is currently playing: {} ({})", station, item, kind),
            },
            SyncEvent::PositionUnavailable { item, error } => {
                log::warn!("Cannot place '{}' in time: {}", item, error)
            }
            SyncEvent::Searching { item } => log::info!("Searching for: {}", item),
            SyncEvent::NotMusic { item } => log::info!("Not music, skipping: {}", item),
            SyncEvent::NotFound { item } => log::info!("Track not found: {}", item),
            SyncEvent::SearchFailed { item, error } => {
                log::warn!("Search failed for '{}': {}", item, error)
            }
            SyncEvent::AlreadyAdded { track } => log::info!("Already added: {}", track),
            SyncEvent::Added { track } => log::info!("Added track: {}", track),
            SyncEvent::AddFailed { track, error } => {
                log::warn!("Failed to add {}: {}", track, error)
            }
            SyncEvent::Evicted { track } => log::debug!("Evicted from cache: {}", track),
            SyncEvent::Deleted { track } => log::info!("Deleted evicted track: {}", track),
            SyncEvent::DeleteFailed { track, error } => {
                log::warn!("Failed to delete {}: {}", track, error)
            }
            SyncEvent::CacheSize { size, capacity } => {
                log::info!("Cache size: {}/{}", size, capacity)
            }
            SyncEvent::PartialMatch { matched, eligible } => log::info!(
                "{}/{} tracks were added. Falling back to regular interval",
                matched,
                eligible
            ),
            SyncEvent::IntervalFailed { error } => {
                log::warn!("Cannot derive adaptive interval: {}", error)
            }
            SyncEvent::CycleFailed { error } => log::error!("Sync failed: {}", error),
            SyncEvent::NextSync { wait } => log::info!("Next sync in {}", format_duration(*wait)),
            SyncEvent::ShuttingDown => log::info!("Shutting down"),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<SyncEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<SyncEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of recorded events matching the predicate
    pub fn count(&self, predicate: impl Fn(&SyncEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: &SyncEvent) {
        (**self).emit(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_shares_events_between_clones() {
        let sink = MemorySink::new();
        let handle = sink.clone();

        sink.emit(&SyncEvent::CycleStarted { cycle: 1 });
        sink.emit(&SyncEvent::NextSync {
            wait: Duration::from_secs(5),
        });

        assert_eq!(handle.events().len(), 2);
        assert_eq!(
            handle.count(|e| matches!(e, SyncEvent::CycleStarted { .. })),
            1
        );
    }

    #[test]
    fn test_log_sink_handles_every_event() {
        let sink = LogSink;
        sink.emit(&SyncEvent::NowPlaying {
            station: "P3".to_string(),
            item: "Artist - Title".to_string(),
            kind: "Music".to_string(),
            position: Some(Position::new(
                Duration::from_secs(30),
                Duration::from_secs(60),
            )),
        });
        sink.emit(&SyncEvent::Retrying {
            operation: Operation::Search,
            error: "timeout".to_string(),
            delay: Duration::from_millis(500),
        });
        sink.emit(&SyncEvent::ShuttingDown);
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::FetchWindow.to_string(), "fetch feed window");
        assert_eq!(Operation::DeleteTrack.to_string(), "delete track");
    }
}
