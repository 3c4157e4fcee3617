// crates/sync-engine/src/orchestrator.rs
//! The sync loop
//!
//! Startup resolves the playlist and primes the cache from it, then each
//! cycle fetches the feed window, reconciles the current and next items into
//! the playlist, and picks the wait before the next cycle.

use crate::cache::TrackCache;
use crate::error::{SyncError, SyncResult};
use crate::events::{EventSink, LogSink, Operation, SyncEvent};
use crate::interval::{
    AdaptiveInterval, FixedInterval, IntervalStrategy, ItemOutcome, Schedule, ScheduleBasis,
    SyncCycleResult, DEFAULT_INTERVAL, DEFAULT_MIN_INTERVAL,
};
use crate::traits::{DownstreamService, UpstreamFeed};
use chrono::{DateTime, Utc};
use radiosync_core::{DownstreamTrack, Playlist, SourceError, SourceResult, UpstreamItem, Window};
use radiosync_resilience::{with_retry_notify, ResilienceResult, RetryPolicy};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Default number of tracks remembered by the cache
pub const DEFAULT_CACHE_SIZE: usize = 100;

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Name of the playlist to sync into
    pub playlist_name: String,
    /// Fixed wait between cycles, also the adaptive fallback
    pub interval: Duration,
    /// Whether to derive waits from the airing schedule
    pub adaptive: bool,
    /// Lower bound on adaptive waits
    pub min_interval: Duration,
    /// Number of recently added tracks to remember
    pub cache_size: usize,
    /// Whether tracks evicted from the cache are removed from the playlist
    pub delete_evicted: bool,
    /// Retry budget for startup operations
    pub startup_policy: RetryPolicy,
    /// Retry budget for each remote call inside a cycle
    pub cycle_policy: RetryPolicy,
}

impl SyncConfig {
    pub fn new(playlist_name: impl Into<String>) -> Self {
        Self {
            playlist_name: playlist_name.into(),
            ..Self::default()
        }
    }

    /// Builds the interval strategy this configuration describes
    pub fn interval_strategy(&self) -> Box<dyn IntervalStrategy> {
        if self.adaptive {
            Box::new(AdaptiveInterval::new(self.interval).with_floor(self.min_interval))
        } else {
            Box::new(FixedInterval::new(self.interval))
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            playlist_name: String::new(),
            interval: DEFAULT_INTERVAL,
            adaptive: false,
            min_interval: DEFAULT_MIN_INTERVAL,
            cache_size: DEFAULT_CACHE_SIZE,
            delete_evicted: false,
            startup_policy: RetryPolicy::startup(),
            cycle_policy: RetryPolicy::cycle(),
        }
    }
}

/// Where the orchestrator is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Initializing,
    Fetching,
    Reconciling,
    Waiting,
}

/// Summary of one completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    pub result: SyncCycleResult,
    pub schedule: Schedule,
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;
type EvictionQueue = Arc<Mutex<VecDeque<DownstreamTrack>>>;

/// Mirrors an upstream feed into a downstream playlist
pub struct SyncOrchestrator<F, D> {
    config: SyncConfig,
    feed: F,
    service: D,
    interval: Box<dyn IntervalStrategy>,
    sink: Box<dyn EventSink>,
    clock: Clock,
    state: SyncState,
    playlist: Option<Playlist>,
    cache: TrackCache,
    evicted: Option<EvictionQueue>,
    cycles: u64,
}

impl<F, D> SyncOrchestrator<F, D>
where
    F: UpstreamFeed,
    D: DownstreamService,
{
    /// Creates an orchestrator that logs through [`LogSink`] and reads the
    /// system clock
    pub fn new(config: SyncConfig, feed: F, service: D) -> Self {
        let mut cache = TrackCache::new(config.cache_size);
        let mut evicted = None;

        if config.delete_evicted {
            let queue: EvictionQueue = Arc::default();
            let listener_queue = Arc::clone(&queue);
            cache = cache.with_listener(move |track: &DownstreamTrack| {
                listener_queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push_back(track.clone());
            });
            evicted = Some(queue);
        }

        Self {
            interval: config.interval_strategy(),
            config,
            feed,
            service,
            sink: Box::new(LogSink),
            clock: Arc::new(Utc::now),
            state: SyncState::Initializing,
            playlist: None,
            cache,
            evicted,
            cycles: 0,
        }
    }

    /// Replaces the event sink
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replaces the clock used to place items in time
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the interval strategy derived from the configuration
    pub fn with_interval_strategy(mut self, strategy: impl IntervalStrategy + 'static) -> Self {
        self.interval = Box::new(strategy);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn cache(&self) -> &TrackCache {
        &self.cache
    }

    /// The playlist resolved at startup
    pub fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    /// Number of cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Resolves the playlist and primes the cache from its recent tracks
    ///
    /// Uses the startup retry budget. Any error returned here is fatal.
    pub async fn initialize(&mut self) -> SyncResult<()> {
        self.state = SyncState::Initializing;
        let name = &self.config.playlist_name;
        self.emit(SyncEvent::Initializing {
            playlist: name.clone(),
        });

        let policy = &self.config.startup_policy;
        let playlist = self
            .retry(Operation::ResolvePlaylist, policy, || {
                self.service.get_or_create_playlist(name)
            })
            .await
            .map_err(|source| SyncError::PlaylistUnavailable {
                name: name.clone(),
                source,
            })?;
        self.emit(SyncEvent::PlaylistReady {
            playlist: playlist.to_string(),
        });

        let capacity = self.cache.capacity();
        let recent = self
            .retry(Operation::FetchRecentTracks, policy, || {
                self.service.recent_tracks(&playlist, capacity)
            })
            .await
            .map_err(SyncError::CachePriming)?;

        let size = self.cache.prime(recent);
        self.playlist = Some(playlist);
        self.emit(SyncEvent::CachePrimed { size, capacity });
        self.emit(SyncEvent::ScheduleMode {
            description: self.interval.describe(),
        });
        self.state = SyncState::Waiting;

        Ok(())
    }

    /// Runs one cycle and decides the wait before the next
    ///
    /// Errors are those that abandon the cycle as a whole: the feed could
    /// not be fetched or returned a short window. Per-item failures are
    /// reported as events and recorded as unmatched outcomes.
    pub async fn run_cycle(&mut self) -> SyncResult<CycleReport> {
        let playlist = self.playlist.clone().ok_or(SyncError::NotInitialized)?;

        self.cycles += 1;
        let cycle = self.cycles;
        self.emit(SyncEvent::CycleStarted { cycle });

        self.state = SyncState::Fetching;
        let fetched = self
            .retry(Operation::FetchWindow, &self.config.cycle_policy, || {
                self.feed.fetch_window()
            })
            .await;
        let observed_at = (self.clock)();
        self.state = SyncState::Waiting;

        let window = Window::new(fetched.map_err(SyncError::FeedUnavailable)?)?;
        self.report_now_playing(&window, observed_at);

        self.state = SyncState::Reconciling;
        let mut outcomes = Vec::with_capacity(2);
        for item in window.current_and_next() {
            let outcome = self.reconcile(&playlist, item).await;
            outcomes.push(outcome);
        }
        self.state = SyncState::Waiting;

        self.emit(SyncEvent::CacheSize {
            size: self.cache.len(),
            capacity: self.cache.capacity(),
        });

        let result = SyncCycleResult::new(outcomes, observed_at);
        let schedule = self.schedule(&result);

        Ok(CycleReport {
            cycle,
            result,
            schedule,
        })
    }

    /// Runs one cycle and returns the wait before the next, falling back
    /// to the fixed interval when the cycle fails
    pub async fn tick(&mut self) -> Duration {
        let wait = match self.run_cycle().await {
            Ok(report) => report.schedule.wait,
            Err(e) => {
                self.emit(SyncEvent::CycleFailed {
                    error: e.to_string(),
                });
                self.interval.fallback()
            }
        };
        self.state = SyncState::Waiting;
        self.emit(SyncEvent::NextSync { wait });
        wait
    }

    /// Runs forever
    pub async fn serve(&mut self) -> SyncResult<()> {
        self.serve_until(std::future::pending()).await
    }

    /// Initializes if needed, then cycles until `shutdown` completes
    ///
    /// Shutdown is only observed while waiting between cycles; a cycle in
    /// progress always finishes.
    pub async fn serve_until<S>(&mut self, shutdown: S) -> SyncResult<()>
    where
        S: Future<Output = ()>,
    {
        if self.playlist.is_none() {
            self.initialize().await?;
        }

        tokio::pin!(shutdown);
        loop {
            let wait = self.tick().await;
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => {
                    self.emit(SyncEvent::ShuttingDown);
                    return Ok(());
                }
            }
        }
    }

    fn schedule(&self, result: &SyncCycleResult) -> Schedule {
        match self.interval.next_interval(result) {
            Ok(schedule) => {
                if let ScheduleBasis::PartialMatch { matched, eligible } = schedule.basis {
                    self.emit(SyncEvent::PartialMatch { matched, eligible });
                }
                schedule
            }
            Err(e) => {
                self.emit(SyncEvent::IntervalFailed {
                    error: e.to_string(),
                });
                Schedule::new(self.interval.fallback(), ScheduleBasis::Fallback)
            }
        }
    }

    fn report_now_playing(&self, window: &Window, now: DateTime<Utc>) {
        let current = window.current();
        let position = match current.position_at(now) {
            Ok(position) => Some(position),
            Err(e) => {
                self.emit(SyncEvent::PositionUnavailable {
                    item: current.to_string(),
                    error: e.to_string(),
                });
                None
            }
        };

        self.emit(SyncEvent::NowPlaying {
            station: self.feed.name().to_string(),
            item: current.to_string(),
            kind: current.kind.clone(),
            position,
        });
    }

    async fn reconcile(&mut self, playlist: &Playlist, item: &UpstreamItem) -> ItemOutcome {
        let label = item.to_string();
        self.emit(SyncEvent::Searching {
            item: label.clone(),
        });

        if !item.is_music() {
            self.emit(SyncEvent::NotMusic { item: label });
            return ItemOutcome::skipped(item.clone());
        }

        let track = match self.search(item).await {
            Ok(Some(track)) => track,
            Ok(None) => {
                self.emit(SyncEvent::NotFound { item: label });
                return ItemOutcome::unmatched(item.clone());
            }
            Err(e) => {
                self.emit(SyncEvent::SearchFailed {
                    item: label,
                    error: e.to_string(),
                });
                return ItemOutcome::unmatched(item.clone());
            }
        };

        if self.cache.contains(&track.id) {
            self.emit(SyncEvent::AlreadyAdded {
                track: track.to_string(),
            });
            return ItemOutcome::matched(item.clone(), track);
        }

        let added = self
            .retry(Operation::AddTrack, &self.config.cycle_policy, || {
                self.service.add_track(playlist, &track)
            })
            .await;
        if let Err(e) = added {
            self.emit(SyncEvent::AddFailed {
                track: track.to_string(),
                error: e.to_string(),
            });
            return ItemOutcome::unmatched(item.clone());
        }

        if let Some(evicted) = self.cache.add(track.clone()) {
            self.emit(SyncEvent::Evicted {
                track: evicted.to_string(),
            });
        }
        self.emit(SyncEvent::Added {
            track: track.to_string(),
        });
        self.delete_evicted(playlist).await;

        ItemOutcome::matched(item.clone(), track)
    }

    async fn search(&self, item: &UpstreamItem) -> ResilienceResult<Option<DownstreamTrack>, SourceError> {
        let results = self
            .retry(Operation::Search, &self.config.cycle_policy, || {
                self.service.search_by_artist_track(&item.artist, &item.title)
            })
            .await?;
        Ok(results.into_iter().next())
    }

    /// Deletes queued evictions; failures are reported and dropped
    async fn delete_evicted(&self, playlist: &Playlist) {
        let pending: Vec<DownstreamTrack> = match &self.evicted {
            Some(queue) => queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .drain(..)
                .collect(),
            None => return,
        };

        for track in pending {
            let deleted = self
                .retry(Operation::DeleteTrack, &self.config.cycle_policy, || {
                    self.service.delete_track(playlist, &track)
                })
                .await;

            match deleted {
                Ok(()) => self.emit(SyncEvent::Deleted {
                    track: track.to_string(),
                }),
                Err(e) => self.emit(SyncEvent::DeleteFailed {
                    track: track.to_string(),
                    error: e.to_string(),
                }),
            }
        }
    }

    async fn retry<T, C, Fut>(
        &self,
        operation: Operation,
        policy: &RetryPolicy,
        call: C,
    ) -> ResilienceResult<T, SourceError>
    where
        C: FnMut() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        with_retry_notify(policy, call, |error: &SourceError, delay| {
            self.emit(SyncEvent::Retrying {
                operation,
                error: error.to_string(),
                delay,
            })
        })
        .await
    }

    fn emit(&self, event: SyncEvent) {
        self.sink.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticFeed;

    #[async_trait]
    impl UpstreamFeed for StaticFeed {
        fn name(&self) -> &str {
            "Test FM"
        }

        async fn fetch_window(&self) -> SourceResult<Vec<UpstreamItem>> {
            Ok(Vec::new())
        }
    }

    struct EmptyService;

    #[async_trait]
    impl DownstreamService for EmptyService {
        async fn get_or_create_playlist(&self, name: &str) -> SourceResult<Playlist> {
            Ok(Playlist::new("p1", name))
        }

        async fn recent_tracks(
            &self,
            _playlist: &Playlist,
            _limit: usize,
        ) -> SourceResult<Vec<DownstreamTrack>> {
            Ok(Vec::new())
        }

        async fn search_by_artist_track(
            &self,
            _artist: &str,
            _title: &str,
        ) -> SourceResult<Vec<DownstreamTrack>> {
            Ok(Vec::new())
        }

        async fn add_track(&self, _: &Playlist, _: &DownstreamTrack) -> SourceResult<()> {
            Ok(())
        }

        async fn delete_track(&self, _: &Playlist, _: &DownstreamTrack) -> SourceResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sync_config_default() {
        let config = SyncConfig::default();
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(config.cache_size, 100);
        assert!(!config.adaptive);
        assert!(!config.delete_evicted);
    }

    #[test]
    fn test_strategy_follows_config() {
        let mut config = SyncConfig::new("P3");
        assert!(config.interval_strategy().describe().starts_with("Syncing every"));

        config.adaptive = true;
        assert!(config.interval_strategy().describe().starts_with("Using adaptive"));
    }

    #[tokio::test]
    async fn test_cycle_before_initialize_fails() {
        let mut orchestrator = SyncOrchestrator::new(SyncConfig::new("P3"), StaticFeed, EmptyService);

        let err = orchestrator.run_cycle().await.unwrap_err();
        assert!(matches!(err, SyncError::NotInitialized));
        assert_eq!(orchestrator.cycles(), 0);
    }

    #[tokio::test]
    async fn test_initialize_resolves_playlist() {
        let mut orchestrator = SyncOrchestrator::new(SyncConfig::new("P3"), StaticFeed, EmptyService);
        assert_eq!(orchestrator.state(), SyncState::Initializing);

        orchestrator.initialize().await.unwrap();

        assert_eq!(orchestrator.playlist().map(|p| p.name.as_str()), Some("P3"));
        assert!(orchestrator.cache().is_empty());
        assert_eq!(orchestrator.state(), SyncState::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_window_is_structural() {
        let mut orchestrator = SyncOrchestrator::new(SyncConfig::new("P3"), StaticFeed, EmptyService);
        orchestrator.initialize().await.unwrap();

        let err = orchestrator.run_cycle().await.unwrap_err();
        assert!(err.is_structural());
        assert_eq!(orchestrator.tick().await, DEFAULT_INTERVAL);
    }
    #[tokio::test]
    async fn test_poisoned_eviction_queue_still_deletes() {
        let config = SyncConfig {
            cache_size: 1,
            delete_evicted: true,
            ..SyncConfig::new("P3")
        };
        let sink = crate::events::MemorySink::default();
        let mut orchestrator =
            SyncOrchestrator::new(config, StaticFeed, EmptyService).with_sink(sink.clone());
        orchestrator.initialize().await.unwrap();

        let queue = Arc::clone(orchestrator.evicted.as_ref().unwrap());
        let _ = std::thread::spawn(move || {
            let _guard = queue.lock().unwrap();
            panic!("listener crashed while holding the queue");
        })
        .join();

        orchestrator.cache.add(DownstreamTrack::new("a", "A", "spotify:track:a"));
        orchestrator.cache.add(DownstreamTrack::new("b", "B", "spotify:track:b"));

        let playlist = orchestrator.playlist().cloned().unwrap();
        orchestrator.delete_evicted(&playlist).await;

        assert_eq!(sink.count(|e| matches!(e, SyncEvent::Deleted { .. })), 1);
    }
}
