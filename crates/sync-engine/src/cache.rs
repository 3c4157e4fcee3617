// crates/sync-engine/src/cache.rs
//! Bounded record of tracks already added to the playlist
//!
//! The cache answers "has this track been added recently?" so the same song
//! heard in two consecutive cycles is only appended once. When full, the
//! least-recently-inserted track is evicted and handed to the registered
//! [`EvictionListener`], which may schedule its removal from the playlist.

use radiosync_core::{DownstreamTrack, TrackId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Receives tracks pushed out of a full cache
///
/// Called synchronously from [`TrackCache::add`]. Listeners must not touch
/// the cache; anything slow (like a remote delete) should be queued.
pub trait EvictionListener: Send + Sync {
    fn on_evicted(&mut self, track: &DownstreamTrack);
}

impl<F> EvictionListener for F
where
    F: FnMut(&DownstreamTrack) + Send + Sync,
{
    fn on_evicted(&mut self, track: &DownstreamTrack) {
        self(track)
    }
}

/// A cached track with its recency rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub track: DownstreamTrack,
    /// Monotonic insertion rank; lower is older
    pub rank: u64,
}

/// LRU cache of downstream tracks keyed by track ID
///
/// Recency is insertion order. Membership checks do not refresh an entry,
/// and re-adding a present track is a no-op.
pub struct TrackCache {
    capacity: usize,
    entries: HashMap<TrackId, CacheEntry>,
    order: BTreeMap<u64, TrackId>,
    next_rank: u64,
    listener: Option<Box<dyn EvictionListener>>,
}

impl TrackCache {
    /// Creates an empty cache holding at most `capacity` tracks (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_rank: 0,
            listener: None,
        }
    }

    /// Registers the eviction listener
    pub fn with_listener(mut self, listener: impl EvictionListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Returns true if a track with this ID is cached
    pub fn contains(&self, id: &TrackId) -> bool {
        self.entries.contains_key(id)
    }

    /// Inserts a track, evicting the oldest entry if the cache is full
    ///
    /// Returns the evicted track, if any. The listener (when set) has
    /// already been notified by the time this returns.
    pub fn add(&mut self, track: DownstreamTrack) -> Option<DownstreamTrack> {
        let evicted = self.insert(track)?;
        if let Some(listener) = self.listener.as_mut() {
            listener.on_evicted(&evicted);
        }
        Some(evicted)
    }

    /// Seeds the cache from the playlist's recent tracks (oldest first)
    ///
    /// Only the newest `capacity` tracks are kept, inserted oldest to newest
    /// so recency mirrors the playlist. The listener is not notified.
    /// Returns the resulting cache size.
    pub fn prime(&mut self, tracks: Vec<DownstreamTrack>) -> usize {
        let skip = tracks.len().saturating_sub(self.capacity);
        for track in tracks.into_iter().skip(skip) {
            self.insert(track);
        }
        self.len()
    }

    fn insert(&mut self, track: DownstreamTrack) -> Option<DownstreamTrack> {
        if self.entries.contains_key(&track.id) {
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.pop_oldest()
        } else {
            None
        };

        let rank = self.next_rank;
        self.next_rank += 1;
        self.order.insert(rank, track.id.clone());
        self.entries.insert(track.id.clone(), CacheEntry { track, rank });

        evicted
    }

    fn pop_oldest(&mut self) -> Option<DownstreamTrack> {
        let (_, id) = self.order.pop_first()?;
        self.entries.remove(&id).map(|entry| entry.track)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Debug for TrackCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn track(id: &str) -> DownstreamTrack {
        DownstreamTrack::new(id, format!("Song {}", id), format!("spotify:track:{}", id))
    }

    fn recording_cache(capacity: usize) -> (TrackCache, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cache = TrackCache::new(capacity).with_listener(move |t: &DownstreamTrack| {
            sink.lock().unwrap().push(t.id.to_string());
        });
        (cache, seen)
    }

    #[test]
    fn test_add_and_contains() {
        let mut cache = TrackCache::new(3);
        assert!(cache.is_empty());

        assert!(cache.add(track("a")).is_none());
        assert!(cache.contains(&TrackId::from("a")));
        assert!(!cache.contains(&TrackId::from("b")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overflow_evicts_oldest_once() {
        let (mut cache, seen) = recording_cache(3);

        for id in ["a", "b", "c"] {
            cache.add(track(id));
        }
        let evicted = cache.add(track("d"));

        assert_eq!(evicted, Some(track("a")));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&TrackId::from("a")));
        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_re_adding_is_noop() {
        let (mut cache, seen) = recording_cache(2);

        cache.add(track("a"));
        cache.add(track("b"));
        assert!(cache.add(track("a")).is_none());

        // "a" keeps its original rank, so it is still the next to go
        cache.add(track("c"));
        assert!(!cache.contains(&TrackId::from("a")));
        assert!(cache.contains(&TrackId::from("b")));
        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_contains_does_not_refresh_recency() {
        let mut cache = TrackCache::new(2);
        cache.add(track("a"));
        cache.add(track("b"));

        assert!(cache.contains(&TrackId::from("a")));
        assert_eq!(cache.add(track("c")), Some(track("a")));
    }

    #[test]
    fn test_prime_keeps_newest_without_notifying() {
        let (mut cache, seen) = recording_cache(2);

        let size = cache.prime(vec![track("x"), track("y"), track("z")]);

        assert_eq!(size, 2);
        assert!(!cache.contains(&TrackId::from("x")));
        assert!(cache.contains(&TrackId::from("y")));
        assert!(cache.contains(&TrackId::from("z")));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_primed_order_drives_eviction() {
        let (mut cache, seen) = recording_cache(3);
        cache.prime(vec![track("x"), track("y"), track("z")]);

        cache.add(track("n"));
        cache.add(track("m"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["x".to_string(), "y".to_string()]
        );
        assert!(cache.contains(&TrackId::from("z")));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = TrackCache::new(0);
        assert_eq!(cache.capacity(), 1);

        cache.add(track("a"));
        assert_eq!(cache.add(track("b")), Some(track("a")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_debug_omits_listener() {
        let (cache, _) = recording_cache(5);
        let debug = format!("{:?}", cache);
        assert!(debug.contains("capacity: 5"));
        assert!(debug.contains("has_listener: true"));
    }
}
