// crates/sync-engine/src/traits.rs
//! Collaborator seams
//!
//! The orchestrator only talks to the outside world through these two
//! traits. Implementations make a single attempt per call; retries and
//! budgets are applied by the orchestrator.

use async_trait::async_trait;
use radiosync_core::{DownstreamTrack, Playlist, SourceResult, UpstreamItem};

/// A live "now playing" feed
#[async_trait]
pub trait UpstreamFeed: Send + Sync {
    /// Human-readable station name
    fn name(&self) -> &str;

    /// Fetches the ordered previous/current/next items
    async fn fetch_window(&self) -> SourceResult<Vec<UpstreamItem>>;
}

/// A music service holding the target playlist
#[async_trait]
pub trait DownstreamService: Send + Sync {
    /// Finds the user's playlist with this exact name, creating it if absent
    async fn get_or_create_playlist(&self, name: &str) -> SourceResult<Playlist>;

    /// Returns up to `limit` of the most recently appended tracks, oldest first
    async fn recent_tracks(&self, playlist: &Playlist, limit: usize)
        -> SourceResult<Vec<DownstreamTrack>>;

    /// Searches by artist and title; results are ordered best match first
    async fn search_by_artist_track(
        &self,
        artist: &str,
        title: &str,
    ) -> SourceResult<Vec<DownstreamTrack>>;

    /// Appends a track to the playlist
    async fn add_track(&self, playlist: &Playlist, track: &DownstreamTrack) -> SourceResult<()>;

    /// Removes every occurrence of a track from the playlist
    async fn delete_track(&self, playlist: &Playlist, track: &DownstreamTrack)
        -> SourceResult<()>;
}
