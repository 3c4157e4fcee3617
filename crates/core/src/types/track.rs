//! Downstream tracks and playlists

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Service-assigned track identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Creates a track ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A track on the downstream service
///
/// Equality and hashing use the ID only: two results with the same ID are
/// the same track regardless of display name or URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownstreamTrack {
    pub id: TrackId,
    pub name: String,
    /// Playable reference used when adding to or removing from a playlist
    pub uri: String,
}

impl DownstreamTrack {
    pub fn new(id: impl Into<String>, name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(id),
            name: name.into(),
            uri: uri.into(),
        }
    }
}

impl PartialEq for DownstreamTrack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DownstreamTrack {}

impl Hash for DownstreamTrack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for DownstreamTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A playlist on the downstream service
///
/// The track listing is a snapshot taken when the playlist was fetched; it
/// is replaced wholesale on every query and never patched locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<DownstreamTrack>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    /// Sets the track snapshot
    pub fn with_tracks(mut self, tracks: Vec<DownstreamTrack>) -> Self {
        self.tracks = tracks;
        self
    }

    /// Number of tracks in the snapshot
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns true if the snapshot holds no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{} songs]", self.name, self.id, self.len())
    }
}
