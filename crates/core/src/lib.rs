//! Core data model for radiosync
//!
//! radiosync mirrors a radio station's live "now playing" feed into a
//! playlist on a music service. This crate holds the value types shared by
//! the sync engine and the service clients.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{ParseError, ParseResult, SourceError, SourceResult, WindowError};
pub use types::{
    parse_duration, parse_start_time, DownstreamTrack, Playlist, Position, TrackId, UpstreamItem,
    Window, MUSIC_TYPE,
};
