//! Domain types for radiosync
//!
//! This module contains the domain models organized by responsibility:
//! - `item`: upstream feed items
//! - `window`: the previous/current/next feed window
//! - `position`: elapsed/total time of the airing item
//! - `track`: downstream tracks and playlists
//! - `encoding`: decoders for the feed's start time and duration formats

mod encoding;
mod item;
mod position;
mod track;
mod window;

// Re-export all public types
pub use encoding::{parse_duration, parse_start_time};
pub use item::{UpstreamItem, MUSIC_TYPE};
pub use position::Position;
pub use track::{DownstreamTrack, Playlist, TrackId};
pub use window::Window;
