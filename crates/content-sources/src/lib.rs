// crates/content-sources/src/lib.rs
//! Clients for the services radiosync syncs between
//!
//! - [`NrkRadio`] reads an NRK channel's live feed and implements
//!   [`UpstreamFeed`](radiosync_sync_engine::UpstreamFeed)
//! - [`Spotify`] manages a playlist through the Spotify Web API and
//!   implements [`DownstreamService`](radiosync_sync_engine::DownstreamService)

mod error;
mod nrk;
mod spotify;
mod token;

pub use error::{ClientError, ClientResult};
pub use nrk::{channel_ids, NrkRadio, DEFAULT_BASE_URL};
pub use spotify::{Spotify, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL};
pub use token::{Credentials, Profile, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sources_exported() {
        assert!(NrkRadio::new("P3", "p3").is_ok());
        assert!(!channel_ids().is_empty());
        assert!(DEFAULT_API_URL.starts_with("https://"));
    }
}
