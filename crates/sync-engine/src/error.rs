// crates/sync-engine/src/error.rs
//! Error types for sync operations

use radiosync_core::{SourceError, WindowError};
use radiosync_resilience::ResilienceError;
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// How a sync error affects the running process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A remote call failed after its retry budget; the cycle is abandoned
    Transient,
    /// The feed returned something that cannot be reconciled this cycle
    Structural,
    /// Startup cannot complete; the process should exit
    Fatal,
}

/// Errors that can occur during synchronization
#[derive(Debug, Error)]
pub enum SyncError {
    /// The playlist could not be found or created
    #[error("Failed to resolve playlist '{name}': {source}")]
    PlaylistUnavailable {
        name: String,
        #[source]
        source: ResilienceError<SourceError>,
    },

    /// The recent playlist contents could not be read
    #[error("Failed to prime cache: {0}")]
    CachePriming(#[source] ResilienceError<SourceError>),

    /// The live feed could not be fetched
    #[error("Failed to fetch feed window: {0}")]
    FeedUnavailable(#[source] ResilienceError<SourceError>),

    /// The feed returned fewer items than a window needs
    #[error(transparent)]
    Window(#[from] WindowError),

    /// A cycle was requested before the orchestrator was initialized
    #[error("Sync engine not initialized")]
    NotInitialized,
}

impl SyncError {
    /// Classifies the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::PlaylistUnavailable { .. }
            | SyncError::CachePriming(_)
            | SyncError::NotInitialized => ErrorKind::Fatal,
            SyncError::FeedUnavailable(_) => ErrorKind::Transient,
            SyncError::Window(_) => ErrorKind::Structural,
        }
    }

    /// Returns true if the process cannot continue
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }

    /// Returns true if the feed data itself was unusable
    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn exhausted(err: SourceError) -> ResilienceError<SourceError> {
        ResilienceError::RetriesExhausted {
            attempts: 4,
            elapsed: Duration::from_secs(58),
            last_error: err,
        }
    }

    #[test]
    fn test_playlist_failure_is_fatal() {
        let err = SyncError::PlaylistUnavailable {
            name: "P3".to_string(),
            source: exhausted(SourceError::Network("refused".to_string())),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("P3"));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_feed_failure_is_transient() {
        let err = SyncError::FeedUnavailable(exhausted(SourceError::Http {
            status: 503,
            body: String::new(),
        }));
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_short_window_is_structural() {
        let err: SyncError = WindowError::TooShort { len: 1 }.into();
        assert!(err.is_structural());
    }

    #[test]
    fn test_not_initialized_error() {
        let err = SyncError::NotInitialized;
        assert!(err.to_string().contains("not initialized"));
        assert!(err.is_fatal());
    }
}
