// crates/content-sources/src/error.rs
//! Error types for the service clients

use radiosync_core::SourceError;
use radiosync_network::NetworkError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by the feed and playlist clients
#[derive(Debug, Error)]
pub enum ClientError {
    /// The radio ID is not a known channel
    #[error("{0} is not a valid radio ID")]
    UnknownChannel(String),

    /// The token file could not be read or written
    #[error("Failed to access token file {path}: {source}")]
    TokenIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token file is not valid JSON
    #[error("Invalid token file {path}: {source}")]
    TokenFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A request to the remote service failed
    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl From<ClientError> for SourceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(e) => e.into(),
            ClientError::UnknownChannel(_) => SourceError::InvalidResponse(err.to_string()),
            ClientError::TokenIo { .. } | ClientError::TokenFormat { .. } => {
                SourceError::Storage(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_channel_display() {
        let err = ClientError::UnknownChannel("p42".to_string());
        assert_eq!(err.to_string(), "p42 is not a valid radio ID");
    }

    #[test]
    fn test_token_errors_become_storage() {
        let err = ClientError::TokenIo {
            path: PathBuf::from("/tmp/token.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let source: SourceError = err.into();
        assert!(matches!(source, SourceError::Storage(msg) if msg.contains("token.json")));
    }

    #[test]
    fn test_network_status_is_preserved() {
        let err = ClientError::Network(NetworkError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        });
        let source: SourceError = err.into();
        assert_eq!(source.status(), Some(502));
    }
}
