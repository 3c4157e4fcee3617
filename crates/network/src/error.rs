// crates/network/src/error.rs
//! Error types for network operations

use radiosync_core::SourceError;
use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur during network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Request failed [{status}]: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl NetworkError {
    /// Returns the HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            NetworkError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the server rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns true if the error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns true if the error is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }
}

impl From<NetworkError> for SourceError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Status { status, body } => SourceError::Http { status, body },
            NetworkError::Decode(msg) => SourceError::InvalidResponse(msg),
            other => SourceError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetworkError::InvalidUrl("test".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_status_classification() {
        let unauthorized = NetworkError::Status {
            status: 401,
            body: "expired".to_string(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(unauthorized.is_client_error());
        assert!(!unauthorized.is_server_error());

        let unavailable = NetworkError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(unavailable.is_server_error());
        assert!(!unavailable.is_unauthorized());
    }

    #[test]
    fn test_conversion_to_source_error() {
        let err: SourceError = NetworkError::Status {
            status: 404,
            body: "missing".to_string(),
        }
        .into();
        assert_eq!(
            err,
            SourceError::Http {
                status: 404,
                body: "missing".to_string()
            }
        );

        let err: SourceError = NetworkError::Decode("bad json".to_string()).into();
        assert!(matches!(err, SourceError::InvalidResponse(_)));

        let err: SourceError = NetworkError::InvalidUrl("::".to_string()).into();
        assert!(matches!(err, SourceError::Network(_)));
    }
}
