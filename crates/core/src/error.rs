//! Error types shared by the radiosync crates
//!
//! Three kinds of failure live here:
//! - **Parse**: a feed item carries a start time or duration we cannot decode.
//!   These are data errors and are never retried.
//! - **Window**: the feed returned too few items to form a previous/current/next triple.
//! - **Source**: a collaborator (feed or playlist service) request failed.
//!   These are transient and are retried by the caller.

use thiserror::Error;

/// Result type for feed-encoding parsers
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for collaborator requests
pub type SourceResult<T> = Result<T, SourceError>;

/// A feed item field could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Start time is not of the form `/Date(<millis>+<offset>)/`
    #[error("Could not parse start time: '{0}'")]
    InvalidStartTime(String),

    /// Duration is not an ISO-8601-like `PT#H#M#S` token
    #[error("Could not parse duration: '{0}'")]
    InvalidDuration(String),
}

/// The feed did not return a usable window
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Fewer than three items: no current/next pair can be derived
    #[error("Feed window has {len} item(s), need at least 3 (previous, current, next)")]
    TooShort { len: usize },
}

/// A request to the upstream feed or the downstream playlist service failed
///
/// Authentication problems are folded into the generic variants: callers of
/// the collaborators never have to treat them differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Transport-level failure (connect, timeout, TLS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("Request failed [{status}]: {body}")]
    Http { status: u16, body: String },

    /// The service answered but the body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local credential storage could not be read or written
    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl SourceError {
    /// Returns the HTTP status if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
