// crates/resilience/src/error.rs
//! Error types for resilience operations

use std::time::Duration;
use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// The retry budget ran out; carries the error of the final attempt
    #[error("All {attempts} retry attempts exhausted after {elapsed:?}: {last_error}")]
    RetriesExhausted {
        attempts: usize,
        elapsed: Duration,
        last_error: E,
    },
}

impl<E> ResilienceError<E> {
    /// Number of times the operation was invoked
    pub fn attempts(&self) -> usize {
        match self {
            ResilienceError::RetriesExhausted { attempts, .. } => *attempts,
        }
    }

    /// The error returned by the final attempt
    pub fn last_error(&self) -> &E {
        match self {
            ResilienceError::RetriesExhausted { last_error, .. } => last_error,
        }
    }

    /// Unwraps the error returned by the final attempt
    pub fn into_inner(self) -> E {
        match self {
            ResilienceError::RetriesExhausted { last_error, .. } => last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_error() {
        let err = ResilienceError::RetriesExhausted {
            attempts: 3,
            elapsed: Duration::from_secs(5),
            last_error: "connection failed".to_string(),
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("5s"));
        assert!(err.to_string().contains("connection failed"));
    }

    #[test]
    fn test_accessors() {
        let err = ResilienceError::RetriesExhausted {
            attempts: 2,
            elapsed: Duration::ZERO,
            last_error: 42,
        };
        assert_eq!(err.attempts(), 2);
        assert_eq!(*err.last_error(), 42);
        assert_eq!(err.into_inner(), 42);
    }
}
