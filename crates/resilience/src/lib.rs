// crates/resilience/src/lib.rs
//! Resilience patterns for fault-tolerant network calls
//!
//! Every call radiosync makes to the feed or the playlist service goes
//! through [`with_retry`] / [`with_retry_notify`]: exponential backoff
//! bounded by a total wall-clock budget. The executor itself never logs;
//! callers observe retries through the notify closure.
//!
//! # Example
//!
//! ```rust
//! use radiosync_resilience::{with_retry_notify, RetryPolicy};
//!
//! # async fn fetch() -> Result<u32, String> { Ok(7) }
//! # async fn run() {
//! let policy = RetryPolicy::cycle();
//! let value = with_retry_notify(&policy, fetch, |err, delay| {
//!     eprintln!("fetch failed: {err}, retrying in {delay:?}");
//! })
//! .await;
//! assert_eq!(value.ok(), Some(7));
//! # }
//! ```

mod error;
mod retry;

pub use error::{ResilienceError, ResilienceResult};
pub use retry::{with_retry, with_retry_notify, RetryPolicy, CYCLE_BUDGET, STARTUP_BUDGET};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _: RetryPolicy = RetryPolicy::default();
        let _: RetryPolicy = RetryPolicy::new(STARTUP_BUDGET);
        let _: RetryPolicy = RetryPolicy::new(CYCLE_BUDGET);
    }
}
