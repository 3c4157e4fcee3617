// crates/resilience/src/retry.rs
//! Retry policies with exponential backoff and a wall-clock budget

use crate::error::{ResilienceError, ResilienceResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Budget for operations the process cannot start without
pub const STARTUP_BUDGET: Duration = Duration::from_secs(5 * 60);

/// Budget for operations performed inside a sync cycle
pub const CYCLE_BUDGET: Duration = Duration::from_secs(60);

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total wall-clock time allowed across all attempts and delays
    max_elapsed: Duration,
    /// Optional cap on the number of attempts
    max_attempts: Option<usize>,
    /// Delay before the first retry
    initial_delay: Duration,
    /// Maximum delay between retries
    max_delay: Duration,
    /// Backoff multiplier
    multiplier: f64,
    /// Whether to use jitter
    use_jitter: bool,
}

impl RetryPolicy {
    /// Creates a policy that keeps retrying until `max_elapsed` has passed
    pub fn new(max_elapsed: Duration) -> Self {
        Self {
            max_elapsed,
            max_attempts: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            multiplier: 1.5,
            use_jitter: true,
        }
    }

    /// Long budget for startup-critical operations
    pub fn startup() -> Self {
        Self::new(STARTUP_BUDGET)
    }

    /// Short budget for steady-state per-cycle operations
    pub fn cycle() -> Self {
        Self::new(CYCLE_BUDGET)
    }

    /// Caps the number of attempts (including the first attempt)
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Sets the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets whether to use jitter
    pub fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Calculates the delay to wait after the given (1-based) failed attempt
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let base_delay = self.initial_delay.as_millis() as f64
            * self.multiplier.powi((attempt - 1) as i32);

        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let final_delay = if self.use_jitter {
            // Scale into [0.75, 1.0) so the cap is never exceeded
            let jitter_factor = 0.75 + (attempt as f64 * 0.1 % 0.25);
            capped_delay * jitter_factor
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }

    /// Returns the wall-clock budget
    pub fn max_elapsed(&self) -> Duration {
        self.max_elapsed
    }

    /// Returns the attempt cap, if any
    pub fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::cycle()
    }
}

/// Executes an operation with retry logic
///
/// See [`with_retry_notify`].
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> ResilienceResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    with_retry_notify(policy, operation, |_, _| {}).await
}

/// Executes an operation with retry logic, reporting each scheduled retry
///
/// The operation is invoked at least once. After a failure, `notify` is
/// called with the error and the upcoming delay, then the executor sleeps
/// and tries again. When the next delay would overrun the policy's budget
/// (or the attempt cap is reached) the last error is returned inside
/// [`ResilienceError::RetriesExhausted`].
pub async fn with_retry_notify<T, E, F, Fut, N>(
    policy: &RetryPolicy,
    mut operation: F,
    mut notify: N,
) -> ResilienceResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    N: FnMut(&E, Duration),
{
    let start = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        let delay = policy.delay_for_attempt(attempt);
        let elapsed = start.elapsed();
        let out_of_attempts = policy.max_attempts.is_some_and(|max| attempt >= max);

        if out_of_attempts || elapsed + delay > policy.max_elapsed {
            return Err(ResilienceError::RetriesExhausted {
                attempts: attempt,
                elapsed,
                last_error: error,
            });
        }

        notify(&error, delay);
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_elapsed(), CYCLE_BUDGET);
        assert_eq!(policy.max_attempts(), None);
    }

    #[test]
    fn test_budget_presets() {
        assert_eq!(RetryPolicy::startup().max_elapsed(), Duration::from_secs(300));
        assert_eq!(RetryPolicy::cycle().max_elapsed(), Duration::from_secs(60));
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicy::new(Duration::from_secs(10))
            .with_max_attempts(5)
            .with_initial_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(60))
            .with_multiplier(3.0)
            .with_jitter(false);

        assert_eq!(policy.max_attempts(), Some(5));
        assert_eq!(policy.initial_delay, Duration::from_millis(200));
        assert_eq!(policy.max_delay, Duration::from_secs(60));
        assert_eq!(policy.multiplier, 3.0);
        assert!(!policy.use_jitter);
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::cycle()
            .with_initial_delay(Duration::from_millis(100))
            .with_multiplier(2.0)
            .with_jitter(false);

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(0));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn test_max_delay_capping() {
        let policy = RetryPolicy::cycle()
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5))
            .with_multiplier(2.0);

        for attempt in 1..20 {
            assert!(policy.delay_for_attempt(attempt) <= Duration::from_secs(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_success_first_attempt() {
        let policy = RetryPolicy::cycle();
        let mut call_count = 0;

        let result = with_retry(&policy, || {
            call_count += 1;
            async { Ok::<_, String>(42) }
        })
        .await;

        assert_eq!(result.ok(), Some(42));
        assert_eq!(call_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_success_after_failures() {
        let policy = RetryPolicy::cycle();
        let mut call_count = 0;
        let mut notified = Vec::new();

        let result = with_retry_notify(
            &policy,
            || {
                call_count += 1;
                let outcome = if call_count < 3 {
                    Err("temporary error")
                } else {
                    Ok(42)
                };
                async move { outcome }
            },
            |err, delay| notified.push((err.to_string(), delay)),
        )
        .await;

        assert_eq!(result.ok(), Some(42));
        assert_eq!(call_count, 3);
        assert_eq!(notified.len(), 2);
        assert_eq!(notified[0].0, "temporary error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_stops_at_budget() {
        let policy = RetryPolicy::cycle();
        let start = Instant::now();
        let mut call_count = 0;

        let result = with_retry(&policy, || {
            call_count += 1;
            async { Err::<i32, _>("persistent error") }
        })
        .await;

        let err = result.unwrap_err();
        assert!(call_count > 1);
        assert_eq!(err.attempts(), call_count);
        assert_eq!(*err.last_error(), "persistent error");
        assert!(start.elapsed() <= CYCLE_BUDGET);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_respects_attempt_cap() {
        let policy = RetryPolicy::startup().with_max_attempts(3);
        let mut call_count = 0;

        let result = with_retry(&policy, || {
            call_count += 1;
            async { Err::<(), _>("nope") }
        })
        .await;

        assert_eq!(result.unwrap_err().attempts(), 3);
        assert_eq!(call_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_runs_once() {
        let policy = RetryPolicy::new(Duration::ZERO);
        let mut call_count = 0;

        let result = with_retry(&policy, || {
            call_count += 1;
            async { Err::<(), _>("down") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count, 1);
    }
}
