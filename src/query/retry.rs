//! Retry policy for cached reads.

use crate::error::ErrorEnvelope;
use std::time::Duration;

/// How many times a read is attempted and how long to wait in between.
///
/// Only errors whose envelope is `retryable` are re-attempted.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,
    /// Whether to add ±25% jitter to the delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    /// `min(1000 * 2^attempt, 30000)` ms, three attempts.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Whether a failure on attempt `attempt` (0-indexed) should be retried.
    pub fn should_retry(&self, attempt: u32, err: &ErrorEnvelope) -> bool {
        err.retryable && attempt + 1 < self.max_attempts
    }

    /// Delay after the failed attempt `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64
            * self.backoff_factor.powi(attempt.min(31) as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let final_ms = if self.jitter {
            let jitter_range = capped * 0.25;
            let jitter = (rand::random::<f64>() - 0.5) * 2.0 * jitter_range;
            (capped + jitter).clamp(0.0, self.max_delay.as_millis() as f64)
        } else {
            capped
        };

        Duration::from_millis(final_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0).as_millis(), 1000);
        assert_eq!(policy.delay_for_attempt(1).as_millis(), 2000);
        assert_eq!(policy.delay_for_attempt(2).as_millis(), 4000);
        assert_eq!(policy.delay_for_attempt(5).as_millis(), 30000);
        assert_eq!(policy.delay_for_attempt(40).as_millis(), 30000);
    }

    #[test]
    fn test_should_retry_respects_kind_and_budget() {
        let policy = RetryPolicy::default();
        let transient = ErrorEnvelope::timeout("slow");
        let fatal = ErrorEnvelope::validation("bad");
        assert!(policy.should_retry(0, &transient));
        assert!(policy.should_retry(1, &transient));
        assert!(!policy.should_retry(2, &transient));
        assert!(!policy.should_retry(0, &fatal));
        assert!(!RetryPolicy::none().should_retry(0, &transient));
    }

    #[test]
    fn test_jitter_stays_within_cap() {
        let policy = RetryPolicy::default().with_jitter(true);
        for attempt in 0..10 {
            assert!(policy.delay_for_attempt(attempt) <= policy.max_delay);
        }
    }
}
