//! Bounded retry with backoff for transient errors
//!
//! Each attempt runs under its own deadline. Between attempts the executor
//! waits for the next interval of a `backoff::ExponentialBackoff`; with the
//! default factor of 1.0 that interval never grows.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use log::{debug, warn};

use crate::error::{Result, TransformError};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Multiplier applied to the delay after every attempt
    pub backoff_factor: f64,

    /// Delay before the first retry
    pub min_interval: Duration,

    /// Upper bound for any delay
    pub max_interval: Duration,

    /// Deadline of a single attempt
    pub per_attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff_factor: 1.0,
            min_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(60),
            per_attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy for uploads: few attempts, long deadline
    pub fn upload() -> Self {
        Self::default()
    }

    /// Policy for downloads of accepted jobs: many attempts, short deadline
    pub fn download() -> Self {
        Self {
            max_attempts: 11,
            per_attempt_timeout: Duration::from_secs(10),
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.min_interval,
            initial_interval: self.min_interval,
            randomization_factor: 0.0,
            multiplier: self.backoff_factor,
            max_interval: self.max_interval.max(self.min_interval),
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }
}

/// Executor for retry operations
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    /// Retry policy
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor with the specified policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Execute a fallible operation with retries according to the policy
    ///
    /// `label` names the operation in the per-attempt diagnostics.
    pub async fn execute<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.policy.backoff();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = match tokio::time::timeout(self.policy.per_attempt_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(TransformError::timeout(format!(
                    "{} attempt exceeded {:?}",
                    label, self.policy.per_attempt_timeout
                ))),
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            warn!("{} error caught (attempt #{}): {}", label, attempt, err);

            if err.is_terminal() {
                return Err(err);
            }

            if attempt >= max_attempts {
                return Err(TransformError::exhausted(attempt, &err));
            }

            let delay = backoff.next_backoff().unwrap_or(self.policy.min_interval);
            debug!("Retrying {} in {:?}", label, delay);
            tokio::time::sleep(delay).await;
        }
    }
}
