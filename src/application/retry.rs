//! Bounded exponential-backoff retry for remote operations.
//!
//! [`with_retry`] never raises: it hands back an [`Attempted`] carrying the
//! final outcome and the number of attempts made, and callers decide what
//! an exhausted budget means for their step.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

/// Attempt budget and initial backoff delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

const fn default_max_attempts() -> u32 {
    10
}

const fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
        }
    }

    /// A single attempt, no waiting.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(1, 0)
    }

    /// Delay before attempt `attempt + 1`, doubling from the base delay.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Final outcome of a retried operation.
#[derive(Debug)]
pub struct Attempted<T, E> {
    pub outcome: Result<T, E>,
    pub attempts: u32,
}

impl<T, E> Attempted<T, E> {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Drop the attempt count.
    ///
    /// # Errors
    ///
    /// Returns the last failure when every attempt failed.
    pub fn into_result(self) -> Result<T, E> {
        self.outcome
    }
}

/// Run `op` until it succeeds or the attempt budget is spent.
///
/// Every failure is followed by a backoff of `base, 2*base, 4*base, ...`,
/// the last one included, so an exhausted budget has always waited
/// `base * (2^max - 1)`. A success on the last allowed attempt is a success.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, op: F) -> Attempted<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_retry_if(policy, label, op, |_| true).await
}

/// Like [`with_retry`], but stops at the first error `retryable` declines.
///
/// A declined error is returned at once, without a backoff.
pub async fn with_retry_if<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
    retryable: R,
) -> Attempted<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    R: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = label, attempt, "Succeeded after retry");
                }
                return Attempted {
                    outcome: Ok(value),
                    attempts: attempt,
                };
            }
            Err(error) if !retryable(&error) => {
                debug!(operation = label, attempt, error = %error, "Failure is not retryable");
                return Attempted {
                    outcome: Err(error),
                    attempts: attempt,
                };
            }
            Err(error) => {
                let delay = policy.delay_after(attempt);
                let exhausted = attempt >= max_attempts;
                warn!(
                    operation = label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Attempt failed"
                );
                tokio::time::sleep(delay).await;
                if exhausted {
                    warn!(operation = label, attempts = attempt, "Retry budget exhausted");
                    return Attempted {
                        outcome: Err(error),
                        attempts: attempt,
                    };
                }
            }
        }
    }
}
