//! Bounded retry with exponential backoff
//!
//! Waits `initial_delay * 2^i` between attempt *i* and *i+1*, no jitter,
//! no wait after the final failure. Only transient errors are retried
//! (see [`Error::is_retryable`]); client errors surface verbatim after
//! the first attempt.

use std::time::Duration;

use crate::error::{Error, Result};

/// Retry constants for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; total attempts = max_retries + 1
    pub max_retries: u32,
    /// Delay before the first retry, doubled each subsequent attempt
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the retry following 0-indexed attempt `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(attempt)
    }
}

/// Run `op` with up to `max_retries + 1` attempts.
///
/// Every failed attempt is logged with the operation name and attempt
/// index before the retry decision. Exhaustion yields
/// [`Error::RetriesExhausted`] embedding the last failure's message and
/// the attempt count; a non-retryable error is returned unchanged.
pub async fn retry_with_backoff<T, F, Fut>(
    operation: &str,
    policy: RetryPolicy,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let total_attempts = policy.max_retries + 1;
    let mut last_error = None;

    for attempt in 0..total_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                log::warn!(
                    "{}: attempt {}/{} failed: {}",
                    operation,
                    attempt + 1,
                    total_attempts,
                    err
                );

                if !err.is_retryable() {
                    return Err(err);
                }
                last_error = Some(err);

                // No wait after the final attempt
                if attempt + 1 == total_attempts {
                    break;
                }

                let wait = policy.backoff(attempt);
                log::debug!("{}: retrying in {:?}", operation, wait);
                tokio::time::sleep(wait).await;
            }
        }
    }

    let message = last_error
        .map(|e| e.user_message())
        .unwrap_or_else(|| "Unknown error".to_string());

    Err(Error::RetriesExhausted {
        attempts: total_attempts,
        message,
    })
}
