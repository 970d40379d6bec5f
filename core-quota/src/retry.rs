//! # Retry Engine
//!
//! Exponential backoff for transient failures only. Quota exhaustion is a
//! terminal signal at this level (rotation happens above, in the provider),
//! and authentication failures propagate immediately — retrying either would
//! just burn quota or hammer a dead credential.

use bridge_traits::error::ApiResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub max_attempts: u32,
    /// Backoff before attempt `n + 1` is `backoff_base * 2^n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// Run `op`, retrying retryable failures with exponential backoff.
///
/// `op` is re-invoked from scratch on every attempt, so it must rebuild its
/// request each time. Non-retryable errors (quota, auth, hard rejections)
/// return immediately; the last transient error is returned once attempts
/// run out.
pub async fn execute_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => e,
            Err(e) => return Err(e),
        };

        attempt += 1;
        if attempt >= attempts {
            warn!(
                operation,
                attempts, error = %err,
                "Giving up after final attempt"
            );
            return Err(err);
        }

        let delay = policy.backoff_base * 2u32.pow(attempt - 1);
        warn!(
            operation,
            attempt,
            max_attempts = attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transient failure, retrying"
        );
        sleep(delay).await;
    }
}
