//! Bounded retry with a fixed delay between attempts.

use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

use crate::{Result, StochbotError};

/// How many times a request is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Sleep between a failed attempt and the next one.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Fixed-delay policy. `max_attempts` is clamped to at least one.
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// the attempts run out.
    ///
    /// `target` names the request in logs and in
    /// [`StochbotError::RetriesExhausted`]. There is no sleep after the
    /// final attempt.
    pub async fn run<T, F, Fut>(&self, target: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for attempt in 1..=self.max_attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(
                        request = target,
                        attempt,
                        max = self.max_attempts,
                        "attempt failed: {e}"
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        error!(request = target, attempts = self.max_attempts, "giving up after exhausting retries");
        Err(StochbotError::RetriesExhausted {
            target: target.to_string(),
            attempts: self.max_attempts,
        })
    }
}
