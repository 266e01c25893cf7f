//! Retry with backoff for calls to hosted models.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed,
    /// Delay multiplied by `multiplier` after each retry.
    Exponential { multiplier: u32 },
}

/// Retry policy for a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff: Backoff::Exponential { multiplier: 2 },
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt` (0-based), capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            Backoff::Fixed => self.initial_delay,
            Backoff::Exponential { multiplier } => {
                let factor = multiplier.max(1).saturating_pow(attempt);
                self.initial_delay.saturating_mul(factor)
            }
        };
        delay.min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// the policy runs out of attempts.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    label,
                    attempt + 1,
                    max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
