use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

use crate::error::ApiError;

/// Retry budget for one kind of API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self { max_attempts, initial_delay_ms, max_delay_ms }
    }

    /// Policy that never sleeps, for tests
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, 0, 0)
    }

    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(*self)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4, 300, 2_000)
    }
}

#[derive(Debug)]
pub struct ExponentialBackoff {
    policy: RetryPolicy,
    current_attempt: u32,
}

impl ExponentialBackoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, current_attempt: 0 }
    }

    /// Delay before the next retry, or `None` once the budget is spent
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.current_attempt + 1 >= self.policy.max_attempts.max(1) {
            return None;
        }
        let factor = 2_u64.saturating_pow(self.current_attempt);
        let delay = self
            .policy
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.policy.max_delay_ms);
        self.current_attempt += 1;
        Some(Duration::from_millis(delay))
    }

    pub fn attempts(&self) -> u32 {
        self.current_attempt + 1
    }
}

/// Run `op` until it succeeds, fails permanently, or the budget runs out.
/// Only transient errors are retried.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut backoff = policy.backoff();
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => match backoff.next_delay() {
                Some(delay) => {
                    warn!(
                        "{} failed (attempt {}/{}): {} - retrying in {:?}",
                        label,
                        backoff.attempts() - 1,
                        policy.max_attempts,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                None => {
                    warn!("{} giving up after {} attempts: {}", label, backoff.attempts(), e);
                    return Err(e);
                }
            },
            Err(e) => return Err(e),
        }
    }
}
