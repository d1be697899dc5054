// ── Retry with exponential backoff ──

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Retry budget and backoff base.
///
/// The delay before retry `i` (0-based) is `base_delay * 2^i`. The
/// default budget is zero: callers opt in per client or per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
        }
    }

    pub const fn retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay before the `retry`-th retry (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.checked_pow(retry).unwrap_or(u32::MAX))
    }

    /// Run `operation`, retrying failures until the budget is spent.
    /// The last failure is returned as-is.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    debug!(
                        attempt = retry + 1,
                        max = self.max_retries,
                        ?delay,
                        error = %err,
                        "retrying after failure"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
