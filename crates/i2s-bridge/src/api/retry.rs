//! Exponential backoff for transient generation failures.
//!
//! Only errors classified by [`BridgeError::is_transient`] (HTTP 429/5xx,
//! timeouts, refused connections) are retried. The default configuration
//! performs no retries.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{BridgeError, Result};

/// Per-attempt scale factors applied to the doubled delay. Fixed, so the
/// same failure sequence always produces the same schedule.
const SPREAD: [f64; 4] = [0.75, 0.9, 0.6, 0.85];

/// Backoff schedule for [`GeminiClient`](crate::api::GeminiClient).
///
/// Retry `n` waits `base_delay * 2^n`, capped at `max_delay`, scaled by
/// [`SPREAD`]. A 429 never waits less than `rate_limit_floor`; Gemini
/// counts quota per minute.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Minimum wait after an HTTP 429.
    pub rate_limit_floor: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            rate_limit_floor: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt` (0-indexed), ignoring the error kind.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let doubled = self
            .base_delay
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_delay);
        doubled.mul_f64(SPREAD[attempt as usize % SPREAD.len()])
    }

    /// Delay before retrying after `error`.
    pub fn delay_after(&self, error: &BridgeError, attempt: u32) -> Duration {
        let delay = self.delay_after(&e, attempt);
        match error {
            BridgeError::Api { status: 429, .. } => delay.max(self.rate_limit_floor),
            _ => delay,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if should_retry(&e, attempt, self) => {
                    let delay = self.delay_after(&e, attempt);
                    warn!(
                        "transient error (attempt {}/{}): {e}; retrying in {:.1}s",
                        attempt + 1,
                        self.max_retries + 1,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether `error` on retry number `attempt` warrants another try.
pub fn should_retry(error: &BridgeError, attempt: u32, config: &RetryConfig) -> bool {
    attempt < config.max_retries && error.is_transient()
}
