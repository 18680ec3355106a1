//! Bounded exponential backoff for the forecast fetch.
//!
//! Retries timeouts, connection failures, 5xx, 408 and 429. Anything else,
//! including a malformed body, is returned immediately.

use std::future::Future;
use std::time::Duration;

use shoreline_core::{NetworkError, WeatherConfig};

const MAX_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry (doubles each attempt)
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &WeatherConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            max_delay: MAX_DELAY,
        }
    }

    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&WeatherConfig::default())
    }
}

pub fn is_transient(error: &NetworkError) -> bool {
    match error {
        NetworkError::Timeout | NetworkError::ConnectionFailed(_) => true,
        NetworkError::ServerError { status, .. } => {
            *status >= 500 || *status == 408 || *status == 429
        }
        NetworkError::InvalidResponse(_) => false,
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
pub async fn with_backoff<F, Fut, T>(policy: &RetryPolicy, operation: F) -> Result<T, NetworkError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, NetworkError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Forecast fetch succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) if is_transient(&e) && attempt < policy.max_retries => {
                let delay = policy.delay_for_attempt(attempt);
                attempt += 1;
                tracing::warn!(
                    "Transient forecast error ({}), retry {} of {} in {:?}",
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
