use std::fmt::Display;
use std::future::Future;

use tokio::time::{sleep, Duration};
use tracing::{error, warn};

use crate::config::settings::RetryConfig;

const DEFAULT_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY_MS: u64 = 500;
const DEFAULT_MAX_DELAY_MS: u64 = 5_000;

/// Exponential backoff: the delay doubles after every failure up to `max_delay_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    pub attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetrySettings {
    pub fn from_config(retry: Option<&RetryConfig>) -> Self {
        let defaults = Self::default();
        Self {
            attempts: retry.and_then(|r| r.attempts).unwrap_or(defaults.attempts),
            base_delay_ms: retry.and_then(|r| r.base_delay_ms).unwrap_or(defaults.base_delay_ms),
            max_delay_ms: retry.and_then(|r| r.max_delay_ms).unwrap_or(defaults.max_delay_ms),
        }
    }

    pub async fn run_with_retry<F, Fut, T, E>(&self, what: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.attempts.max(1);
        let mut delay = self.base_delay_ms;
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    warn!("{what}: attempt {attempt}/{attempts} failed: {e}");
                    sleep(Duration::from_millis(delay)).await;
                    delay = delay.saturating_mul(2).min(self.max_delay_ms);
                    attempt += 1;
                }
                Err(e) => {
                    error!("{what}: all {attempts} attempts failed: {e}");
                    return Err(e);
                }
            }
        }
    }
}
