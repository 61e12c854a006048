use std::future::Future;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::token::Token;

/// Single-slot cache in front of a token endpoint.
///
/// The slot stays locked while a refresh is in flight, so concurrent callers
/// wait for one exchange instead of issuing their own.
#[derive(Debug, Default)]
pub struct TokenCache {
    inner: Mutex<Option<Token>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self { inner: Mutex::new(None) }
    }

    /// Return the cached value, or run `refresh` when it is absent or about to expire.
    pub async fn get_or_refresh<F, Fut, E>(&self, safety_margin_seconds: i64, refresh: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Token, E>>,
    {
        let mut slot = self.inner.lock().await;
        if let Some(token) = slot.as_ref().filter(|token| !token.should_update(safety_margin_seconds)) {
            debug!(exp_unix_ts = token.exp_unix_ts, "reusing cached access token");
            return Ok(token.value.clone());
        }

        let token = refresh().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }
}
