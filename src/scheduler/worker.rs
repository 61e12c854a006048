use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::descriptor::AccountDescriptor;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_OK};
use crate::scheduler::{SchedulerState, WORKER_TICK};
use crate::sinks::{Publish, PublishError};
use crate::sources::AuthorizationHeader;

/// Keeps the registration of one account in step with its current token.
///
/// `last_published` only moves after a successful publish, so a token whose
/// registration failed is offered again on the next eligible tick.
pub struct RefreshWorker<S, P> {
    account: Arc<AccountDescriptor>,
    source: S,
    publisher: Arc<P>,
    refresh_interval: Duration,
    last_published: Option<String>,
    last_attempt: Option<Instant>,
}

impl<S, P> RefreshWorker<S, P>
where
    S: AuthorizationHeader,
    P: Publish,
{
    pub fn new(account: Arc<AccountDescriptor>, source: S, publisher: Arc<P>, refresh_interval: Duration) -> Self {
        Self {
            account,
            source,
            publisher,
            refresh_interval,
            last_published: None,
            last_attempt: None,
        }
    }

    pub fn last_published(&self) -> Option<&str> {
        self.last_published.as_deref()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_attempt
            .map_or(true, |at| now.saturating_duration_since(at) >= self.refresh_interval)
    }

    /// One refresh attempt: fetch, compare, publish when changed.
    pub async fn refresh_once(&mut self) -> Result<(), PublishError> {
        let account = Arc::clone(&self.account);
        let name = account.name();
        let metrics = get_metrics().await;

        let token = match self.source.authorization_header().await {
            Ok(token) => {
                metrics.token_fetch.with_label_values(&[name, OUTCOME_OK]).inc();
                token
            }
            Err(e) => {
                metrics.token_fetch.with_label_values(&[name, OUTCOME_ERROR]).inc();
                warn!(account = name, "cannot fetch access token: {}", e);
                self.last_attempt = Some(Instant::now());
                return Ok(());
            }
        };

        if self.last_published.as_deref() == Some(token.as_str()) {
            debug!(account = name, "access token unchanged");
            self.last_attempt = Some(Instant::now());
            return Ok(());
        }

        let published = self.publisher.publish(&account, &token).await;
        self.last_attempt = Some(Instant::now());

        if published? {
            info!(account = name, "access token published");
            self.last_published = Some(token);
        }
        Ok(())
    }

    /// Refresh on every eligible tick until the state leaves `Running`.
    pub async fn run(mut self, mut state: watch::Receiver<SchedulerState>) -> Result<(), PublishError> {
        let metrics = get_metrics().await;
        metrics.workers_running.inc();
        info!(
            account = self.account.name(),
            refresh_interval_secs = self.refresh_interval.as_secs(),
            "refresh worker started"
        );

        let result = loop {
            if *state.borrow_and_update() != SchedulerState::Running {
                break Ok(());
            }

            if self.is_due(Instant::now()) {
                if let Err(e) = self.refresh_once().await {
                    break Err(e);
                }
            }

            tokio::select! {
                _ = sleep(WORKER_TICK) => {}
                changed = state.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                }
            }
        };

        metrics.workers_running.dec();
        debug!(account = self.account.name(), "refresh worker stopped");
        result
    }
}
