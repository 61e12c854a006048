use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::registry::ConfigRegistry;
use crate::observability::metrics::get_metrics;
use crate::scheduler::worker::RefreshWorker;
use crate::scheduler::{SchedulerError, SchedulerState};
use crate::sinks::{Publish, PublishError};
use crate::sources::BuildCredentialSource;

type WorkerExit = (String, Result<(), PublishError>);

/// Supervisor owning one [`RefreshWorker`] task per configured account.
///
/// Workers live in a [`JoinSet`], so none of them can outlive the scheduler.
pub struct Scheduler<B, P> {
    registry: Arc<ConfigRegistry>,
    sources: Arc<B>,
    publisher: Arc<P>,
    state: watch::Sender<SchedulerState>,
    workers: JoinSet<WorkerExit>,
}

impl<B, P> Scheduler<B, P>
where
    B: BuildCredentialSource,
    P: Publish + 'static,
{
    pub fn new(registry: Arc<ConfigRegistry>, sources: B, publisher: P) -> Self {
        let (state, _) = watch::channel(SchedulerState::Setup);
        Self {
            registry,
            sources: Arc::new(sources),
            publisher: Arc::new(publisher),
            state,
            workers: JoinSet::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Follow state transitions, e.g. for health reporting.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Workers spawned and not yet joined.
    pub fn workers_count(&self) -> usize {
        self.workers.len()
    }

    /// Spawn one worker per account and return without waiting for them.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        let current = self.state();
        if current != SchedulerState::Setup {
            return Err(SchedulerError::AlreadyStarted(current));
        }
        let accounts = (0..self.registry.accounts_count())
            .map(|index| self.registry.account(index).map(Arc::clone))
            .collect::<Result<Vec<_>, _>>()?;
        self.state.send_replace(SchedulerState::Running);

        let refresh_interval = self.registry.settings().refresh_interval;
        for account in accounts {
            let sources = Arc::clone(&self.sources);
            let publisher = Arc::clone(&self.publisher);
            let state = self.state.subscribe();

            self.workers.spawn(async move {
                let name = account.name().to_owned();
                let source = match sources.build(&account) {
                    Ok(source) => source,
                    Err(e) => {
                        error!(account = %name, "cannot initialize credentials, account will not be refreshed: {}", e);
                        get_metrics().await.credential_init_failures.with_label_values(&[name.as_str()]).inc();
                        return (name, Ok(()));
                    }
                };
                let result = RefreshWorker::new(account, source, publisher, refresh_interval).run(state).await;
                if let Err(e) = &result {
                    error!(account = %name, "refresh worker failed, account will not be refreshed: {}", e);
                    get_metrics().await.worker_failures.with_label_values(&[name.as_str()]).inc();
                }
                (name, result)
            });
        }

        info!(workers = self.workers.len(), "scheduler started");
        Ok(())
    }

    /// Signal every worker and wait for all of them. No-op unless running.
    pub async fn stop(&mut self) {
        if self.state() != SchedulerState::Running {
            return;
        }
        self.state.send_replace(SchedulerState::Done);

        while let Some(joined) = self.workers.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((account, Err(e))) => debug!(account = %account, "joined failed refresh worker: {}", e),
                Err(e) => error!("refresh worker panicked or was cancelled: {}", e),
            }
        }
        info!("scheduler stopped");
    }
}

impl<B, P> Drop for Scheduler<B, P> {
    fn drop(&mut self) {
        if *self.state.borrow() == SchedulerState::Running {
            error!("scheduler dropped while running; call stop() first");
            self.state.send_replace(SchedulerState::Done);
            // dropping the JoinSet aborts whatever is still in flight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::{registry_with_accounts, RecordingPublisher, ScriptedSources};
    use std::time::Duration;
    use tokio::time::sleep;

    fn scheduler(
        names: &[&str],
        sources: ScriptedSources,
        publisher: RecordingPublisher,
    ) -> Scheduler<ScriptedSources, RecordingPublisher> {
        Scheduler::new(Arc::new(registry_with_accounts(names)), sources, publisher)
    }

    #[tokio::test]
    async fn start_spawns_one_worker_per_account_and_stop_joins_them() {
        let mut scheduler = scheduler(
            &["a", "b", "c"],
            ScriptedSources::constant("Authorization: Bearer abc"),
            RecordingPublisher::default(),
        );
        assert_eq!(scheduler.state(), SchedulerState::Setup);

        scheduler.start().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.workers_count(), 3);

        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Done);
        assert_eq!(scheduler.workers_count(), 0);
    }

    #[tokio::test]
    async fn stop_before_start_is_a_no_op() {
        let mut scheduler = scheduler(&["a"], ScriptedSources::constant("Authorization: Bearer abc"), RecordingPublisher::default());

        scheduler.stop().await;
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Setup);

        scheduler.start().unwrap();
        scheduler.stop().await;
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Done);
    }

    #[tokio::test]
    async fn second_start_fails_without_spawning() {
        let mut scheduler = scheduler(&["a", "b"], ScriptedSources::constant("Authorization: Bearer abc"), RecordingPublisher::default());

        scheduler.start().unwrap();
        assert_eq!(scheduler.start(), Err(SchedulerError::AlreadyStarted(SchedulerState::Running)));
        assert_eq!(scheduler.workers_count(), 2);

        scheduler.stop().await;
        assert_eq!(scheduler.start(), Err(SchedulerError::AlreadyStarted(SchedulerState::Done)));
        assert_eq!(scheduler.workers_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn every_account_is_published_independently() {
        let publisher = RecordingPublisher::default();
        let mut scheduler = scheduler(&["siteA", "siteB"], ScriptedSources::constant("Authorization: Bearer abc"), publisher.clone());

        scheduler.start().unwrap();
        sleep(Duration::from_secs(1)).await;
        scheduler.stop().await;

        let mut accounts: Vec<String> = publisher.calls().into_iter().map(|(account, _)| account).collect();
        accounts.sort();
        assert_eq!(accounts, vec!["siteA", "siteB"]);
    }

    #[tokio::test(start_paused = true)]
    async fn broken_credentials_disable_only_that_account() {
        let publisher = RecordingPublisher::default();
        let sources = ScriptedSources::constant("Authorization: Bearer abc").failing_for("broken");
        let mut scheduler = scheduler(&["broken", "healthy"], sources, publisher.clone());

        scheduler.start().unwrap();
        sleep(Duration::from_secs(1)).await;
        scheduler.stop().await;

        let accounts: Vec<String> = publisher.calls().into_iter().map(|(account, _)| account).collect();
        assert_eq!(accounts, vec!["healthy"]);
        assert_eq!(scheduler.workers_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_failure_is_reported_before_stop() {
        let failures = get_metrics().await.worker_failures.with_label_values(&["malformed-site"]);
        let before = failures.get();

        let publisher = RecordingPublisher::default();
        let mut scheduler = scheduler(&["malformed-site"], ScriptedSources::constant("no separator"), publisher.clone());

        scheduler.start().unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(failures.get(), before + 1);
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.stop().await;
        assert!(publisher.calls().is_empty());
        assert_eq!(scheduler.state(), SchedulerState::Done);
        assert_eq!(failures.get(), before + 1);
    }

    #[tokio::test]
    async fn zero_accounts_run_zero_workers() {
        let mut scheduler = scheduler(&[], ScriptedSources::constant("Authorization: Bearer abc"), RecordingPublisher::default());
        scheduler.start().unwrap();
        assert_eq!(scheduler.workers_count(), 0);
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Done);
    }

    #[tokio::test]
    async fn dropping_a_running_scheduler_signals_done() {
        let mut scheduler = scheduler(&["a"], ScriptedSources::constant("Authorization: Bearer abc"), RecordingPublisher::default());
        let state = scheduler.subscribe();

        scheduler.start().unwrap();
        drop(scheduler);

        assert_eq!(*state.borrow(), SchedulerState::Done);
    }
}
