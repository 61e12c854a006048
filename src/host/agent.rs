use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::error::ConfigError;
use crate::config::registry::ConfigRegistry;
use crate::host::dicomweb::check_dicomweb_plugin;
use crate::host::AgentError;
use crate::resilience::retry::RetrySettings;
use crate::scheduler::{Scheduler, SchedulerState};
use crate::sinks::orthanc::RegistrationPublisher;
use crate::sinks::Publish;
use crate::sources::BuildCredentialSource;
use crate::utils::http_client;

/// Owns the scheduler and exposes the start/stop hooks of the process.
pub struct Agent<B, P> {
    client: Client,
    registry: Arc<ConfigRegistry>,
    retry: RetrySettings,
    scheduler: Scheduler<B, P>,
}

impl Agent<Client, RegistrationPublisher> {
    /// Production wiring: one HTTP client shared by the probe, the token
    /// endpoints and the registration API.
    pub fn from_registry(registry: Arc<ConfigRegistry>, retry: RetrySettings) -> Result<Self, ConfigError> {
        let client = http_client::build(registry.settings())?;
        let publisher = RegistrationPublisher::new(client.clone(), registry.settings());
        Ok(Self::new(client.clone(), registry, retry, client, publisher))
    }
}

impl<B, P> Agent<B, P>
where
    B: BuildCredentialSource,
    P: Publish + 'static,
{
    pub fn new(client: Client, registry: Arc<ConfigRegistry>, retry: RetrySettings, sources: B, publisher: P) -> Self {
        let scheduler = Scheduler::new(Arc::clone(&registry), sources, publisher);
        Self { client, registry, retry, scheduler }
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.scheduler.subscribe()
    }

    /// Check the DICOMweb plugin, then start refreshing. A failed check leaves
    /// the scheduler in `Setup`.
    pub async fn on_start(&mut self) -> Result<(), AgentError> {
        let settings = self.registry.settings();
        let client = &self.client;

        let probe = self
            .retry
            .run_with_retry("DICOMweb plugin probe", || check_dicomweb_plugin(client, settings))
            .await;
        if let Err(e) = probe {
            error!("{}; Google Cloud Platform accounts will not be refreshed", e);
            return Err(e.into());
        }

        self.scheduler.start()?;
        info!(accounts = self.registry.accounts_count(), "agent started");
        Ok(())
    }

    pub async fn on_stop(&mut self) {
        self.scheduler.stop().await;
    }

    /// `on_start`, wait for `shutdown` when started, then `on_stop` in every case.
    /// A failing `shutdown` future is logged and treated as a stop request.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), AgentError>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        let started = self.on_start().await;
        if started.is_ok() {
            info!("agent running");
            if let Err(e) = shutdown.await {
                error!("shutdown wait failed, stopping: {:#}", e);
            }
            info!("agent stopping");
        }

        self.on_stop().await;
        started
    }
}
