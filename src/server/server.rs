use anyhow::{Context, Result};
use axum::Router;
use tokio::sync::watch;
use tracing::info;

use crate::config::settings::AgentConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::scheduler::SchedulerState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub scheduler_state: watch::Receiver<SchedulerState>,
}

impl AppState {
    pub fn new(metrics: &Metrics, scheduler_state: watch::Receiver<SchedulerState>) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            scheduler_state,
        }
    }
}

pub fn router(state: AppState, agent_config: &AgentConfig) -> Router {
    state
        .metrics_state
        .router(&agent_config.metrics)
        .with_state(state)
}

/// Serve the metrics and health routes until the task is dropped.
/// Returns at once when metrics are disabled.
pub async fn start(agent_config: &AgentConfig, scheduler_state: watch::Receiver<SchedulerState>) -> Result<()> {
    if !agent_config.metrics.is_enabled {
        return Ok(());
    }

    let metrics = get_metrics().await;
    let app = router(AppState::new(metrics, scheduler_state), agent_config);

    let address = format!("{}:{}", agent_config.server.host, agent_config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("cannot bind metrics server to {}", address))?;
    info!(address = %address, path = %agent_config.metrics.path, "serving metrics");

    metrics.up.set(1);
    let served = axum::serve(listener, app).await.context("metrics server failed");
    metrics.up.set(0);
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::{build_reqwest_client, spawn_axum};

    #[tokio::test]
    async fn health_follows_scheduler_state() {
        let (tx, rx) = watch::channel(SchedulerState::Setup);
        let app = router(AppState::new(get_metrics().await, rx), &AgentConfig::default());
        let (_handle, addr) = spawn_axum(app).await;
        let client = build_reqwest_client();
        let url = format!("http://{}/health", addr);

        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status(), 503);
        assert_eq!(response.text().await.unwrap(), "setup");

        tx.send_replace(SchedulerState::Running);
        assert_eq!(client.get(&url).send().await.unwrap().status(), 200);

        tx.send_replace(SchedulerState::Done);
        assert_eq!(client.get(&url).send().await.unwrap().status(), 503);
    }

    #[tokio::test]
    async fn metrics_are_exposed_on_configured_path() {
        let (_tx, rx) = watch::channel(SchedulerState::Running);
        let metrics = get_metrics().await;
        metrics.publish.with_label_values(&["server-test", "ok"]).inc();

        let app = router(AppState::new(metrics, rx), &AgentConfig::default());
        let (_handle, addr) = spawn_axum(app).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/metrics", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.text().await.unwrap().contains("gcptokenagent_publish_total{account=\"server-test\",outcome=\"ok\"}"));
    }

    #[tokio::test]
    async fn disabled_server_returns_immediately() {
        let (_tx, rx) = watch::channel(SchedulerState::Setup);
        assert!(start(&AgentConfig::default(), rx).await.is_ok());
    }
}
