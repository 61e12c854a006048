use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gcp_token_agent::config::registry::ConfigRegistry;
use gcp_token_agent::host::Agent;
use gcp_token_agent::observability::service_resources_metrics::collect_process_metrics;
use gcp_token_agent::resilience::retry::RetrySettings;
use gcp_token_agent::server;
use gcp_token_agent::utils::config_loader;
use gcp_token_agent::utils::logging::{self, LogLevel};
use tracing::error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "gcp-token-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Load config, then logging
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Accounts and agent
    // -------------------------------

    let registry = Arc::new(ConfigRegistry::from_config(&service_config)?);
    let retry = RetrySettings::from_config(service_config.agent.retry.as_ref());
    let mut agent = Agent::from_registry(registry, retry)?;

    // -------------------------------
    // 3. Metrics / health server and process metrics
    // -------------------------------

    let metrics_enabled = service_config.agent.metrics.is_enabled;
    let mut http_server = tokio::spawn({
        let agent_config = service_config.agent.clone();
        let scheduler_state = agent.subscribe();
        async move { server::server::start(&agent_config, scheduler_state).await }
    });
    let service_metrics = tokio::spawn(collect_process_metrics(metrics_enabled));

    // -------------------------------
    // 4. Run until SIGINT / SIGTERM
    // -------------------------------

    let started = agent
        .run_until(async {
            tokio::select! {
                signal = shutdown_signal() => signal,
                served = &mut http_server, if metrics_enabled => {
                    match served {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => error!("{:#}", e),
                        Err(e) => error!("metrics server task failed: {}", e),
                    }
                    Ok(())
                }
            }
        })
        .await;

    http_server.abort();
    service_metrics.abort();

    started?;
    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            received = tokio::signal::ctrl_c() => received?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
