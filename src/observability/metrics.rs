use prometheus::{
    Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_ERROR: &str = "error";

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Process-wide metrics, registered on first use.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            // names and labels are literals
            Arc::new(Metrics::try_new().expect("static metric definitions are valid"))
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Credential sources
    pub token_fetch: IntCounterVec,
    pub credential_init_failures: IntCounterVec,

    // Registration
    pub publish: IntCounterVec,
    pub publish_duration: HistogramVec,
    pub last_publish_unix: IntGaugeVec,

    // Scheduler
    pub workers_running: IntGauge,
    pub worker_failures: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,

    // Service resources
    pub process_cpu_usage: Gauge,
    pub process_memory_usage: IntGauge,
    pub process_virtual_memory: IntGauge,
    pub process_open_fds: IntGauge,
    pub process_threads: IntGauge,
    pub process_start_time: IntGauge,
    pub process_uptime: IntGauge,
}

impl Metrics {
    fn try_new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("gcptokenagent".into()), None)?;

        let metrics = Self {
            token_fetch: IntCounterVec::new(
                Opts::new("token_fetch_total", "Access token requests by account and outcome"),
                &["account", "outcome"],
            )?,
            credential_init_failures: IntCounterVec::new(
                Opts::new("credential_init_failures_total", "Accounts whose credential source could not be built"),
                &["account"],
            )?,

            publish: IntCounterVec::new(
                Opts::new("publish_total", "DICOMweb server registrations by account and outcome"),
                &["account", "outcome"],
            )?,
            publish_duration: HistogramVec::new(
                HistogramOpts::new("publish_duration_seconds", "Registration request duration seconds")
                    .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
                &["account"],
            )?,
            last_publish_unix: IntGaugeVec::new(
                Opts::new("last_publish_unix_seconds", "Time of the last successful registration"),
                &["account"],
            )?,

            workers_running: IntGauge::new("workers_running", "Refresh workers currently running")?,
            worker_failures: IntCounterVec::new(
                Opts::new("worker_failures_total", "Refresh workers that stopped on an error"),
                &["account"],
            )?,

            config_validation_errors: IntCounter::new(
                "config_validation_errors_total",
                "Validation errors during startup",
            )?,
            up: IntGauge::new("up", "1 if service is healthy")?,

            process_cpu_usage: Gauge::new("process_cpu_usage_percent", "CPU usage % of this process")?,
            process_memory_usage: IntGauge::new("process_memory_usage_bytes", "Resident memory used by this process")?,
            process_virtual_memory: IntGauge::new("process_virtual_memory_bytes", "Virtual memory used by this process")?,
            process_open_fds: IntGauge::new("process_open_fds", "Number of open file descriptors")?,
            process_threads: IntGauge::new("process_threads", "Thread count of this process")?,
            process_start_time: IntGauge::new("process_start_time_seconds", "Process start time (UNIX seconds)")?,
            process_uptime: IntGauge::new("process_uptime_seconds", "Process uptime seconds")?,

            registry,
        };

        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_fetch.clone()))?;
        reg.register(Box::new(metrics.credential_init_failures.clone()))?;
        reg.register(Box::new(metrics.publish.clone()))?;
        reg.register(Box::new(metrics.publish_duration.clone()))?;
        reg.register(Box::new(metrics.last_publish_unix.clone()))?;
        reg.register(Box::new(metrics.workers_running.clone()))?;
        reg.register(Box::new(metrics.worker_failures.clone()))?;
        reg.register(Box::new(metrics.config_validation_errors.clone()))?;
        reg.register(Box::new(metrics.up.clone()))?;

        reg.register(Box::new(metrics.process_cpu_usage.clone()))?;
        reg.register(Box::new(metrics.process_memory_usage.clone()))?;
        reg.register(Box::new(metrics.process_virtual_memory.clone()))?;
        reg.register(Box::new(metrics.process_open_fds.clone()))?;
        reg.register(Box::new(metrics.process_threads.clone()))?;
        reg.register(Box::new(metrics.process_start_time.clone()))?;
        reg.register(Box::new(metrics.process_uptime.clone()))?;

        Ok(metrics)
    }
}
