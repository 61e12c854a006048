use anyhow::{anyhow, Result};
use std::time::Duration;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::time::sleep;

use crate::helpers::time::now_i64;
use crate::observability::metrics::get_metrics;

const SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// Sample this process' resource usage into the `process_*` gauges until cancelled.
pub async fn collect_process_metrics(is_metrics_enabled: bool) -> Result<()> {
    if !is_metrics_enabled {
        return Ok(());
    }
    let metrics = get_metrics().await;
    let pid = sysinfo::get_current_pid().map_err(|e| anyhow!("cannot determine own pid: {}", e))?;
    let mut sys = System::new();

    let start_time_unix = now_i64();
    metrics.process_start_time.set(start_time_unix);

    loop {
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            false,
            ProcessRefreshKind::nothing().with_cpu().with_memory().with_tasks(),
        );

        if let Some(process) = sys.process(pid) {
            // percentage over the last sampling interval
            metrics.process_cpu_usage.set(process.cpu_usage().into());
            metrics.process_memory_usage.set(process.memory() as i64);
            metrics.process_virtual_memory.set(process.virtual_memory() as i64);
            if let Some(tasks) = process.tasks() {
                metrics.process_threads.set(tasks.len() as i64);
            }

            #[cfg(target_family = "unix")]
            {
                if let Ok(entries) = std::fs::read_dir(format!("/proc/{}/fd", pid.as_u32())) {
                    metrics.process_open_fds.set(entries.count() as i64);
                }
            }
        }
        metrics.process_uptime.set(now_i64() - start_time_unix);

        sleep(SAMPLE_INTERVAL).await;
    }
}
