use anyhow::{anyhow, Result};
use std::path::Path;

use crate::config::proc_loader::file_to_config;
use crate::config::settings::ServiceConfig;

/// Load the config file named on the command line; errors carry the path.
pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    file_to_config(Path::new(config_path))
        .await
        .map_err(|e| anyhow!("Invalid config {}: {:#}", config_path, e))
}
