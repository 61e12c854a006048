use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::proc_validator;
use crate::config::settings::ServiceConfig;
use crate::observability::metrics::get_metrics;
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use tracing::{debug, error};

/// Load and validate config from YAML (or JSON) file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config file {}", path.display()))?;

    let content = if content.trim_start().starts_with('{') {
        strip_json_comments(&content)?
    } else {
        content
    };
    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_validation_errors.inc();
        })?;

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config).map_err(|errors| {
        metrics.config_validation_errors.inc_by(errors.len() as u64);
        ConfigError::Invalid(errors)
    })?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.into_owned())
}

/// Drop `//` and `/* */` comments from a JSON document, leaving string literals alone.
pub fn strip_json_comments(input: &str) -> Result<String> {
    let re = Regex::new(r#""(?:\\.|[^"\\])*"|/\*[\s\S]*?\*/|//[^\n]*"#)?;
    let stripped = re.replace_all(input, |caps: &Captures| {
        let matched = &caps[0];
        if matched.starts_with('"') {
            matched.to_owned()
        } else {
            String::new()
        }
    });
    Ok(stripped.into_owned())
}
