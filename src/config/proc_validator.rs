//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Every account-level message names the offending account

use regex::Regex;
use tracing::{error, info};
use url::Url;

use crate::config::accounts::AccountConfig;
use crate::config::settings::{AgentConfig, RetryConfig, ServiceConfig};
use crate::observability::routes::HEALTH_PATH;

const ALLOWED_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(cfg, &mut errors);
    validate_agent(&cfg.agent, &mut errors);

    for (name, account) in &cfg.google_cloud_platform.accounts {
        validate_account(name, account, &mut errors);
    }

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(cfg: &ServiceConfig, errors: &mut Vec<String>) {
    validate_http_url("GoogleCloudPlatform.BaseUrl", cfg.google_cloud_platform.base_url(), errors);
    validate_http_url("Orthanc.Url", cfg.orthanc.url(), errors);

    if cfg.google_cloud_platform.timeout == Some(0) {
        errors.push("GoogleCloudPlatform.Timeout must be > 0 seconds".to_string());
    }

    if cfg.dicom_web.root().trim_matches('/').is_empty() {
        errors.push("DicomWeb.Root must not be empty".to_string());
    }

    match (&cfg.orthanc.username, &cfg.orthanc.password) {
        (Some(_), None) => errors.push("Orthanc.Password is required when Orthanc.Username is set".to_string()),
        (None, Some(_)) => errors.push("Orthanc.Username is required when Orthanc.Password is set".to_string()),
        _ => {}
    }
}

fn validate_agent(agent: &AgentConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &agent.logging {
        if !ALLOWED_LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "Agent.Logging.Level '{}' is not one of {:?}",
                logging.level, ALLOWED_LOG_LEVELS
            ));
        }
    }

    if agent.metrics.is_enabled {
        if !agent.metrics.path.starts_with('/') {
            errors.push(format!("Agent.Metrics.Path '{}' must start with '/'", agent.metrics.path));
        }
        if agent.metrics.path == HEALTH_PATH {
            errors.push(format!("Agent.Metrics.Path must not be {}", HEALTH_PATH));
        }
        if agent.server.port == 0 {
            errors.push("Agent.Server.Port must be > 0 when metrics are enabled".to_string());
        }
    }

    if let Some(retry) = &agent.retry {
        validate_retry("Agent.Retry", retry, errors);
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == Some(0) {
        errors.push(format!("{}.Attempts must be >= 1", path));
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if base > max {
            errors.push(format!(
                "{}.BaseDelayMs ({}) must be <= MaxDelayMs ({})",
                path, base, max
            ));
        }
    }
}

fn validate_http_url(path: &str, value: &str, errors: &mut Vec<String>) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!("{} '{}' has unsupported scheme '{}'", path, value, url.scheme())),
        Err(e) => errors.push(format!("{} '{}' is not a valid URL: {}", path, value, e)),
    }
}

fn validate_account(name: &str, account: &AccountConfig, errors: &mut Vec<String>) {
    // the name becomes a path segment of the registration URL
    let name_ok = Regex::new(r"^[A-Za-z0-9._-]+$")
        .map(|re| re.is_match(name))
        .unwrap_or(false);
    if !name_ok {
        errors.push(format!(
            "account name \"{}\" may only contain letters, digits, '.', '_' and '-'",
            name
        ));
    }

    for (option, value) in [
        ("Project", &account.project),
        ("Location", &account.location),
        ("Dataset", &account.dataset),
        ("DicomStore", &account.dicom_store),
    ] {
        if value.as_ref().map_or(true, |v| v.trim().is_empty()) {
            errors.push(format!("Missing \"{}\" option for account \"{}\"", option, name));
        }
    }

    let forms = account.credential_forms();
    match forms.len() {
        0 => errors.push(format!(
            "Missing \"ServiceAccountFile\" or \"AuthorizedUserXXX\" option for account \"{}\"",
            name
        )),
        1 => {}
        _ => errors.push(format!(
            "account \"{}\" configures multiple credential forms ({}); exactly one is allowed",
            name,
            forms.join(", ")
        )),
    }

    if account.has_inline_authorized_user() {
        for (option, value) in [
            ("AuthorizedUserClientId", &account.authorized_user_client_id),
            ("AuthorizedUserClientSecret", &account.authorized_user_client_secret),
            ("AuthorizedUserRefreshToken", &account.authorized_user_refresh_token),
        ] {
            if value.as_ref().map_or(true, |v| v.trim().is_empty()) {
                errors.push(format!(
                    "account \"{}\": inline authorized user credentials require \"{}\"",
                    name, option
                ));
            }
        }
    }
}
