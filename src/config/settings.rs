use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::accounts::AccountConfig;
use crate::utils::constants::{
    DEFAULT_BASE_URL, DEFAULT_DICOMWEB_ROOT, DEFAULT_ORTHANC_URL, DEFAULT_REFRESH_INTERVAL_SECS,
    DEFAULT_TIMEOUT_SECS,
};

/// ================================
/// Full service configuration
/// ================================
///
/// Keys follow the Orthanc configuration file, so an existing Orthanc
/// JSON configuration parses as-is (YAML is a superset of JSON).
/// Unknown keys are ignored.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceConfig {
    #[serde(rename = "HttpsCACertificates", default)]
    pub https_ca_certificates: Option<String>,
    #[serde(default = "default_true")]
    pub https_verify_peers: bool,
    #[serde(default)]
    pub dicom_web: DicomWebConfig,
    #[serde(default)]
    pub orthanc: OrthancConfig,
    #[serde(default)]
    pub google_cloud_platform: GoogleCloudPlatformConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct DicomWebConfig {
    pub root: Option<String>,
}

impl DicomWebConfig {
    pub fn root(&self) -> &str {
        self.root.as_deref().unwrap_or(DEFAULT_DICOMWEB_ROOT)
    }
}

/// Where the Orthanc REST API hosting the DICOMweb plugin is reachable.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct OrthancConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl OrthancConfig {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_ORTHANC_URL)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct GoogleCloudPlatformConfig {
    pub base_url: Option<String>,
    /// HTTP timeout in seconds
    pub timeout: Option<u64>,
    /// seconds between two token refresh attempts of one account
    #[serde(alias = "RefreshInternal")]
    pub refresh_interval: Option<u64>,
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountConfig>,
}

impl GoogleCloudPlatformConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// `0` means "use the default", never continuous refresh.
    pub fn refresh_interval(&self) -> Duration {
        match self.refresh_interval {
            None | Some(0) => Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            Some(seconds) => Duration::from_secs(seconds),
        }
    }
}

/// ================================
/// Agent (process-level) settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct AgentConfig {
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct RetryConfig {
    pub attempts: Option<u32>,
    /// will be mutiply by 2 on every attempt until max_delay_ms
    pub base_delay_ms: Option<u64>,
    /// invariant: >= base_delay_ms
    pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { path: default_metrics_path(), is_enabled: false }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9100
}
