use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::descriptor::AccountDescriptor;
use crate::config::error::{AccountError, ConfigError};
use crate::config::settings::ServiceConfig;

/// Basic-auth credentials for the Orthanc REST API.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth").field("username", &self.username).finish_non_exhaustive()
    }
}

/// Global settings shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct GlobalSettings {
    pub base_url: String,
    pub dicom_web_root: String,
    pub orthanc_url: String,
    pub orthanc_auth: Option<BasicAuth>,
    pub timeout: Duration,
    pub refresh_interval: Duration,
    pub ca_certificates: Option<PathBuf>,
    pub verify_peers: bool,
}

impl GlobalSettings {
    pub fn from_config(cfg: &ServiceConfig) -> Self {
        let gcp = &cfg.google_cloud_platform;
        Self {
            base_url: gcp.base_url().to_owned(),
            dicom_web_root: cfg.dicom_web.root().to_owned(),
            orthanc_url: cfg.orthanc.url().to_owned(),
            orthanc_auth: match (&cfg.orthanc.username, &cfg.orthanc.password) {
                (Some(username), Some(password)) => Some(BasicAuth {
                    username: username.to_owned(),
                    password: password.to_owned(),
                }),
                _ => None,
            },
            timeout: gcp.timeout(),
            refresh_interval: gcp.refresh_interval(),
            ca_certificates: cfg
                .https_ca_certificates
                .as_ref()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            verify_peers: cfg.https_verify_peers,
        }
    }
}

/// The parsed accounts plus global settings. Built once at process entry and
/// never mutated afterwards, so it is shared as `Arc<ConfigRegistry>` without locking.
#[derive(Debug)]
pub struct ConfigRegistry {
    settings: GlobalSettings,
    accounts: Vec<Arc<AccountDescriptor>>,
}

impl ConfigRegistry {
    pub fn new(settings: GlobalSettings, accounts: Vec<AccountDescriptor>) -> Self {
        Self {
            settings,
            accounts: accounts.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build every configured account. The first account that cannot be built
    /// aborts construction with an error naming it.
    pub fn from_config(cfg: &ServiceConfig) -> Result<Self, ConfigError> {
        let configured = &cfg.google_cloud_platform.accounts;
        if configured.is_empty() {
            warn!("No Google Cloud Platform account is configured");
        }

        let mut accounts = Vec::with_capacity(configured.len());
        for (name, account_config) in configured {
            info!(account = %name, "Adding Google Cloud Platform account");
            accounts.push(AccountDescriptor::from_config(name, account_config)?);
        }

        Ok(Self::new(GlobalSettings::from_config(cfg), accounts))
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    pub fn accounts_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn account(&self, index: usize) -> Result<&Arc<AccountDescriptor>, AccountError> {
        self.accounts.get(index).ok_or(AccountError::IndexOutOfRange {
            index,
            count: self.accounts.len(),
        })
    }
}
