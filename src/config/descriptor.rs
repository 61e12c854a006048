use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::config::accounts::AccountConfig;
use crate::config::credentials::{
    parse_authorized_user, parse_service_account, AuthorizedUserInfo, Credentials,
    ServiceAccountInfo, AUTHORIZED_USER, SERVICE_ACCOUNT,
};
use crate::config::error::{AccountError, ConfigError};
use crate::helpers::url::{add_trailing_slash, join_url};

/// One configured Google Cloud account: the DICOM store it targets and the
/// static credentials used to mint its tokens. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDescriptor {
    name: String,
    project: String,
    location: String,
    dataset: String,
    dicom_store: String,
    credentials: Credentials,
}

impl AccountDescriptor {
    pub fn new(
        name: impl Into<String>,
        project: impl Into<String>,
        location: impl Into<String>,
        dataset: impl Into<String>,
        dicom_store: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            name: name.into(),
            project: project.into(),
            location: location.into(),
            dataset: dataset.into(),
            dicom_store: dicom_store.into(),
            credentials,
        }
    }

    /// Build from the config entry. Credential forms are tried in order:
    /// service-account file, authorized-user file, inline authorized-user fields.
    pub fn from_config(name: &str, cfg: &AccountConfig) -> Result<Self, ConfigError> {
        let project = required(name, "Project", &cfg.project)?;
        let location = required(name, "Location", &cfg.location)?;
        let dataset = required(name, "Dataset", &cfg.dataset)?;
        let dicom_store = required(name, "DicomStore", &cfg.dicom_store)?;

        let credentials = match load_service_account(name, cfg)? {
            Some(credentials) => credentials,
            None => match load_authorized_user_file(name, cfg)? {
                Some(credentials) => credentials,
                None => load_authorized_user_strings(cfg)
                    .ok_or_else(|| ConfigError::MissingCredentials { account: name.to_owned() })?,
            },
        };
        debug!(account = name, kind = credentials.kind(), "credentials loaded");

        Ok(Self::new(name, project, location, dataset, dicom_store, credentials))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn dicom_store(&self) -> &str {
        &self.dicom_store
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn service_account(&self) -> Result<&ServiceAccountInfo, AccountError> {
        match &self.credentials {
            Credentials::ServiceAccount(info) => Ok(info),
            Credentials::AuthorizedUser(_) => Err(self.unpopulated(SERVICE_ACCOUNT)),
        }
    }

    pub fn authorized_user(&self) -> Result<&AuthorizedUserInfo, AccountError> {
        match &self.credentials {
            Credentials::AuthorizedUser(info) => Ok(info),
            Credentials::ServiceAccount(_) => Err(self.unpopulated(AUTHORIZED_USER)),
        }
    }

    /// DICOMweb endpoint of this account's DICOM store under `base_url`.
    pub fn dicom_web_url(&self, base_url: &str) -> String {
        add_trailing_slash(&join_url(
            base_url,
            &[
                "projects",
                &self.project,
                "locations",
                &self.location,
                "datasets",
                &self.dataset,
                "dicomStores",
                &self.dicom_store,
                "dicomWeb",
            ],
        ))
    }

    fn unpopulated(&self, expected: &'static str) -> AccountError {
        AccountError::UnpopulatedCredential { account: self.name.clone(), expected }
    }
}

fn required(account: &str, option: &'static str, value: &Option<String>) -> Result<String, ConfigError> {
    value
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().to_owned())
        .ok_or_else(|| ConfigError::MissingOption { account: account.to_owned(), option })
}

fn read_credentials_file(account: &str, path: &str) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::CredentialFile {
        account: account.to_owned(),
        path: PathBuf::from(path),
        source,
    })
}

fn load_service_account(account: &str, cfg: &AccountConfig) -> Result<Option<Credentials>, ConfigError> {
    let Some(path) = &cfg.service_account_file else {
        return Ok(None);
    };
    let json = read_credentials_file(account, path)?;
    let info = parse_service_account(&json).map_err(|reason| ConfigError::CredentialFormat {
        account: account.to_owned(),
        kind: SERVICE_ACCOUNT,
        reason: format!("{} (at: {})", reason, path),
    })?;
    Ok(Some(Credentials::ServiceAccount(info)))
}

fn load_authorized_user_file(account: &str, cfg: &AccountConfig) -> Result<Option<Credentials>, ConfigError> {
    let Some(path) = &cfg.authorized_user_file else {
        return Ok(None);
    };
    let json = read_credentials_file(account, path)?;
    let info = parse_authorized_user(&json).map_err(|reason| ConfigError::CredentialFormat {
        account: account.to_owned(),
        kind: AUTHORIZED_USER,
        reason: format!("{} (at: {})", reason, path),
    })?;
    Ok(Some(Credentials::AuthorizedUser(info)))
}

fn load_authorized_user_strings(cfg: &AccountConfig) -> Option<Credentials> {
    match (
        &cfg.authorized_user_client_id,
        &cfg.authorized_user_client_secret,
        &cfg.authorized_user_refresh_token,
    ) {
        (Some(client_id), Some(client_secret), Some(refresh_token)) => {
            Some(Credentials::AuthorizedUser(AuthorizedUserInfo::new(
                client_id.to_owned(),
                client_secret.to_owned(),
                refresh_token.to_owned(),
            )))
        }
        _ => None,
    }
}
