use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::registry::GlobalSettings;
use crate::helpers::url::join_url;
use crate::utils::constants::DICOMWEB_PLUGIN_PATH;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot reach Orthanc at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("the DICOMweb plugin is not installed ({url} answered {status})")]
    NotInstalled { url: String, status: u16 },

    #[error("cannot determine the version of the DICOMweb plugin from {url}")]
    UnknownVersion { url: String },

    #[error("the DICOMweb plugin version (currently {0}) must be 1.0 or above")]
    Unsupported(String),
}

/// `major.minor` versions need `major >= 1`; anything that is not two
/// dot-separated parts (e.g. `mainline`) is a development build and accepted.
pub fn is_supported_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    let [major, minor] = parts.as_slice() else {
        return true;
    };
    match (major.parse::<i64>(), minor.parse::<i64>()) {
        (Ok(major), Ok(minor)) => major >= 2 || (major == 1 && minor >= 0),
        _ => false,
    }
}

/// Ask Orthanc which DICOMweb plugin it runs and check it can take server definitions.
pub async fn check_dicomweb_plugin(client: &Client, settings: &GlobalSettings) -> Result<String, ProbeError> {
    let url = join_url(&settings.orthanc_url, &[DICOMWEB_PLUGIN_PATH]);

    let mut request = client.get(&url);
    if let Some(auth) = &settings.orthanc_auth {
        request = request.basic_auth(&auth.username, Some(&auth.password));
    }
    let response = request
        .send()
        .await
        .map_err(|source| ProbeError::Transport { url: url.clone(), source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::NotInstalled { url, status: status.as_u16() });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|_| ProbeError::UnknownVersion { url: url.clone() })?;
    let version = body
        .get("Version")
        .and_then(Value::as_str)
        .ok_or(ProbeError::UnknownVersion { url })?
        .to_owned();

    if !is_supported_version(&version) {
        return Err(ProbeError::Unsupported(version));
    }
    info!(version = %version, "DICOMweb plugin found");
    Ok(version)
}
