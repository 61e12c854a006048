use reqwest::{Certificate, Client};
use tracing::warn;

use crate::config::error::ConfigError;
use crate::config::registry::GlobalSettings;

/// One client for the token endpoints and the Orthanc REST API, carrying the
/// configured timeout and TLS trust settings.
pub fn build(settings: &GlobalSettings) -> Result<Client, ConfigError> {
    let mut builder = Client::builder().timeout(settings.timeout);

    if let Some(path) = &settings.ca_certificates {
        let pem = std::fs::read(path).map_err(|e| ConfigError::CaCertificates {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| ConfigError::CaCertificates {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        for certificate in certificates {
            builder = builder.add_root_certificate(certificate);
        }
    }

    if !settings.verify_peers {
        warn!("HttpsVerifyPeers is disabled: TLS certificates will not be verified");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(ConfigError::HttpClient)
}
