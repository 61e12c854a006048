use reqwest::Client;
use tracing::{debug, error};

use crate::config::descriptor::AccountDescriptor;
use crate::config::registry::{BasicAuth, GlobalSettings};
use crate::helpers::time::now_i64;
use crate::helpers::url::join_url;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_OK};
use crate::sinks::registration::{split_header, ServerDefinition};
use crate::sinks::{Publish, PublishError};

/// Upserts DICOMweb server definitions through the Orthanc REST API.
#[derive(Debug, Clone)]
pub struct RegistrationPublisher {
    client: Client,
    base_url: String,
    servers_url: String,
    auth: Option<BasicAuth>,
}

impl RegistrationPublisher {
    pub fn new(client: Client, settings: &GlobalSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.clone(),
            servers_url: join_url(&settings.orthanc_url, &[&settings.dicom_web_root, "servers"]),
            auth: settings.orthanc_auth.clone(),
        }
    }

    pub fn server_url(&self, account_name: &str) -> String {
        join_url(&self.servers_url, &[account_name])
    }
}

impl Publish for RegistrationPublisher {
    async fn publish(&self, account: &AccountDescriptor, token: &str) -> Result<bool, PublishError> {
        let name = account.name();
        let (header_name, header_value) = split_header(name, token)?;
        let definition = ServerDefinition::new(account.dicom_web_url(&self.base_url), header_name, header_value);
        let url = self.server_url(name);

        let metrics = get_metrics().await;
        let timer = metrics.publish_duration.with_label_values(&[name]).start_timer();

        let mut request = self.client.put(&url).json(&definition);
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }
        let result = request.send().await;
        timer.observe_duration();

        let published = match result {
            Ok(response) if response.status().is_success() => {
                debug!(account = name, url = %url, target = %definition.url, "server definition stored");
                metrics.last_publish_unix.with_label_values(&[name]).set(now_i64());
                true
            }
            Ok(response) => {
                error!(
                    account = name,
                    url = %url,
                    status = response.status().as_u16(),
                    "Orthanc rejected the DICOMweb server definition"
                );
                false
            }
            Err(e) => {
                error!(account = name, url = %url, "cannot reach Orthanc to register DICOMweb server: {}", e);
                false
            }
        };

        let outcome = if published { OUTCOME_OK } else { OUTCOME_ERROR };
        metrics.publish.with_label_values(&[name, outcome]).inc();
        Ok(published)
    }
}
