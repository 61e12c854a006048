use std::path::Path;
use std::time::Duration;

use crate::config::proc_loader::{file_to_config, parse_config};
use crate::config::registry::ConfigRegistry;
use crate::resilience::retry::RetrySettings;

#[tokio::test]
async fn shipped_sample_config_is_valid() {
    let path = Path::new("config/gcp-token-agent.yaml");
    let cfg = file_to_config(path)
        .await
        .expect("config/gcp-token-agent.yaml must exist in repo root for tests");

    assert_eq!(cfg.google_cloud_platform.accounts.len(), 2);
    assert!(cfg.agent.metrics.is_enabled);
    assert_eq!(
        RetrySettings::from_config(cfg.agent.retry.as_ref()),
        RetrySettings { attempts: 10, base_delay_ms: 500, max_delay_ms: 10_000 }
    );
}

#[tokio::test]
#[should_panic(expected = "config is not valid")]
async fn invalid_config_reports_all_errors() {
    let invalid_yaml = r#"
Orthanc:
  Url: localhost
GoogleCloudPlatform:
  Timeout: 0
  Accounts:
    siteA:
      Project: p
      ServiceAccountFile: /etc/sa.json
      AuthorizedUserFile: /etc/user.json
    "":
      Project: p
      Location: l
      Dataset: d
      DicomStore: s
"#;
    parse_config(invalid_yaml.to_owned()).await.unwrap();
}

#[tokio::test]
async fn zero_refresh_interval_means_default_cadence() {
    let cfg = parse_config(
        r#"
GoogleCloudPlatform:
  RefreshInterval: 0
  Accounts:
    siteA:
      Project: p
      Location: l
      Dataset: d
      DicomStore: s
      AuthorizedUserClientId: id
      AuthorizedUserClientSecret: secret
      AuthorizedUserRefreshToken: refresh
"#
        .to_owned(),
    )
    .await
    .unwrap();

    let registry = ConfigRegistry::from_config(&cfg).unwrap();
    assert_eq!(registry.settings().refresh_interval, Duration::from_secs(60));
}
