// shared fixtures and fakes for unit and scenario tests
use std::collections::{HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::config::credentials::{AuthorizedUserInfo, Credentials, ServiceAccountInfo};
use crate::config::descriptor::AccountDescriptor;
use crate::config::registry::{ConfigRegistry, GlobalSettings};
use crate::sinks::registration::split_header;
use crate::sinks::{Publish, PublishError};
use crate::sources::{AuthorizationHeader, BuildCredentialSource, CredentialError};

pub const SERVICE_ACCOUNT_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");
pub const SERVICE_ACCOUNT_PUBLIC_KEY: &str = include_str!("../fixtures/service_account_key.pub.pem");

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn service_account_info(token_uri: &str) -> ServiceAccountInfo {
    ServiceAccountInfo {
        client_email: "agent@test-project.iam.gserviceaccount.com".into(),
        private_key: SERVICE_ACCOUNT_PRIVATE_KEY.into(),
        private_key_id: Some("test-key-id".into()),
        token_uri: token_uri.into(),
    }
}

pub fn authorized_user_account(name: &str) -> AccountDescriptor {
    AccountDescriptor::new(
        name,
        "proj",
        "loc",
        "ds",
        "store",
        Credentials::AuthorizedUser(AuthorizedUserInfo::new("id".into(), "secret".into(), "refresh".into())),
    )
}

pub fn global_settings(orthanc_url: &str) -> GlobalSettings {
    GlobalSettings {
        base_url: "https://healthcare.example/v1/".into(),
        dicom_web_root: "/dicom-web".into(),
        orthanc_url: orthanc_url.into(),
        orthanc_auth: None,
        timeout: Duration::from_secs(5),
        refresh_interval: Duration::from_secs(60),
        ca_certificates: None,
        verify_peers: true,
    }
}

pub fn registry_with_accounts(names: &[&str]) -> ConfigRegistry {
    ConfigRegistry::new(
        global_settings("http://127.0.0.1:1"),
        names.iter().map(|name| authorized_user_account(name)).collect(),
    )
}

/// Counts `authorization_header` calls of a [`ScriptedSource`].
#[derive(Debug, Clone, Default)]
pub struct FetchCounter(Arc<AtomicUsize>);

impl FetchCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Answers from a script; `None` is a fetch failure. The last entry repeats forever.
#[derive(Debug)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Option<String>>>,
    fetches: FetchCounter,
}

impl ScriptedSource {
    pub fn new<const N: usize>(script: [Option<&str>; N]) -> Self {
        Self {
            script: Mutex::new(script.iter().map(|entry| entry.map(str::to_owned)).collect()),
            fetches: FetchCounter::default(),
        }
    }

    pub fn constant(token: &str) -> Self {
        Self::new([Some(token)])
    }

    pub fn fetches(&self) -> FetchCounter {
        self.fetches.clone()
    }
}

impl AuthorizationHeader for ScriptedSource {
    async fn authorization_header(&self) -> Result<String, CredentialError> {
        self.fetches.0.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().flatten()
            } else {
                script.front().cloned().flatten()
            }
        };
        next.ok_or_else(|| CredentialError::MalformedResponse {
            uri: "scripted".into(),
            reason: "scripted failure".into(),
        })
    }
}

/// Builds a constant [`ScriptedSource`] for every account except the failing ones.
#[derive(Debug, Clone)]
pub struct ScriptedSources {
    token: String,
    failing: HashSet<String>,
}

impl ScriptedSources {
    pub fn constant(token: &str) -> Self {
        Self { token: token.into(), failing: HashSet::new() }
    }

    pub fn failing_for(mut self, account: &str) -> Self {
        self.failing.insert(account.into());
        self
    }
}

impl BuildCredentialSource for ScriptedSources {
    type Source = ScriptedSource;

    fn build(&self, account: &AccountDescriptor) -> Result<ScriptedSource, CredentialError> {
        if self.failing.contains(account.name()) {
            return Err(CredentialError::MalformedResponse {
                uri: "scripted".into(),
                reason: format!("no credentials for {}", account.name()),
            });
        }
        Ok(ScriptedSource::constant(&self.token))
    }
}

/// Records well-formed publish calls and answers from a script (default `true`).
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    calls: Arc<Mutex<Vec<(String, String)>>>,
    results: Arc<Mutex<VecDeque<bool>>>,
}

impl RecordingPublisher {
    pub fn with_results<const N: usize>(results: [bool; N]) -> Self {
        Self {
            calls: Arc::default(),
            results: Arc::new(Mutex::new(results.into_iter().collect())),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Publish for RecordingPublisher {
    async fn publish(&self, account: &AccountDescriptor, token: &str) -> Result<bool, PublishError> {
        split_header(account.name(), token)?;
        self.calls.lock().unwrap().push((account.name().to_owned(), token.to_owned()));
        Ok(self.results.lock().unwrap().pop_front().unwrap_or(true))
    }
}
