use serde::Deserialize;
use std::fmt;

use crate::utils::constants::DEFAULT_TOKEN_URI;

/// Static credential material of one account. Exactly one variant exists per account.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ServiceAccount(ServiceAccountInfo),
    AuthorizedUser(AuthorizedUserInfo),
}

impl Credentials {
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::ServiceAccount(_) => SERVICE_ACCOUNT,
            Credentials::AuthorizedUser(_) => AUTHORIZED_USER,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ServiceAccount(info) => f.debug_tuple("ServiceAccount").field(info).finish(),
            Credentials::AuthorizedUser(info) => f.debug_tuple("AuthorizedUser").field(info).finish(),
        }
    }
}

pub const SERVICE_ACCOUNT: &str = "service account";
pub const AUTHORIZED_USER: &str = "authorized user";

/// Fields of a Google service-account key file.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceAccountInfo {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Fields of an authorized-user (refresh token) credentials file.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct AuthorizedUserInfo {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl AuthorizedUserInfo {
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self { client_id, client_secret, refresh_token, token_uri: default_token_uri() }
    }
}

// secrets stay out of logs
impl fmt::Debug for ServiceAccountInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountInfo")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for AuthorizedUserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUserInfo")
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

pub fn parse_service_account(json: &str) -> Result<ServiceAccountInfo, String> {
    let info: ServiceAccountInfo = serde_json::from_str(json).map_err(|e| e.to_string())?;
    require_non_empty(&[
        ("client_email", &info.client_email),
        ("private_key", &info.private_key),
        ("token_uri", &info.token_uri),
    ])?;
    Ok(info)
}

pub fn parse_authorized_user(json: &str) -> Result<AuthorizedUserInfo, String> {
    let info: AuthorizedUserInfo = serde_json::from_str(json).map_err(|e| e.to_string())?;
    require_non_empty(&[
        ("client_id", &info.client_id),
        ("client_secret", &info.client_secret),
        ("refresh_token", &info.refresh_token),
        ("token_uri", &info.token_uri),
    ])?;
    Ok(info)
}

fn require_non_empty(fields: &[(&str, &String)]) -> Result<(), String> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(format!("field '{}' is empty", name)),
        None => Ok(()),
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
