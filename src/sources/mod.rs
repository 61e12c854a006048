//! Credential sources: turn an account's static credentials into a bearer
//! token header on demand.

use std::future::Future;

use reqwest::Client;
use thiserror::Error;

use crate::config::descriptor::AccountDescriptor;
use crate::config::error::AccountError;

pub mod authorized_user;
pub mod fetch;
pub mod service_account;

use authorized_user::AuthorizedUserSource;
use service_account::ServiceAccountSource;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Permanent: the static material cannot be used at all.
    #[error("invalid private key for service account {client_email}: {source}")]
    InvalidPrivateKey {
        client_email: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("cannot sign token assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token request to {uri} failed: {source}")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("token endpoint {uri} answered {status}: {body}")]
    Rejected { uri: String, status: u16, body: String },

    #[error("malformed token response from {uri}: {reason}")]
    MalformedResponse { uri: String, reason: String },

    #[error(transparent)]
    Account(#[from] AccountError),
}

pub trait AuthorizationHeader: Send + Sync {
    /// A header line of the form `"<name>: <value>"`. May hit the network.
    fn authorization_header(&self) -> impl Future<Output = Result<String, CredentialError>> + Send;
}

#[derive(Debug)]
pub enum CredentialSource {
    ServiceAccount(ServiceAccountSource),
    AuthorizedUser(AuthorizedUserSource),
}

impl CredentialSource {
    /// Pick the flow matching the account's credentials. Fails only on
    /// material that can never work (a bad private key).
    pub fn from_account(account: &AccountDescriptor, client: Client) -> Result<Self, CredentialError> {
        if let Ok(info) = account.service_account() {
            return ServiceAccountSource::new(info, client).map(CredentialSource::ServiceAccount);
        }
        let info = account.authorized_user()?;
        Ok(CredentialSource::AuthorizedUser(AuthorizedUserSource::new(info, client)))
    }
}

/// Builds the credential source of one account when its worker starts.
pub trait BuildCredentialSource: Send + Sync + 'static {
    type Source: AuthorizationHeader + 'static;

    fn build(&self, account: &AccountDescriptor) -> Result<Self::Source, CredentialError>;
}

impl BuildCredentialSource for Client {
    type Source = CredentialSource;

    fn build(&self, account: &AccountDescriptor) -> Result<CredentialSource, CredentialError> {
        CredentialSource::from_account(account, self.clone())
    }
}

impl AuthorizationHeader for CredentialSource {
    async fn authorization_header(&self) -> Result<String, CredentialError> {
        match self {
            CredentialSource::ServiceAccount(s) => s.authorization_header().await,
            CredentialSource::AuthorizedUser(s) => s.authorization_header().await,
        }
    }
}
