use reqwest::Client;

use crate::cache::token_cache::TokenCache;
use crate::config::credentials::AuthorizedUserInfo;
use crate::sources::fetch::exchange_token;
use crate::sources::{AuthorizationHeader, CredentialError};
use crate::utils::constants::{REFRESH_TOKEN_GRANT_TYPE, TOKEN_EXPIRY_SLACK_SECS};

/// Refresh-token grant for user credentials (`gcloud auth application-default login`).
#[derive(Debug)]
pub struct AuthorizedUserSource {
    client: Client,
    info: AuthorizedUserInfo,
    cache: TokenCache,
}

impl AuthorizedUserSource {
    pub fn new(info: &AuthorizedUserInfo, client: Client) -> Self {
        Self { client, info: info.clone(), cache: TokenCache::new() }
    }
}

impl AuthorizationHeader for AuthorizedUserSource {
    async fn authorization_header(&self) -> Result<String, CredentialError> {
        self.cache
            .get_or_refresh(TOKEN_EXPIRY_SLACK_SECS, || async {
                exchange_token(
                    &self.client,
                    &self.info.token_uri,
                    &[
                        ("grant_type", REFRESH_TOKEN_GRANT_TYPE),
                        ("client_id", self.info.client_id.as_str()),
                        ("client_secret", self.info.client_secret.as_str()),
                        ("refresh_token", self.info.refresh_token.as_str()),
                    ],
                )
                .await
            })
            .await
    }
}
