//! Token endpoint exchange shared by both credential flows.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::cache::token::Token;
use crate::helpers::time::now_i64;
use crate::sources::CredentialError;

const MAX_ERROR_BODY_CHARS: usize = 256;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
}

/// POST `form` to `token_uri` and turn the answer into an
/// `Authorization: <type> <access token>` header line.
pub async fn exchange_token(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<Token, CredentialError> {
    let requested_at = now_i64();
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|source| CredentialError::Transport { uri: token_uri.to_owned(), source })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| CredentialError::Transport { uri: token_uri.to_owned(), source })?;

    if !status.is_success() {
        return Err(CredentialError::Rejected {
            uri: token_uri.to_owned(),
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| CredentialError::MalformedResponse {
        uri: token_uri.to_owned(),
        reason: e.to_string(),
    })?;
    if parsed.access_token.trim().is_empty() {
        return Err(CredentialError::MalformedResponse {
            uri: token_uri.to_owned(),
            reason: "empty access_token".to_owned(),
        });
    }
    if parsed.expires_in <= 0 {
        return Err(CredentialError::MalformedResponse {
            uri: token_uri.to_owned(),
            reason: format!("non-positive expires_in {}", parsed.expires_in),
        });
    }

    let token_type = parsed
        .token_type
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Bearer".to_owned());

    debug!(token_uri, expires_in = parsed.expires_in, "access token issued");
    Ok(Token::new(
        format!("Authorization: {} {}", token_type, parsed.access_token),
        requested_at.saturating_add(parsed.expires_in),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::build_reqwest_client;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn renders_authorization_header() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({
                    "access_token": "ya29.abc",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                }));
            })
            .await;

        let token = exchange_token(&build_reqwest_client(), &server.url("/token"), &[("grant_type", "refresh_token")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(token.value, "Authorization: Bearer ya29.abc");
        assert!(token.exp_unix_ts >= now_i64() + 3500);
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(400).json_body(json!({"error": "invalid_grant"}));
            })
            .await;

        let err = exchange_token(&build_reqwest_client(), &server.url("/token"), &[])
            .await
            .unwrap_err();
        match err {
            CredentialError::Rejected { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_fields_are_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({"token_type": "Bearer"}));
            })
            .await;

        let err = exchange_token(&build_reqwest_client(), &server.url("/token"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn non_positive_expiry_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({"access_token": "ya29.abc", "expires_in": 0}));
            })
            .await;

        let err = exchange_token(&build_reqwest_client(), &server.url("/token"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn huge_expiry_saturates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({"access_token": "ya29.abc", "expires_in": i64::MAX}));
            })
            .await;

        let token = exchange_token(&build_reqwest_client(), &server.url("/token"), &[])
            .await
            .unwrap();
        assert_eq!(token.exp_unix_ts, i64::MAX);
        assert!(!token.should_update(300));
    }
}
