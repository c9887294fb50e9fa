//! Session bootstrap: `OAuth2` client-credentials token acquisition.

use crate::error::{DirectoryError, DirectoryResult};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

/// Path of the tenant's token endpoint, relative to the tenant base URL.
pub const TOKEN_ENDPOINT_PATH: &str = "/v1.0/endpoint/default/token";

/// API client credentials for the tenant.
///
/// The [`Debug`] impl redacts the secret.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token used for every directory call in a run.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header only.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchange client credentials for a bearer token.
///
/// The token is fetched once per run; there is no caching or refresh.
pub async fn acquire_token(
    http_client: &reqwest::Client,
    tenant: &str,
    credentials: &ClientCredentials,
) -> DirectoryResult<BearerToken> {
    let url = format!("{}{}", tenant.trim_end_matches('/'), TOKEN_ENDPOINT_PATH);
    debug!("Requesting access token from {}", url);

    let form = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("grant_type", "client_credentials"),
    ];

    let response = http_client
        .post(&url)
        .header("Accept", "application/json")
        .form(&form)
        .send()
        .await
        .map_err(|e| DirectoryError::AuthError(format!("Token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return Err(DirectoryError::AuthError(format!(
            "Token endpoint returned {status}: {body}"
        )));
    }

    let token_response: TokenResponse = response.json().await.map_err(|e| {
        DirectoryError::AuthError(format!("Failed to parse token response: {e}"))
    })?;

    let access_token = token_response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            DirectoryError::AuthError("Token response has no access_token".to_string())
        })?;

    info!(
        client_id = %credentials.client_id,
        expires_in = ?token_response.expires_in,
        "Acquired access token"
    );

    Ok(BearerToken::new(access_token))
}
