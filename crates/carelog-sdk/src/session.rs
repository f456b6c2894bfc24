//! Token exchange with the record store.

use crate::error::{status_error, transport_error};
use carelog_domain::traits::{AuthToken, Credentials, StoreError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token request body
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    /// Account name
    pub username: &'a str,
    /// Account password
    pub password: &'a str,
}

/// Token response from the store
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer credential
    pub access: String,
    /// Refresh credential, unused: a run never re-authenticates
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Exchange credentials for a bearer token
pub async fn obtain_token(
    http_client: &reqwest::Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<AuthToken, StoreError> {
    let url = format!("{}/api/token/", base_url);

    let request = TokenRequest {
        username: &credentials.username,
        password: &credentials.password,
    };

    let response = http_client
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(transport_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        // A 400 here means bad credentials as well
        return Err(match status_error(status, error_text) {
            StoreError::Rejected { message, .. } => StoreError::Unauthorized(message),
            other => other,
        });
    }

    let token: TokenResponse = response.json().await.map_err(transport_error)?;
    if token.access.is_empty() {
        return Err(StoreError::InvalidResponse("empty access token".to_string()));
    }

    debug!("Obtained bearer token for {}", credentials.username);
    Ok(AuthToken::new(token.access))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{"access": "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9...", "refresh": "r"}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(response.access.starts_with("eyJ"));

        let response: TokenResponse = serde_json::from_str(r#"{"access": "a"}"#).unwrap();
        assert!(response.refresh.is_none());
    }
}
