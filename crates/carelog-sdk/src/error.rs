//! Error types for the Carelog SDK.

use carelog_domain::traits::StoreError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while building a client
#[derive(Debug, Error)]
pub enum SdkError {
    /// Base URL is not usable
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// HTTP client could not be constructed
    #[error("Client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::Client(e.to_string())
    }
}

/// Map a transport-level failure onto the store error taxonomy
pub(crate) fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else if e.is_connect() || e.is_request() {
        StoreError::Transient(format!("Connection error: {}", e))
    } else if e.is_decode() {
        StoreError::InvalidResponse(e.to_string())
    } else {
        StoreError::Transient(e.to_string())
    }
}

/// Map a non-success HTTP status and its body onto the store error taxonomy
///
/// 5xx is transient; 4xx is permanent and never retried.
pub(crate) fn status_error(status: StatusCode, body: String) -> StoreError {
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        StatusCode::CONFLICT => StoreError::Conflict(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StoreError::Timeout,
        s if s.is_server_error() => StoreError::Transient(format!("Server error (HTTP {}): {}", s, message)),
        s => StoreError::Rejected {
            status: s.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            StoreError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::CONFLICT, "exists".to_string()),
            StoreError::Conflict(m) if m == "exists"
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "{\"appetite_score\":[\"bad\"]}".to_string()),
            StoreError::Rejected { status: 400, .. }
        ));
        assert!(status_error(StatusCode::BAD_GATEWAY, String::new()).is_transient());
        assert!(!status_error(StatusCode::UNPROCESSABLE_ENTITY, String::new()).is_transient());
    }

    #[test]
    fn test_empty_body_uses_reason() {
        match status_error(StatusCode::BAD_REQUEST, "  ".to_string()) {
            StoreError::Rejected { message, .. } => assert_eq!(message, "Bad Request"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
