//! Probe API error types.
//!
//! Handlers fail with [`ApiError`], which renders as a non-2xx status and a
//! `{"error": "..."}` body. Server lifecycle failures are [`ProbeApiError`].

use super::config::ConfigError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared_types::ErrorBody;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Error returned from a route handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// The upstream provider answered, but with an error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            format!("Request exceeded {limit:?} timeout"),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Server lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum ProbeApiError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot build upstream client: {0}")]
    Upstream(String),

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_into_response_body() {
        let response = ApiError::bad_request("Query parameter 'ip' is required.").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({"error": "Query parameter 'ip' is required."}));
    }

    #[test]
    fn test_timeout_message() {
        let err = ApiError::timeout(Duration::from_millis(1500));
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.message, "Request exceeded 1.5s timeout");
        assert_eq!(err.to_string(), "[504] Request exceeded 1.5s timeout");
    }
}
