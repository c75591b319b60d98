//! Collector error types.

use thiserror::Error;

/// Why a collector produced no signal.
///
/// Every variant means "signal unavailable" to the caller; none of them
/// should abort a diagnostic run.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Endpoint answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl CollectorError {
    /// HTTP status of a non-2xx answer, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            CollectorError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
