//! # Error Types
//!
//! Error payloads shared by the backend and its clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every non-2xx response: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{error}")]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
