//! Scoring policy: penalty sizes and latency thresholds.
//!
//! # Example
//!
//! ```
//! use wc_03_score::ScoringPolicy;
//!
//! let policy = ScoringPolicy::default().with_latency_thresholds(250.0, 600.0);
//! assert!(policy.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected policy parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("latency thresholds must satisfy 0 <= moderate ({moderate}) < high ({high})")]
    InvalidThresholds { moderate: f64, high: f64 },

    #[error("penalty `{name}` is {value}, must be at most 100")]
    PenaltyOutOfRange { name: &'static str, value: u8 },
}

/// Penalties subtracted from a perfect score of 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub insecure_transport_penalty: u8,
    /// Average latency (ms) above which the high penalty applies.
    pub high_latency_ms: f64,
    pub high_latency_penalty: u8,
    /// Average latency (ms) above which the moderate penalty applies.
    pub moderate_latency_ms: f64,
    pub moderate_latency_penalty: u8,
    pub proxy_headers_penalty: u8,
    pub address_mismatch_penalty: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            insecure_transport_penalty: 40,
            high_latency_ms: 800.0,
            high_latency_penalty: 20,
            moderate_latency_ms: 300.0,
            moderate_latency_penalty: 10,
            proxy_headers_penalty: 15,
            address_mismatch_penalty: 10,
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(self.moderate_latency_ms >= 0.0 && self.moderate_latency_ms < self.high_latency_ms) {
            return Err(PolicyError::InvalidThresholds {
                moderate: self.moderate_latency_ms,
                high: self.high_latency_ms,
            });
        }

        for (name, value) in [
            ("insecure_transport", self.insecure_transport_penalty),
            ("high_latency", self.high_latency_penalty),
            ("moderate_latency", self.moderate_latency_penalty),
            ("proxy_headers", self.proxy_headers_penalty),
            ("address_mismatch", self.address_mismatch_penalty),
        ] {
            if value > 100 {
                return Err(PolicyError::PenaltyOutOfRange { name, value });
            }
        }

        Ok(())
    }

    /// Builder-style method to set both latency thresholds.
    pub fn with_latency_thresholds(mut self, moderate_ms: f64, high_ms: f64) -> Self {
        self.moderate_latency_ms = moderate_ms;
        self.high_latency_ms = high_ms;
        self
    }

    /// Builder-style method to set the proxy header penalty.
    pub fn with_proxy_headers_penalty(mut self, penalty: u8) -> Self {
        self.proxy_headers_penalty = penalty;
        self
    }
}
