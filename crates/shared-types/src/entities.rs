//! # Core Domain Entities
//!
//! The signals a diagnostic run produces and the score derived from them.
//!
//! ## Clusters
//!
//! - **Signals**: `HeaderSet`, `GeoInfo`, `DiscoveryOutcome`
//! - **Scoring**: `SeverityLevel`, `ScoreDetails`, `ScoreResult`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: SIGNALS
// =============================================================================

/// Lowercase header name to value, captured once per run.
///
/// Ordered so that serialized output and rendered lists are stable.
pub type HeaderSet = BTreeMap<String, String>;

/// Geolocation data for a public address.
///
/// Every field is optional: providers omit what they do not know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
    /// ISO 3166-1 alpha-2 code as reported by the provider.
    pub country_code: Option<String>,
}

impl GeoInfo {
    /// Country, region and city joined by `", "`, skipping empty parts.
    pub fn location_text(&self) -> String {
        [&self.country, &self.region, &self.city]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Result of one reflexive-address discovery, as reported to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DiscoveryOutcome {
    pub fn found(ip: impl Into<String>) -> Self {
        Self {
            ok: true,
            ip: Some(ip.into()),
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            ip: None,
            reason: Some(reason.into()),
        }
    }
}

// =============================================================================
// CLUSTER B: SCORING
// =============================================================================

/// Ordered severity bands a score maps to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Excellent,
    Ok,
    Attention,
    Critical,
    #[default]
    Unknown,
}

impl SeverityLevel {
    /// Band for an already clamped score.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Excellent,
            60..=79 => Self::Ok,
            40..=59 => Self::Attention,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Ok => "ok",
            Self::Attention => "attention",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The inputs a score was computed from, echoed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetails {
    /// Mean of the latency samples, `None` when no samples were supplied.
    pub avg_latency: Option<f64>,
    pub latency_samples: Vec<f64>,
    pub proxy_headers: HeaderSet,
}

/// Score, band and the issues that lowered the score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub level: SeverityLevel,
    pub issues: Vec<String>,
    #[serde(default)]
    pub details: ScoreDetails,
}
