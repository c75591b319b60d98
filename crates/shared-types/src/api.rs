//! # Probe API Payloads
//!
//! Request and response bodies of the probe API endpoints.
//!
//! | Endpoint | Request | Response |
//! |---|---|---|
//! | `GET /api/check-headers` | - | [`HeaderEchoResponse`] |
//! | `GET /api/latency` | `?i=` | [`LatencyResponse`] |
//! | `POST /api/connection-speed/upload` | bytes | [`UploadResponse`] |
//! | `GET /api/geo-ip` | `?ip=` | [`GeoLookupResponse`] |
//! | `POST /api/score` | [`ScoreRequest`] | [`ScoreResult`](crate::ScoreResult) |
//! | `POST /api/stun-log` | any JSON | [`DiscoveryLogResponse`] |

use crate::entities::{GeoInfo, HeaderSet};
use crate::lenient;
use serde::{Deserialize, Serialize};

/// Route paths, shared by the router and the clients.
pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const CHECK_HEADERS: &str = "/api/check-headers";
    pub const LATENCY: &str = "/api/latency";
    pub const DOWNLOAD: &str = "/api/connection-speed/download";
    pub const UPLOAD: &str = "/api/connection-speed/upload";
    pub const GEO_IP: &str = "/api/geo-ip";
    pub const SCORE: &str = "/api/score";
    pub const STUN_LOG: &str = "/api/stun-log";
}

// =============================================================================
// PROBES
// =============================================================================

/// Header echo: the request headers as the server saw them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEchoResponse {
    pub ok: bool,
    pub headers: HeaderSet,
}

/// Latency probe: server wall clock in unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyResponse {
    pub server_time: i64,
}

/// Upload probe: how many body bytes arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub received_bytes: u64,
}

/// Address lookup success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLookupResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub geo: GeoInfo,
}

/// Discovery log acknowledgement, echoing whatever was posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryLogResponse {
    pub ok: bool,
    pub received: serde_json::Value,
}

/// Liveness body of `/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub requests_total: u64,
    pub errors_total: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    /// Mean handler time over every recorded request
    pub avg_latency_ms: f64,
}

// =============================================================================
// SCORING
// =============================================================================

/// Signals submitted for scoring.
///
/// Every field tolerates missing or oddly typed values; see [`lenient`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreRequest {
    #[serde(deserialize_with = "lenient::truthy")]
    pub https_secure: bool,
    #[serde(
        deserialize_with = "lenient::non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip: Option<String>,
    #[serde(
        deserialize_with = "lenient::samples",
        skip_serializing_if = "Option::is_none"
    )]
    pub latency_samples: Option<Vec<f64>>,
    #[serde(deserialize_with = "lenient::header_map")]
    pub proxy_headers: HeaderSet,
    #[serde(deserialize_with = "lenient::header_map")]
    pub raw_headers: HeaderSet,
}
