//! Route handlers.
//!
//! Probe handlers answer from the request alone. Only the address lookup
//! leaves the process.

use crate::domain::error::{ApiError, ApiResult};
use crate::ports::GeoProviderError;
use crate::router::AppState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use shared_types::{
    DiscoveryLogResponse, GeoLookupResponse, HeaderEchoResponse, HeaderSet, HealthResponse,
    LatencyResponse, ScoreRequest, ScoreResult, UploadResponse,
};
use tracing::{debug, info, warn};

// =============================================================================
// PROBES
// =============================================================================

/// `GET /api/check-headers`: request headers as received, names lowercased.
///
/// Repeated headers are joined with `", "`.
pub async fn check_headers(headers: HeaderMap) -> Json<HeaderEchoResponse> {
    Json(HeaderEchoResponse {
        ok: true,
        headers: echo_headers(&headers),
    })
}

pub fn echo_headers(headers: &HeaderMap) -> HeaderSet {
    let mut echoed = HeaderSet::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        echoed
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    echoed
}

#[derive(Debug, Deserialize)]
pub struct LatencyQuery {
    pub i: Option<String>,
}

/// `GET /api/latency`: server clock, nothing else.
pub async fn latency(Query(query): Query<LatencyQuery>) -> Json<LatencyResponse> {
    debug!(index = query.i.as_deref(), "Latency probe");
    Json(LatencyResponse {
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub size: Option<String>,
}

/// Requested payload size, falling back to the default when the parameter
/// is absent, not a positive integer, or above the maximum.
pub fn resolve_download_size(size: Option<&str>, default: usize, max: usize) -> usize {
    size.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| (1..=max).contains(n))
        .unwrap_or(default)
}

/// `GET /api/connection-speed/download?size=N`: N zero bytes.
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let size = resolve_download_size(
        query.size.as_deref(),
        state.limits.default_download_bytes,
        state.limits.max_download_bytes,
    );
    let body = if size == state.default_payload.len() {
        state.default_payload.clone()
    } else {
        Bytes::from(vec![0u8; size])
    };
    state.metrics.record_sent(size as u64);

    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_LENGTH, HeaderValue::from(size)),
        ],
        body,
    )
        .into_response()
}

/// `POST /api/connection-speed/upload`: count the body.
pub async fn upload(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let body = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Upload rejected");
        ApiError::new(rejection.status(), "Failed to process upload.")
    })?;
    let received = body.len() as u64;
    state.metrics.record_received(received);
    Ok(Json(UploadResponse {
        received_bytes: received,
    }))
}

// =============================================================================
// LOOKUP
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct GeoQuery {
    pub ip: Option<String>,
}

/// `GET /api/geo-ip?ip=A`: location of `A` via the configured provider.
pub async fn geo_ip(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> ApiResult<Json<GeoLookupResponse>> {
    let ip = query
        .ip
        .filter(|ip| !ip.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'ip' is required."))?;

    let provider = state
        .geo
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("Address lookup is disabled."))?;

    match provider.lookup(ip.trim()).await {
        Ok(geo) => Ok(Json(GeoLookupResponse { ok: true, geo })),
        Err(GeoProviderError::Rejected(reason)) => {
            warn!(ip = %ip, reason = %reason, "Geo provider rejected lookup");
            Err(ApiError::bad_gateway(
                "Could not retrieve information for this address.",
            ))
        }
        Err(e) => {
            warn!(ip = %ip, error = %e, "Geo provider failed");
            Err(ApiError::internal("Address lookup service failed."))
        }
    }
}

// =============================================================================
// SCORING AND REPORTING
// =============================================================================

/// `POST /api/score`. A body that is not a JSON object scores as `{}`.
pub async fn score(body: Bytes) -> Json<ScoreResult> {
    let request = decode_score_request(&body);
    let result = wc_03_score::compute_score(&request);
    info!(
        score = result.score,
        level = %result.level,
        issues = result.issues.len(),
        "Score computed"
    );
    Json(result)
}

pub fn decode_score_request(body: &[u8]) -> ScoreRequest {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
            debug!(error = %e, "Score payload undecodable, scoring as empty");
            ScoreRequest::default()
        }),
        Ok(_) | Err(_) => {
            debug!("Score payload is not a JSON object, scoring as empty");
            ScoreRequest::default()
        }
    }
}

/// `POST /api/stun-log`: acknowledge a discovery outcome.
///
/// The body is echoed back, `{}` when it is not JSON. Nothing is persisted.
pub async fn stun_log(body: Bytes) -> Json<DiscoveryLogResponse> {
    let received = serde_json::from_slice::<Value>(&body)
        .unwrap_or_else(|_| Value::Object(Default::default()));
    info!(
        ok = received.get("ok").and_then(serde_json::Value::as_bool),
        ip = received.get("ip").and_then(serde_json::Value::as_str),
        reason = received.get("reason").and_then(serde_json::Value::as_str),
        "Discovery outcome reported"
    );
    Json(DiscoveryLogResponse { ok: true, received })
}

/// Fallback for unknown routes, so even a 404 carries a JSON body.
pub async fn not_found() -> ApiError {
    ApiError::new(axum::http::StatusCode::NOT_FOUND, "Not found.")
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snap = state.metrics.snapshot();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: snap.uptime_secs,
        requests_total: snap.requests_total,
        errors_total: snap.errors_total,
        bytes_sent: snap.bytes_sent,
        bytes_received: snap.bytes_received,
        avg_latency_ms: snap.average_latency_ms,
    })
}
