//! Route table and shared handler state.

use crate::domain::config::{LimitsConfig, ServerConfig};
use crate::handlers;
use crate::middleware::{create_cors_layer, ProbeMetrics, TimeoutLayer, TracingLayer};
use crate::ports::GeoProvider;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use shared_types::paths;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub limits: LimitsConfig,
    /// Pre-built payload of the default download size.
    pub default_payload: Bytes,
    /// `None` when address lookup is disabled.
    pub geo: Option<Arc<dyn GeoProvider>>,
    pub metrics: Arc<ProbeMetrics>,
}

impl AppState {
    pub fn new(
        limits: LimitsConfig,
        geo: Option<Arc<dyn GeoProvider>>,
        metrics: Arc<ProbeMetrics>,
    ) -> Self {
        let default_payload = Bytes::from(vec![0u8; limits.default_download_bytes]);
        Self {
            limits,
            default_payload,
            geo,
            metrics,
        }
    }
}

/// Build the full probe API router, middleware included.
pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(&config.cors))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TracingLayer::new(Arc::clone(&state.metrics)))
        .layer(TimeoutLayer::new(config.timeouts.clone()));

    Router::new()
        .route(paths::HEALTH, get(handlers::health))
        .route(paths::CHECK_HEADERS, get(handlers::check_headers))
        .route(paths::LATENCY, get(handlers::latency))
        .route(paths::DOWNLOAD, get(handlers::download))
        .route(
            paths::UPLOAD,
            post(handlers::upload).layer(DefaultBodyLimit::max(state.limits.max_upload_bytes)),
        )
        .route(paths::GEO_IP, get(handlers::geo_ip))
        .route(paths::SCORE, post(handlers::score))
        .route(paths::STUN_LOG, post(handlers::stun_log))
        .fallback(handlers::not_found)
        .layer(middleware)
        .with_state(state)
}
