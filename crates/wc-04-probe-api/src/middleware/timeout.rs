//! Timeout middleware.
//!
//! Applies per-route timeouts so a stuck handler answers 504 instead of
//! hanging the client.

use crate::domain::config::TimeoutConfig;
use crate::domain::error::ApiError;
use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use shared_types::paths;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::timeout;
use tower::{Layer, Service};
use tracing::warn;

/// Timeout layer
#[derive(Clone)]
pub struct TimeoutLayer {
    config: Arc<TimeoutConfig>,
}

impl TimeoutLayer {
    pub fn new(config: TimeoutConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Timeout service
#[derive(Clone)]
pub struct TimeoutService<S> {
    inner: S,
    config: Arc<TimeoutConfig>,
}

impl<S> Service<Request<Body>> for TimeoutService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let limit = timeout_for_path(req.uri().path(), &self.config);
        // Take the instance that was driven ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match timeout(limit, inner.call(req)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "Request timed out");
                    Ok(ApiError::timeout(limit).into_response())
                }
            }
        })
    }
}

/// Transfer probes get the transfer timeout, the address lookup the
/// upstream timeout, everything else the default.
pub fn timeout_for_path(path: &str, config: &TimeoutConfig) -> Duration {
    match path {
        paths::DOWNLOAD | paths::UPLOAD => config.transfer,
        paths::GEO_IP => config.upstream,
        _ => config.default,
    }
}
