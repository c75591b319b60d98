//! Request tracing middleware.
//!
//! Wraps every request in an `api_request` span and feeds the outcome into
//! [`ProbeMetrics`].

use super::metrics::ProbeMetrics;
use axum::{body::Body, http::Request, response::Response};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{debug, field, info_span, warn, Instrument, Span};

/// Tracing layer that creates spans for each request
#[derive(Clone)]
pub struct TracingLayer {
    metrics: Arc<ProbeMetrics>,
}

impl TracingLayer {
    pub fn new(metrics: Arc<ProbeMetrics>) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService {
            inner,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Tracing service
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
    metrics: Arc<ProbeMetrics>,
}

impl<S> Service<Request<Body>> for TracingService<S>
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
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let metrics = Arc::clone(&self.metrics);

        let span = info_span!(
            "api_request",
            http.method = %req.method(),
            http.target = %req.uri().path(),
            http.status_code = field::Empty,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                let result = inner.call(req).await;
                let latency = start.elapsed();

                if let Ok(response) = &result {
                    let status = response.status();
                    Span::current().record("http.status_code", status.as_u16());
                    metrics.record_request(status.as_u16(), latency);
                    if status.is_server_error() {
                        warn!(status = status.as_u16(), latency_ms = latency.as_millis() as u64, "Request failed");
                    } else {
                        debug!(status = status.as_u16(), latency_ms = latency.as_millis() as u64, "Request completed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
