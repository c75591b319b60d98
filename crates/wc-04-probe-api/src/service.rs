//! Probe API service - main entry point.
//!
//! Owns the validated configuration, the provider wiring and the metrics;
//! hands out the router and runs it until a shutdown future resolves.

use crate::adapters::IpApiProvider;
use crate::domain::config::ServerConfig;
use crate::domain::error::ProbeApiError;
use crate::middleware::ProbeMetrics;
use crate::ports::GeoProvider;
use crate::router::{build_router, AppState};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Probe API service state
pub struct ProbeApiService {
    config: ServerConfig,
    geo: Option<Arc<dyn GeoProvider>>,
    metrics: Arc<ProbeMetrics>,
}

impl ProbeApiService {
    /// Create the service, validating `config` and building the address
    /// lookup provider when it is enabled.
    pub fn new(config: ServerConfig) -> Result<Self, ProbeApiError> {
        config.validate()?;

        let geo: Option<Arc<dyn GeoProvider>> = if config.geo.enabled {
            let provider = IpApiProvider::new(&config.geo.provider_url, config.timeouts.upstream)
                .map_err(|e| ProbeApiError::Upstream(e.to_string()))?;
            Some(Arc::new(provider))
        } else {
            None
        };

        Ok(Self {
            config,
            geo,
            metrics: Arc::new(ProbeMetrics::new()),
        })
    }

    /// Replace the address lookup provider.
    #[must_use]
    pub fn with_geo_provider(mut self, provider: Arc<dyn GeoProvider>) -> Self {
        self.geo = Some(provider);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<ProbeMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Router with all routes and middleware, sharing this service's state.
    pub fn router(&self) -> Router {
        let state = AppState::new(
            self.config.limits.clone(),
            self.geo.clone(),
            Arc::clone(&self.metrics),
        );
        build_router(&self.config, state)
    }

    /// Bind the configured HTTP address.
    pub async fn bind(&self) -> Result<TcpListener, ProbeApiError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| ProbeApiError::Bind { addr, source })
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ProbeApiError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr().map_err(ProbeApiError::Serve)?;
        info!(
            addr = %addr,
            geo_enabled = self.geo.is_some(),
            "Starting probe API"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ProbeApiError::Serve)?;

        info!("Probe API stopped");
        Ok(())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ProbeApiError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
