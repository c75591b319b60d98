//! Shared fixtures.

use async_trait::async_trait;
use axum::Router;
use shared_types::GeoInfo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use wc_02_signal_collectors::{ProbeClient, ProbeClientConfig};
use wc_04_probe_api::{GeoProvider, GeoProviderError, ProbeApiService, ProbeMetrics, ServerConfig};

/// Address the fixed provider knows about.
pub const KNOWN_ADDRESS: &str = "203.0.113.7";

/// Server reflexive candidate for [`KNOWN_ADDRESS`].
pub const KNOWN_SRFLX: &str = "candidate:842163049 1 udp 1677729535 203.0.113.7 51734 typ srflx raddr 192.168.1.20 rport 51734 generation 0";

/// Locates [`KNOWN_ADDRESS`], refuses everything else the way the public
/// provider refuses reserved ranges.
pub struct FixedGeoProvider;

#[async_trait]
impl GeoProvider for FixedGeoProvider {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo, GeoProviderError> {
        if ip == KNOWN_ADDRESS {
            Ok(GeoInfo {
                country: Some("Portugal".into()),
                region: Some("Lisbon".into()),
                city: Some("Lisbon".into()),
                isp: Some("Example ISP".into()),
                country_code: Some("PT".into()),
            })
        } else {
            Err(GeoProviderError::Rejected("Reserved IP Address".into()))
        }
    }
}

/// A probe API serving on an ephemeral loopback port.
pub struct TestApi {
    pub addr: SocketAddr,
    pub metrics: Arc<ProbeMetrics>,
}

impl TestApi {
    /// Default configuration with [`FixedGeoProvider`].
    pub async fn spawn() -> Self {
        Self::spawn_with(ServerConfig::default(), |router| router).await
    }

    /// Serve `config`, letting the caller wrap the finished router.
    pub async fn spawn_with(config: ServerConfig, wrap: impl FnOnce(Router) -> Router) -> Self {
        let service = ProbeApiService::new(config)
            .expect("valid config")
            .with_geo_provider(Arc::new(FixedGeoProvider));
        let metrics = service.metrics();
        let router = wrap(service.router());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        Self { addr, metrics }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> ProbeClient {
        ProbeClient::new(&self.base_url(), ProbeClientConfig::default()).expect("client")
    }
}
