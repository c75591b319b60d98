//! Sequential diagnostic run.
//!
//! ```text
//! transport ─► discovery ─► (stun-log, geo) ─► latency ─► headers ─► score ─► [throughput]
//! ```
//!
//! Collectors run one after another in a single task. Every step publishes a
//! new [`PanelSnapshot`] on the watch channel, and no failure ends the run
//! early: a collector that fails leaves an "unavailable" entry behind.

use crate::cli::Args;
use crate::domain::{PanelSnapshot, Signal, Stage};
use crate::error::PanelError;
use chrono::Utc;
use shared_types::{DiscoveryOutcome, GeoInfo};
use tokio::sync::watch;
use tracing::{debug, info, instrument};
use wc_01_address_discovery::AddressDiscovery;
use wc_02_signal_collectors::{
    check_transport, collect_headers, lookup_geo, LatencySampler, ProbeClient,
    ThroughputSampler, TransportSecurity,
};

/// Runs every collector against one probe API.
#[derive(Debug, Clone)]
pub struct DiagnosticRunner {
    client: ProbeClient,
    discovery: AddressDiscovery,
    throughput: Option<ThroughputSampler>,
}

impl DiagnosticRunner {
    pub fn new(client: ProbeClient, discovery: AddressDiscovery) -> Self {
        Self {
            client,
            discovery,
            throughput: None,
        }
    }

    /// Runner over the native STUN connector, configured from the command line.
    pub fn from_args(args: &Args) -> Result<Self, PanelError> {
        let client = ProbeClient::new(&args.endpoint, args.probe_client_config())
            .map_err(PanelError::Endpoint)?;
        let discovery = AddressDiscovery::stun(args.discovery_config()?);
        let runner = Self::new(client, discovery);
        Ok(if args.throughput {
            runner.with_throughput(args.download_bytes, args.upload_bytes)
        } else {
            runner
        })
    }

    /// Builder-style method to add throughput sampling to every run.
    #[must_use]
    pub fn with_throughput(mut self, download_bytes: u64, upload_bytes: u64) -> Self {
        self.throughput = Some(
            ThroughputSampler::new(self.client.clone()).with_sizes(download_bytes, upload_bytes),
        );
        self
    }

    pub fn measures_throughput(&self) -> bool {
        self.throughput.is_some()
    }

    pub fn endpoint(&self) -> &str {
        self.client.base_url().as_str()
    }

    /// Local verdict on the endpoint's transport, no request involved.
    pub fn check_transport(&self) -> TransportSecurity {
        check_transport(
            self.client.base_url(),
            !self.client.config().accept_invalid_certs,
        )
    }

    /// Snapshot shown before the first run: only the transport check.
    pub fn initial_snapshot(&self) -> PanelSnapshot {
        PanelSnapshot::new(self.endpoint()).with_transport(self.check_transport())
    }

    /// Run every collector once, publishing each intermediate snapshot.
    ///
    /// Returns the final snapshot, which is also the last one published.
    #[instrument(name = "diagnostic_run", skip_all, fields(endpoint = %self.client.base_url()))]
    pub async fn run(&self, updates: &watch::Sender<PanelSnapshot>) -> PanelSnapshot {
        let publish = |snapshot: PanelSnapshot| {
            updates.send_replace(snapshot.clone());
            snapshot
        };

        let start = updates.borrow().clone().begin_run();
        let snapshot = publish(start.with_transport(self.check_transport()));

        let snapshot = publish(snapshot.at_stage(Stage::Discovery));
        let public_ip = self.discover_address().await;

        let snapshot = publish(snapshot.with_public_ip(public_ip).at_stage(Stage::Geo));
        let geo = self.lookup_location(snapshot.public_ip.ready()).await;

        let snapshot = publish(snapshot.with_geo(geo).at_stage(Stage::Latency));
        let samples = LatencySampler::new(self.client.clone()).sample().await;

        let snapshot = publish(snapshot.with_latency(samples).at_stage(Stage::Headers));
        let headers = Signal::from_result(collect_headers(&self.client).await);

        let snapshot = publish(snapshot.with_headers(headers).at_stage(Stage::Score));
        let score = Signal::from_result(self.client.submit_score(&snapshot.score_request()).await);

        let mut snapshot = snapshot.with_score(score);
        if let Some(sampler) = &self.throughput {
            snapshot = publish(snapshot.at_stage(Stage::Throughput));
            snapshot = snapshot.with_throughput(sampler.run().await);
        }

        let snapshot = publish(snapshot.finished(Utc::now()));
        info!(
            public_ip = snapshot.public_ip.ready().map(String::as_str),
            score = snapshot.score.ready().map(|s| s.score),
            "Diagnostic run complete"
        );
        snapshot
    }

    /// Discover the public address and report the outcome to the backend.
    /// The report is best-effort.
    async fn discover_address(&self) -> Signal<String> {
        let (signal, outcome) = match self.discovery.discover().await {
            Ok(address) => {
                info!(%address, "Public address discovered");
                let address = address.into_inner();
                (
                    Signal::Ready(address.clone()),
                    DiscoveryOutcome::found(address),
                )
            }
            Err(e) => {
                info!(reason = %e, "Public address unavailable");
                (
                    Signal::Unavailable(e.to_string()),
                    DiscoveryOutcome::failed(e.to_string()),
                )
            }
        };

        if let Err(e) = self.client.report_discovery(&outcome).await {
            debug!(error = %e, "Discovery report not delivered");
        }
        signal
    }

    async fn lookup_location(&self, public_ip: Option<&String>) -> Signal<GeoInfo> {
        match public_ip {
            Some(ip) => Signal::from_result(lookup_geo(&self.client, ip).await),
            None => Signal::Unavailable("No public address to look up.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_types::SeverityLevel;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use wc_01_address_discovery::testing::ScriptedConnector;
    use wc_01_address_discovery::{DiscoveryConfig, DiscoveryError};
    use wc_02_signal_collectors::ProbeClientConfig;
    use wc_04_probe_api::{GeoProvider, GeoProviderError, ProbeApiService, ServerConfig};

    const SRFLX: &str = "candidate:842163049 1 udp 1677729535 203.0.113.7 51734 typ srflx raddr 192.168.1.20 rport 51734 generation 0";

    struct FixedGeo;

    #[async_trait]
    impl GeoProvider for FixedGeo {
        async fn lookup(&self, ip: &str) -> Result<GeoInfo, GeoProviderError> {
            if ip != "203.0.113.7" {
                return Err(GeoProviderError::Rejected("Reserved IP Address".into()));
            }
            Ok(GeoInfo {
                country: Some("Brazil".into()),
                city: Some("Recife".into()),
                isp: Some("Example Telecom".into()),
                country_code: Some("BR".into()),
                ..GeoInfo::default()
            })
        }
    }

    async fn spawn_api() -> (String, ProbeApiService) {
        let service = ProbeApiService::new(ServerConfig::default())
            .unwrap()
            .with_geo_provider(Arc::new(FixedGeo));
        let router = service.router();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}"), service)
    }

    fn runner(base: &str, connector: ScriptedConnector) -> DiagnosticRunner {
        let client = ProbeClient::new(base, ProbeClientConfig::default()).unwrap();
        let discovery = AddressDiscovery::new(
            Arc::new(connector),
            DiscoveryConfig::default().with_timeout(Duration::from_secs(2)),
        );
        DiagnosticRunner::new(client, discovery)
    }

    #[tokio::test]
    async fn test_full_run_against_local_api() {
        let (base, service) = spawn_api().await;
        let runner = runner(&base, ScriptedConnector::new().with_candidates([SRFLX]));
        let (tx, mut rx) = watch::channel(runner.initial_snapshot());

        let snapshot = runner.run(&tx).await;

        assert!(!snapshot.is_running());
        assert!(snapshot.last_run.is_some());
        assert_eq!(snapshot.transport.as_ref().map(|t| t.secure), Some(false));
        assert_eq!(snapshot.public_ip.ready().map(String::as_str), Some("203.0.113.7"));
        assert_eq!(
            snapshot.geo.ready().map(|g| g.location_text()).as_deref(),
            Some("Brazil, Recife")
        );
        assert_eq!(snapshot.latency_samples().len(), 5);
        assert!(snapshot.headers.ready().is_some_and(|h| !h.proxy.detected()));

        // Plain HTTP over loopback: only the transport penalty applies.
        let score = snapshot.score.ready().unwrap();
        assert_eq!(score.score, 60);
        assert_eq!(score.level, SeverityLevel::Ok);
        assert!(snapshot.throughput.is_none());

        // stun-log, geo-ip, 5 latency probes, check-headers, score
        assert_eq!(service.metrics().snapshot().requests_total, 9);

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), snapshot);
    }

    #[tokio::test]
    async fn test_discovery_failure_does_not_stop_the_run() {
        let (base, _service) = spawn_api().await;
        let runner = runner(&base, ScriptedConnector::unavailable());
        let (tx, _rx) = watch::channel(runner.initial_snapshot());

        let snapshot = runner.run(&tx).await;

        assert_eq!(
            snapshot.public_ip.unavailable_reason(),
            Some(DiscoveryError::Unsupported.to_string().as_str())
        );
        assert!(snapshot.geo.unavailable_reason().is_some());
        assert_eq!(snapshot.latency_samples().len(), 5);
        assert_eq!(snapshot.score.ready().map(|s| s.score), Some(60));
    }

    #[tokio::test]
    async fn test_unreachable_api_leaves_every_signal_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let runner = runner(
            &format!("http://{addr}"),
            ScriptedConnector::new().with_candidates([SRFLX]),
        )
        .with_throughput(1024, 1024);
        let (tx, _rx) = watch::channel(runner.initial_snapshot());

        let snapshot = runner.run(&tx).await;

        // Discovery does not go through the API.
        assert!(snapshot.public_ip.ready().is_some());
        assert!(snapshot.geo.unavailable_reason().is_some());
        assert!(snapshot.latency.unavailable_reason().is_some());
        assert!(snapshot.headers.unavailable_reason().is_some());
        assert!(snapshot.score.unavailable_reason().is_some());

        let throughput = snapshot.throughput.unwrap();
        assert!(throughput.download.is_none() && throughput.upload.is_none());
        assert!(snapshot.last_run.is_some());
    }

    #[tokio::test]
    async fn test_throughput_is_opt_in() {
        let (base, _service) = spawn_api().await;
        let runner =
            runner(&base, ScriptedConnector::unavailable()).with_throughput(64 * 1024, 32 * 1024);
        assert!(runner.measures_throughput());
        let (tx, _rx) = watch::channel(runner.initial_snapshot());

        let report = runner.run(&tx).await.throughput.unwrap();
        assert_eq!(report.download.map(|s| s.bytes), Some(64 * 1024));
        assert_eq!(report.upload.map(|s| s.bytes), Some(32 * 1024));
    }

    #[test]
    fn test_initial_snapshot_has_only_transport() {
        let runner = runner("https://probe.example.org", ScriptedConnector::new());
        let snapshot = runner.initial_snapshot();
        assert_eq!(snapshot.endpoint, "https://probe.example.org/");
        assert_eq!(snapshot.transport.as_ref().map(|t| t.secure), Some(true));
        assert!(snapshot.public_ip.is_pending());
        assert!(!snapshot.is_running());
    }
}
