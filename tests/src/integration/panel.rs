//! # Full Diagnostic Run
//!
//! The panel runner driving every collector against the probe API, with
//! discovery over the native STUN connector or a scripted one.

#[cfg(test)]
mod tests {
    use crate::support::{TestApi, KNOWN_ADDRESS, KNOWN_SRFLX};
    use axum::extract::Request;
    use axum::http::HeaderValue;
    use axum::middleware::map_request;
    use shared_types::SeverityLevel;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;
    use wc_01_address_discovery::testing::{ScriptedConnector, StunResponder};
    use wc_01_address_discovery::{
        AddressDiscovery, DiscoveryConfig, PeerConnector, StunPeerConnector,
    };
    use wc_04_probe_api::ServerConfig;
    use wc_panel::report::{render_json, render_text};
    use wc_panel::{DiagnosticRunner, PanelSnapshot, Stage};

    fn runner(api: &TestApi, connector: impl PeerConnector + 'static) -> DiagnosticRunner {
        let discovery = AddressDiscovery::new(
            Arc::new(connector),
            DiscoveryConfig::default().with_timeout(Duration::from_secs(3)),
        );
        DiagnosticRunner::new(api.client(), discovery)
    }

    async fn forwarded(mut request: Request) -> Request {
        request
            .headers_mut()
            .insert("x-forwarded-for", HeaderValue::from_static("198.51.100.20"));
        request
    }

    #[tokio::test]
    async fn test_run_with_native_stun() {
        let responder = StunResponder::spawn().await.unwrap();
        let api = TestApi::spawn().await;
        let connector = StunPeerConnector::new().with_bind_addr("127.0.0.1:0".parse().unwrap());
        let discovery = AddressDiscovery::new(
            Arc::new(connector),
            DiscoveryConfig::default()
                .with_server(responder.server())
                .with_initial_rto(Duration::from_millis(100)),
        );
        let runner = DiagnosticRunner::new(api.client(), discovery);
        let (tx, _rx) = watch::channel(runner.initial_snapshot());

        let snapshot = runner.run(&tx).await;

        assert_eq!(snapshot.public_ip.ready().map(String::as_str), Some("127.0.0.1"));
        // The fixed provider refuses loopback like the public one refuses
        // reserved ranges.
        assert!(snapshot.geo.unavailable_reason().is_some());
        assert_eq!(snapshot.latency_samples().len(), 5);
        assert_eq!(snapshot.score.ready().map(|s| s.score), Some(60));

        let text = render_text(&snapshot);
        assert!(text.contains("Public IP (STUN)   127.0.0.1"));
        assert!(text.contains("Security score     60/100 (ok)"));
    }

    #[tokio::test]
    async fn test_every_stage_is_published_in_order() {
        let api = TestApi::spawn().await;
        let runner = runner(&api, ScriptedConnector::new().with_candidates([KNOWN_SRFLX]))
            .with_throughput(64 * 1024, 64 * 1024);
        let (tx, mut rx) = watch::channel(PanelSnapshot::default());

        let observer = tokio::spawn(async move {
            let mut stages = Vec::new();
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                if let Some(stage) = snapshot.stage {
                    if stages.last() != Some(&stage) {
                        stages.push(stage);
                    }
                }
                if snapshot.last_run.is_some() {
                    break;
                }
            }
            stages
        });

        let snapshot = runner.run(&tx).await;
        let stages = observer.await.unwrap();

        // A watch receiver may skip intermediate values but never reorders them.
        let order = [
            Stage::Transport,
            Stage::Discovery,
            Stage::Geo,
            Stage::Latency,
            Stage::Headers,
            Stage::Score,
            Stage::Throughput,
        ];
        let positions: Vec<usize> = stages
            .iter()
            .map(|s| order.iter().position(|o| o == s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(*tx.borrow(), snapshot);
        assert!(snapshot.throughput.is_some());
        assert_eq!(snapshot.flag(), "\u{1F1F5}\u{1F1F9}");
    }

    #[tokio::test]
    async fn test_run_behind_forwarding_proxy() {
        let api = TestApi::spawn_with(ServerConfig::default(), |router| {
            router.layer(map_request(forwarded))
        })
        .await;
        let runner = runner(&api, ScriptedConnector::new().with_candidates([KNOWN_SRFLX]));
        let (tx, _rx) = watch::channel(runner.initial_snapshot());

        let snapshot = runner.run(&tx).await;

        assert_eq!(snapshot.public_ip.ready().map(String::as_str), Some(KNOWN_ADDRESS));
        assert!(snapshot.headers.ready().unwrap().proxy.detected());

        // insecure (-40), proxy headers (-15), forwarded address mismatch (-10)
        let score = snapshot.score.ready().unwrap();
        assert_eq!(score.score, 35);
        assert_eq!(score.level, SeverityLevel::Critical);
        assert_eq!(score.issues.len(), 3);

        let report: serde_json::Value =
            serde_json::from_str(&render_json(&snapshot).unwrap()).unwrap();
        assert_eq!(report["proxy"]["detected"], true);
        assert_eq!(report["geo"]["country"], "Portugal");
        assert_eq!(report["score"]["score"], 35);
    }

    #[tokio::test]
    async fn test_second_run_replaces_first() {
        let api = TestApi::spawn().await;
        let runner = runner(&api, ScriptedConnector::unavailable());
        let (tx, _rx) = watch::channel(runner.initial_snapshot());

        let first = runner.run(&tx).await;
        let second = runner.run(&tx).await;

        assert!(second.last_run >= first.last_run);
        assert_eq!(second.endpoint, first.endpoint);
        assert_eq!(*tx.borrow(), second);
        // Two full runs: stun-log, latency x5, headers, score each (no geo
        // without an address).
        assert_eq!(api.metrics.snapshot().requests_total, 16);
    }
}
