//! # Collectors Against the Probe API
//!
//! Every collector in wc-02 talking to the real wc-04 router over TCP,
//! including the proxy detection path with headers injected in front of the
//! routes the way a reverse proxy would.

#[cfg(test)]
mod tests {
    use crate::support::{TestApi, KNOWN_ADDRESS};
    use axum::extract::Request;
    use axum::http::HeaderValue;
    use axum::middleware::map_request;
    use wc_02_signal_collectors::{
        collect_headers, lookup_geo, CollectorError, LatencySampler, ProbeClient,
        ProbeClientConfig, ThroughputSampler, LATENCY_ATTEMPTS,
    };
    use wc_03_score::LatencyStats;
    use wc_04_probe_api::ServerConfig;

    async fn behind_proxy(mut request: Request) -> Request {
        let headers = request.headers_mut();
        headers.insert("via", HeaderValue::from_static("1.1 edge-proxy"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.20"));
        request
    }

    // =============================================================================
    // LATENCY
    // =============================================================================

    #[tokio::test]
    async fn test_latency_sampler_takes_five_sequential_samples() {
        let api = TestApi::spawn().await;
        let samples = LatencySampler::new(api.client()).sample().await;

        assert_eq!(samples.len(), LATENCY_ATTEMPTS);
        assert!(samples.iter().all(|s| *s >= 0.0));

        let stats = LatencyStats::from_samples(&samples).unwrap();
        assert!(stats.min <= stats.avg && stats.avg <= stats.max);
        assert_eq!(api.metrics.snapshot().requests_total, LATENCY_ATTEMPTS as u64);
    }

    #[tokio::test]
    async fn test_latency_sampler_against_dead_endpoint() {
        let dead = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let client = ProbeClient::new(&format!("http://{dead}"), ProbeClientConfig::default())
            .unwrap();
        assert!(LatencySampler::new(client).sample().await.is_empty());
    }

    // =============================================================================
    // HEADERS / PROXY DETECTION
    // =============================================================================

    #[tokio::test]
    async fn test_direct_connection_has_no_proxy_headers() {
        let api = TestApi::spawn().await;
        let snapshot = collect_headers(&api.client()).await.unwrap();

        assert!(!snapshot.proxy.detected());
        assert!(snapshot.headers.contains_key("host"));
        assert!(snapshot.headers.keys().all(|k| k == &k.to_ascii_lowercase()));
    }

    #[tokio::test]
    async fn test_proxy_headers_detected() {
        let api = TestApi::spawn_with(ServerConfig::default(), |router| {
            router.layer(map_request(behind_proxy))
        })
        .await;
        let snapshot = collect_headers(&api.client()).await.unwrap();

        assert!(snapshot.proxy.detected());
        assert_eq!(snapshot.proxy.headers["via"], "1.1 edge-proxy");
        assert_eq!(snapshot.proxy.headers["x-forwarded-for"], "198.51.100.20");
        assert_eq!(snapshot.proxy.headers.len(), 2);
    }

    // =============================================================================
    // THROUGHPUT
    // =============================================================================

    #[tokio::test]
    async fn test_throughput_round_trip() {
        let api = TestApi::spawn().await;
        let report = ThroughputSampler::new(api.client())
            .with_sizes(256 * 1024, 128 * 1024)
            .run()
            .await;

        assert_eq!(report.download.unwrap().bytes, 256 * 1024);
        assert_eq!(report.upload.unwrap().bytes, 128 * 1024);

        let metrics = api.metrics.snapshot();
        assert_eq!(metrics.bytes_sent, 256 * 1024);
        assert_eq!(metrics.bytes_received, 128 * 1024);
    }

    #[tokio::test]
    async fn test_oversized_download_falls_back_to_default() {
        let api = TestApi::spawn().await;
        let sample = ThroughputSampler::new(api.client())
            .with_sizes(64 * 1024 * 1024, 1)
            .measure_download()
            .await
            .unwrap();
        assert_eq!(sample.bytes, 2 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_unavailable() {
        let mut config = ServerConfig::default();
        config.limits.max_upload_bytes = 1024;
        let api = TestApi::spawn_with(config, |router| router).await;

        let err = ThroughputSampler::new(api.client())
            .with_sizes(1, 4096)
            .measure_upload()
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(413));
    }

    // =============================================================================
    // ADDRESS LOOKUP
    // =============================================================================

    #[tokio::test]
    async fn test_geo_lookup_through_api() {
        let api = TestApi::spawn().await;
        let geo = lookup_geo(&api.client(), KNOWN_ADDRESS).await.unwrap();
        assert_eq!(geo.location_text(), "Portugal, Lisbon, Lisbon");
        assert_eq!(geo.isp.as_deref(), Some("Example ISP"));
        assert_eq!(geo.country_code.as_deref(), Some("PT"));
    }

    #[tokio::test]
    async fn test_geo_lookup_rejection_is_bad_gateway() {
        let api = TestApi::spawn().await;
        let err = lookup_geo(&api.client(), "10.0.0.1").await.unwrap_err();
        match err {
            CollectorError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Could not retrieve information for this address.");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }
}
