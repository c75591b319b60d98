//! # Score Endpoint Contract
//!
//! The score route computes exactly what the pure aggregator computes, and
//! tolerates the loose payloads arbitrary clients send.

#[cfg(test)]
mod tests {
    use crate::support::TestApi;
    use rand::Rng;
    use shared_types::{HeaderSet, ScoreRequest, SeverityLevel};
    use wc_03_score::compute_score;

    fn headers(pairs: &[(&str, &str)]) -> HeaderSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_insecure_without_other_signals() {
        let api = TestApi::spawn().await;
        let result = api.client().submit_score(&ScoreRequest::default()).await.unwrap();

        assert_eq!(result.score, 60);
        assert_eq!(result.level, SeverityLevel::Ok);
        assert_eq!(result.issues.len(), 1);
    }

    #[tokio::test]
    async fn test_slow_route_behind_proxy() {
        let api = TestApi::spawn().await;
        let request = ScoreRequest {
            https_secure: true,
            latency_samples: Some(vec![900.0; 5]),
            proxy_headers: headers(&[("via", "1.1 proxy")]),
            ..ScoreRequest::default()
        };
        let result = api.client().submit_score(&request).await.unwrap();

        assert_eq!(result.score, 65);
        assert_eq!(result.level, SeverityLevel::Ok);
        assert_eq!(result.details.avg_latency, Some(900.0));
    }

    #[tokio::test]
    async fn test_every_penalty_bottoms_out_critical() {
        let api = TestApi::spawn().await;
        let request = ScoreRequest {
            https_secure: false,
            public_ip: Some("203.0.113.7".into()),
            latency_samples: Some(vec![1500.0]),
            proxy_headers: headers(&[("x-forwarded-for", "198.51.100.20")]),
            raw_headers: headers(&[("x-forwarded-for", "198.51.100.20")]),
        };
        let result = api.client().submit_score(&request).await.unwrap();

        assert_eq!(result.score, 15);
        assert_eq!(result.level, SeverityLevel::Critical);
        assert_eq!(result.issues.len(), 4);
    }

    #[tokio::test]
    async fn test_endpoint_matches_aggregator() {
        let api = TestApi::spawn().await;
        let client = api.client();
        let mut rng = rand::thread_rng();

        for _ in 0..20 {
            let samples: Vec<f64> = (0..5).map(|_| f64::from(rng.gen_range(0..2000u32))).collect();
            let request = ScoreRequest {
                https_secure: rng.gen_bool(0.5),
                public_ip: Some("203.0.113.7".into()),
                latency_samples: Some(samples),
                proxy_headers: if rng.gen_bool(0.5) {
                    headers(&[("via", "1.1 proxy")])
                } else {
                    HeaderSet::new()
                },
                raw_headers: headers(&[("x-real-ip", "203.0.113.7")]),
            };

            let remote = client.submit_score(&request).await.unwrap();
            let local = compute_score(&request);
            assert_eq!(remote.score, local.score);
            assert_eq!(remote.level, local.level);
            assert_eq!(remote.issues, local.issues);
            assert!(remote.score <= 100);
        }
    }

    #[tokio::test]
    async fn test_loose_payload_is_scored() {
        let api = TestApi::spawn().await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/score", api.base_url()))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(r#"{"httpsSecure": "yes", "latencySamples": ["120", "abc", 80]}"#)
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[reqwest::header::CACHE_CONTROL],
            "no-store"
        );

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["score"], 100);
        assert_eq!(body["level"], "excellent");
        assert_eq!(body["details"]["latencySamples"], serde_json::json!([120.0, 0.0, 80.0]));
    }
}
