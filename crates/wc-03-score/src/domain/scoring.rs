//! Score computation.

use super::policy::ScoringPolicy;
use super::stats::mean;
use shared_types::{ScoreDetails, ScoreRequest, ScoreResult, SeverityLevel};
use tracing::debug;

const MAX_SCORE: i32 = 100;

/// Headers consulted, in order, for the address the backend saw.
const CLIENT_ADDRESS_HEADERS: [&str; 2] = ["x-real-ip", "x-forwarded-for"];

/// Score a set of signals with the default policy.
pub fn compute_score(request: &ScoreRequest) -> ScoreResult {
    ScoringPolicy::default().score(request)
}

impl ScoringPolicy {
    /// Score a set of signals.
    ///
    /// Missing signals skip their factor: no samples means no latency
    /// penalty, no discovered address or no client address header means no
    /// mismatch penalty.
    pub fn score(&self, request: &ScoreRequest) -> ScoreResult {
        let mut score = MAX_SCORE;
        let mut issues = Vec::new();

        if !request.https_secure {
            score -= i32::from(self.insecure_transport_penalty);
            issues.push(
                "The session is not served over HTTPS or the context is not fully secure."
                    .to_string(),
            );
        }

        let samples = request.latency_samples.clone().unwrap_or_default();
        let avg_latency = mean(&samples);
        if let Some(avg) = avg_latency {
            if avg > self.high_latency_ms {
                score -= i32::from(self.high_latency_penalty);
                issues.push(format!(
                    "Very high latency to the server ({avg:.0} ms); the network may be unstable or the route congested."
                ));
            } else if avg > self.moderate_latency_ms {
                score -= i32::from(self.moderate_latency_penalty);
                issues.push(format!(
                    "Moderate latency to the server ({avg:.0} ms); not critical, but noticeable."
                ));
            }
        }

        if !request.proxy_headers.is_empty() {
            score -= i32::from(self.proxy_headers_penalty);
            issues.push(format!(
                "Proxy or load-balancer headers detected ({}). Common behind CDNs, but may also indicate intermediary proxies.",
                request
                    .proxy_headers
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        if address_mismatch(request) {
            score -= i32::from(self.address_mismatch_penalty);
            issues.push(
                "The address seen by the backend does not match the STUN-discovered address; NAT, CGNAT or proxies may be on the route."
                    .to_string(),
            );
        }

        let score = score.clamp(0, MAX_SCORE) as u8;
        let level = SeverityLevel::from_score(score);
        debug!(score, %level, issues = issues.len(), "Computed score");

        ScoreResult {
            score,
            level,
            issues,
            details: ScoreDetails {
                avg_latency,
                latency_samples: samples,
                proxy_headers: request.proxy_headers.clone(),
            },
        }
    }
}

/// The client address header does not contain the discovered address.
///
/// Substring containment on purpose: `x-forwarded-for` may carry a
/// comma-separated chain.
fn address_mismatch(request: &ScoreRequest) -> bool {
    let Some(public_ip) = request.public_ip.as_deref() else {
        return false;
    };
    let client_address = CLIENT_ADDRESS_HEADERS
        .iter()
        .filter_map(|name| request.raw_headers.get(*name))
        .find(|value| !value.is_empty());

    match client_address {
        Some(header) => !header.contains(public_ip),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::HeaderSet;

    fn headers(pairs: &[(&str, &str)]) -> HeaderSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn secure() -> ScoreRequest {
        ScoreRequest {
            https_secure: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_penalties_is_perfect() {
        let result = compute_score(&secure());
        assert_eq!(result.score, 100);
        assert_eq!(result.level, SeverityLevel::Excellent);
        assert!(result.issues.is_empty());
        assert_eq!(result.details.avg_latency, None);
    }

    #[test]
    fn test_insecure_only_is_sixty_ok() {
        let result = compute_score(&ScoreRequest::default());
        assert_eq!(result.score, 60);
        assert_eq!(result.level, SeverityLevel::Ok);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_high_latency_and_proxy() {
        let request = ScoreRequest {
            latency_samples: Some(vec![900.0; 5]),
            proxy_headers: headers(&[("via", "1.1 varnish")]),
            ..secure()
        };
        let result = compute_score(&request);
        assert_eq!(result.score, 65);
        assert_eq!(result.level, SeverityLevel::Ok);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.details.avg_latency, Some(900.0));
    }

    #[test]
    fn test_latency_thresholds_are_exclusive() {
        let at = |ms: f64| {
            compute_score(&ScoreRequest {
                latency_samples: Some(vec![ms]),
                ..secure()
            })
            .score
        };
        assert_eq!(at(300.0), 100);
        assert_eq!(at(300.5), 90);
        assert_eq!(at(800.0), 90);
        assert_eq!(at(800.5), 80);
    }

    #[test]
    fn test_empty_samples_skip_latency_factor() {
        let request = ScoreRequest {
            latency_samples: Some(vec![]),
            ..secure()
        };
        let result = compute_score(&request);
        assert_eq!(result.score, 100);
        assert!(result.details.latency_samples.is_empty());
    }

    #[test]
    fn test_address_mismatch_uses_substring_containment() {
        let mut request = ScoreRequest {
            public_ip: Some("203.0.113.7".into()),
            raw_headers: headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]),
            ..secure()
        };
        assert_eq!(compute_score(&request).score, 100);

        request.raw_headers = headers(&[("x-forwarded-for", "198.51.100.1")]);
        assert_eq!(compute_score(&request).score, 90);
    }

    #[test]
    fn test_real_ip_takes_precedence() {
        let request = ScoreRequest {
            public_ip: Some("203.0.113.7".into()),
            raw_headers: headers(&[
                ("x-real-ip", "198.51.100.1"),
                ("x-forwarded-for", "203.0.113.7"),
            ]),
            ..secure()
        };
        assert_eq!(compute_score(&request).score, 90);
    }

    #[test]
    fn test_empty_real_ip_falls_back() {
        let request = ScoreRequest {
            public_ip: Some("203.0.113.7".into()),
            raw_headers: headers(&[("x-real-ip", ""), ("x-forwarded-for", "203.0.113.7")]),
            ..secure()
        };
        assert_eq!(compute_score(&request).score, 100);
    }

    #[test]
    fn test_mismatch_needs_both_sides() {
        let no_header = ScoreRequest {
            public_ip: Some("203.0.113.7".into()),
            ..secure()
        };
        assert_eq!(compute_score(&no_header).score, 100);

        let no_address = ScoreRequest {
            raw_headers: headers(&[("x-real-ip", "198.51.100.1")]),
            ..secure()
        };
        assert_eq!(compute_score(&no_address).score, 100);
    }

    #[test]
    fn test_every_penalty_applied() {
        let request = ScoreRequest {
            https_secure: false,
            public_ip: Some("203.0.113.7".into()),
            latency_samples: Some(vec![1_000.0; 5]),
            proxy_headers: headers(&[("via", "proxy")]),
            raw_headers: headers(&[("x-real-ip", "198.51.100.1")]),
        };
        let result = compute_score(&request);
        assert_eq!(result.score, 15);
        assert_eq!(result.level, SeverityLevel::Critical);
        assert_eq!(result.issues.len(), 4);
    }

    #[test]
    fn test_heavy_policy_clamps_to_zero() {
        let mut policy = ScoringPolicy::default();
        policy.insecure_transport_penalty = 100;
        let request = ScoreRequest {
            proxy_headers: headers(&[("via", "proxy")]),
            ..Default::default()
        };
        let result = policy.score(&request);
        assert_eq!(result.score, 0);
        assert_eq!(result.level, SeverityLevel::Critical);
    }

    #[test]
    fn test_score_always_in_range() {
        for https_secure in [false, true] {
            for latency in [None, Some(vec![]), Some(vec![50.0]), Some(vec![400.0]), Some(vec![5_000.0])] {
                for proxy in [HeaderSet::new(), headers(&[("forwarded", "for=1.2.3.4")])] {
                    for raw in [HeaderSet::new(), headers(&[("x-real-ip", "9.9.9.9")])] {
                        let request = ScoreRequest {
                            https_secure,
                            public_ip: Some("1.1.1.1".into()),
                            latency_samples: latency.clone(),
                            proxy_headers: proxy.clone(),
                            raw_headers: raw,
                        };
                        let result = compute_score(&request);
                        assert!(result.score <= 100);
                        assert_eq!(result.level, SeverityLevel::from_score(result.score));
                    }
                }
            }
        }
    }
}
