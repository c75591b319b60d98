//! ipapi.co geolocation adapter.
//!
//! `GET <base>/<ip>/json/` answers a flat JSON object; an `error` field marks
//! a refused lookup even when the status is 200.

use crate::ports::{GeoProvider, GeoProviderError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use shared_types::GeoInfo;
use std::time::Duration;
use tracing::debug;

/// [`GeoProvider`] backed by the ipapi.co JSON API (or anything that speaks
/// its format).
#[derive(Debug, Clone)]
pub struct IpApiProvider {
    client: Client,
    base_url: Url,
}

impl IpApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeoProviderError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GeoProviderError::Unreachable(format!("invalid base URL: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeoProviderError::Unreachable(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Lookup URL for `ip`. The address is one percent-encoded path segment.
    pub fn lookup_url(&self, ip: &str) -> Result<Url, GeoProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GeoProviderError::Unreachable("base URL cannot have a path".into()))?
            .pop_if_empty()
            .push(ip)
            .push("json")
            .push("");
        Ok(url)
    }
}

#[async_trait]
impl GeoProvider for IpApiProvider {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo, GeoProviderError> {
        let url = self.lookup_url(ip)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| GeoProviderError::Unreachable(e.to_string()))?;

        let status = response.status();
        let data: Value = response
            .json()
            .await
            .map_err(|e| GeoProviderError::Malformed(e.to_string()))?;

        if !status.is_success() || data.get("error").is_some_and(is_set) {
            let reason = text(&data, "reason").unwrap_or_else(|| status.to_string());
            return Err(GeoProviderError::Rejected(reason));
        }

        debug!(ip, "Provider lookup succeeded");
        Ok(parse_geo(&data))
    }
}

/// Map the provider's field names onto [`GeoInfo`].
pub fn parse_geo(data: &Value) -> GeoInfo {
    GeoInfo {
        country: text(data, "country_name"),
        region: text(data, "region"),
        city: text(data, "city"),
        isp: text(data, "org")
            .or_else(|| text(data, "org_name"))
            .or_else(|| text(data, "asn")),
        country_code: text(data, "country"),
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Non-empty string or number field as text.
fn text(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_isp_fallback_order() {
        let geo = parse_geo(&json!({"org_name": "Fallback Org", "asn": "AS64500"}));
        assert_eq!(geo.isp.as_deref(), Some("Fallback Org"));

        let geo = parse_geo(&json!({"org": "", "asn": "AS64500"}));
        assert_eq!(geo.isp.as_deref(), Some("AS64500"));

        let geo = parse_geo(&json!({}));
        assert_eq!(geo, GeoInfo::default());
    }

    #[test]
    fn test_lookup_url_encoding() {
        let provider = IpApiProvider::new("https://ipapi.co", Duration::from_secs(1)).unwrap();
        assert_eq!(
            provider.lookup_url("203.0.113.7").unwrap().as_str(),
            "https://ipapi.co/203.0.113.7/json/"
        );
        assert_eq!(
            provider.lookup_url("a/b c").unwrap().as_str(),
            "https://ipapi.co/a%2Fb%20c/json/"
        );
    }

    #[tokio::test]
    async fn test_lookup_maps_fields() {
        let router = Router::new().route(
            "/:ip/json/",
            get(|Path(ip): Path<String>| async move {
                assert_eq!(ip, "198.51.100.4");
                Json(json!({
                    "ip": ip,
                    "country_name": "Portugal",
                    "region": "Lisbon",
                    "city": "Lisbon",
                    "org": "Example ISP",
                    "country": "PT"
                }))
            }),
        );
        let base = serve(router).await;
        let provider = IpApiProvider::new(&base, Duration::from_secs(5)).unwrap();

        let geo = provider.lookup("198.51.100.4").await.unwrap();
        assert_eq!(geo.location_text(), "Portugal, Lisbon, Lisbon");
        assert_eq!(geo.isp.as_deref(), Some("Example ISP"));
        assert_eq!(geo.country_code.as_deref(), Some("PT"));
    }

    #[tokio::test]
    async fn test_error_payload_is_rejection() {
        let router = Router::new().route(
            "/:ip/json/",
            get(|| async { Json(json!({"error": true, "reason": "Reserved IP Address"})) }),
        );
        let base = serve(router).await;
        let provider = IpApiProvider::new(&base, Duration::from_secs(5)).unwrap();

        let err = provider.lookup("10.0.0.1").await.unwrap_err();
        assert_eq!(err, GeoProviderError::Rejected("Reserved IP Address".into()));
    }

    #[tokio::test]
    async fn test_non_json_answer_is_malformed() {
        let router = Router::new().route(
            "/:ip/json/",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = serve(router).await;
        let provider = IpApiProvider::new(&base, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            provider.lookup("203.0.113.7").await,
            Err(GeoProviderError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let provider =
            IpApiProvider::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

        assert!(matches!(
            provider.lookup("203.0.113.7").await,
            Err(GeoProviderError::Unreachable(_))
        ));
    }
}
