//! Header echo and proxy detection.

use crate::client::ProbeClient;
use crate::error::CollectorError;
use shared_types::{paths, HeaderEchoResponse, HeaderSet};
use tracing::debug;

/// Headers that proxies, load balancers and CDNs add on the way through.
pub const PROXY_HEADER_NAMES: [&str; 5] = [
    "x-forwarded-for",
    "x-forwarded-proto",
    "x-forwarded-host",
    "via",
    "forwarded",
];

/// Proxy-indicating subset of a header set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyReport {
    pub headers: HeaderSet,
}

impl ProxyReport {
    /// Keep only allow-listed names with non-empty values.
    pub fn from_headers(headers: &HeaderSet) -> Self {
        let headers = PROXY_HEADER_NAMES
            .iter()
            .filter_map(|name| {
                headers
                    .get(*name)
                    .filter(|v| !v.is_empty())
                    .map(|v| (name.to_string(), v.clone()))
            })
            .collect();
        Self { headers }
    }

    pub fn detected(&self) -> bool {
        !self.headers.is_empty()
    }
}

/// Headers as the backend received them, plus the proxy verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSnapshot {
    pub headers: HeaderSet,
    pub proxy: ProxyReport,
}

/// One request to the header echo endpoint.
pub async fn collect_headers(client: &ProbeClient) -> Result<HeaderSnapshot, CollectorError> {
    let echo: HeaderEchoResponse = client.send_json(client.get(paths::CHECK_HEADERS)?).await?;
    // Names are lowercase on the wire; normalise anyway in case a proxy
    // rewrote the body.
    let headers: HeaderSet = echo
        .headers
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect();
    let proxy = ProxyReport::from_headers(&headers);
    debug!(
        headers = headers.len(),
        proxy_detected = proxy.detected(),
        "Collected echoed headers"
    );
    Ok(HeaderSnapshot { headers, proxy })
}
