//! HTTP client for the probe API.

use crate::error::CollectorError;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    paths, DiscoveryLogResponse, DiscoveryOutcome, ErrorBody, ScoreRequest, ScoreResult,
};
use std::time::Duration;
use tracing::debug;

/// Client settings.
#[derive(Debug, Clone)]
pub struct ProbeClientConfig {
    /// Whole-request timeout for small JSON calls.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Whole-request timeout for throughput transfers.
    pub transfer_timeout: Duration,
    /// Accept invalid TLS certificates. Makes the session insecure.
    pub accept_invalid_certs: bool,
}

impl Default for ProbeClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            transfer_timeout: Duration::from_secs(60),
            accept_invalid_certs: false,
        }
    }
}

/// Probe API client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: Client,
    base_url: Url,
    config: ProbeClientConfig,
}

impl ProbeClient {
    /// Create a client for the API served at `base_url`.
    pub fn new(base_url: &str, config: ProbeClientConfig) -> Result<Self, CollectorError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CollectorError::InvalidEndpoint(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CollectorError::InvalidEndpoint(format!(
                "unsupported scheme `{}`",
                base_url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(CollectorError::Http)?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ProbeClientConfig {
        &self.config
    }

    /// Absolute URL of an API path.
    pub fn url(&self, path: &str) -> Result<Url, CollectorError> {
        self.base_url
            .join(path)
            .map_err(|e| CollectorError::InvalidEndpoint(format!("{path}: {e}")))
    }

    pub(crate) fn get(&self, path: &str) -> Result<RequestBuilder, CollectorError> {
        Ok(self
            .client
            .get(self.url(path)?)
            .header(reqwest::header::CACHE_CONTROL, "no-store"))
    }

    pub(crate) fn post(&self, path: &str) -> Result<RequestBuilder, CollectorError> {
        Ok(self.client.post(self.url(path)?))
    }

    /// Send a request and fail on transport errors or non-2xx answers.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, CollectorError> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                CollectorError::Connection(format!("Cannot connect to {}", self.base_url))
            } else {
                CollectorError::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Error bodies are `{"error": ...}`; fall back to the reason phrase.
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("error").to_string(),
        };
        debug!(status = status.as_u16(), %message, "Probe endpoint returned an error");
        Err(CollectorError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Send and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, CollectorError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| CollectorError::Parse(e.to_string()))
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CollectorError> {
        self.send_json(self.post(path)?.json(body)).await
    }

    /// Submit collected signals to the score endpoint.
    pub async fn submit_score(&self, request: &ScoreRequest) -> Result<ScoreResult, CollectorError> {
        self.post_json(paths::SCORE, request).await
    }

    /// Report a discovery outcome to the discovery log endpoint.
    pub async fn report_discovery(
        &self,
        outcome: &DiscoveryOutcome,
    ) -> Result<DiscoveryLogResponse, CollectorError> {
        self.post_json(paths::STUN_LOG, outcome).await
    }
}
