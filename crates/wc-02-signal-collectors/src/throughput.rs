//! Download and upload throughput sampler.

use crate::client::ProbeClient;
use crate::error::CollectorError;
use shared_types::{paths, UploadResponse};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

pub const DEFAULT_DOWNLOAD_BYTES: u64 = 2 * 1024 * 1024;
pub const DEFAULT_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Megabits per second for `bytes` moved in `elapsed`.
///
/// Sub-microsecond transfers are timed as one microsecond.
pub fn mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64().max(1e-6);
    (bytes as f64 * 8.0) / secs / 1_000_000.0
}

/// One timed transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferSample {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl TransferSample {
    pub fn mbps(&self) -> f64 {
        mbps(self.bytes, self.elapsed)
    }
}

/// Result of a throughput run. Each direction fails on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThroughputReport {
    pub download: Option<TransferSample>,
    pub upload: Option<TransferSample>,
}

/// Times a fixed-size download and a fixed-size upload.
#[derive(Debug, Clone)]
pub struct ThroughputSampler {
    client: ProbeClient,
    download_bytes: u64,
    upload_bytes: u64,
}

impl ThroughputSampler {
    pub fn new(client: ProbeClient) -> Self {
        Self {
            client,
            download_bytes: DEFAULT_DOWNLOAD_BYTES,
            upload_bytes: DEFAULT_UPLOAD_BYTES,
        }
    }

    /// Builder-style method to set the transfer sizes.
    #[must_use]
    pub fn with_sizes(mut self, download_bytes: u64, upload_bytes: u64) -> Self {
        self.download_bytes = download_bytes;
        self.upload_bytes = upload_bytes;
        self
    }

    #[instrument(name = "download_probe", skip(self), fields(bytes = self.download_bytes))]
    pub async fn measure_download(&self) -> Result<TransferSample, CollectorError> {
        let request = self
            .client
            .get(paths::DOWNLOAD)?
            .query(&[("size", self.download_bytes)])
            .timeout(self.client.config().transfer_timeout);

        let start = Instant::now();
        let body = self.client.send(request).await?.bytes().await?;
        let elapsed = start.elapsed();

        let sample = TransferSample {
            bytes: body.len() as u64,
            elapsed,
        };
        debug!(bytes = sample.bytes, mbps = sample.mbps(), "Download timed");
        Ok(sample)
    }

    #[instrument(name = "upload_probe", skip(self), fields(bytes = self.upload_bytes))]
    pub async fn measure_upload(&self) -> Result<TransferSample, CollectorError> {
        let payload = vec![0u8; self.upload_bytes as usize];
        let request = self
            .client
            .post(paths::UPLOAD)?
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .timeout(self.client.config().transfer_timeout)
            .body(payload);

        let start = Instant::now();
        let ack: UploadResponse = self.client.send_json(request).await?;
        let elapsed = start.elapsed();

        let sample = TransferSample {
            bytes: ack.received_bytes,
            elapsed,
        };
        debug!(bytes = sample.bytes, mbps = sample.mbps(), "Upload timed");
        Ok(sample)
    }

    /// Download then upload; a failed direction is reported as `None`.
    pub async fn run(&self) -> ThroughputReport {
        let download = self
            .measure_download()
            .await
            .map_err(|e| debug!(error = %e, "Download probe unavailable"))
            .ok();
        let upload = self
            .measure_upload()
            .await
            .map_err(|e| debug!(error = %e, "Upload probe unavailable"))
            .ok();
        ThroughputReport { download, upload }
    }
}
