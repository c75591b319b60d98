//! Round-trip latency sampler.

use crate::client::ProbeClient;
use crate::error::CollectorError;
use shared_types::{paths, LatencyResponse};
use std::time::Instant;
use tracing::{debug, instrument};

/// Samples taken per run.
pub const LATENCY_ATTEMPTS: usize = 5;

/// Issues sequential requests to the latency endpoint and times each one,
/// body decode included.
///
/// Requests never overlap, so every sample is one isolated round trip.
#[derive(Debug, Clone)]
pub struct LatencySampler {
    client: ProbeClient,
    attempts: usize,
}

impl LatencySampler {
    pub fn new(client: ProbeClient) -> Self {
        Self {
            client,
            attempts: LATENCY_ATTEMPTS,
        }
    }

    /// Builder-style method to set the number of samples per run.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sample a full run; any failed request fails the whole run.
    #[instrument(name = "latency_sampler", skip(self), fields(attempts = self.attempts))]
    pub async fn try_sample(&self) -> Result<Vec<f64>, CollectorError> {
        let mut samples = Vec::with_capacity(self.attempts);
        for i in 0..self.attempts {
            let request = self.client.get(paths::LATENCY)?.query(&[("i", i)]);
            let start = Instant::now();
            let _: LatencyResponse = self.client.send_json(request).await?;
            samples.push(start.elapsed().as_secs_f64() * 1_000.0);
        }
        debug!(?samples, "Latency run complete");
        Ok(samples)
    }

    /// Sample a full run, yielding no samples at all if any request fails.
    pub async fn sample(&self) -> Vec<f64> {
        match self.try_sample().await {
            Ok(samples) => samples,
            Err(e) => {
                debug!(error = %e, "Latency run discarded");
                Vec::new()
            }
        }
    }
}
