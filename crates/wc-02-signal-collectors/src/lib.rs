//! # WC-02 Signal Collectors
//!
//! Independent, stateless probes that each produce one diagnostic signal.
//!
//! ## Collectors
//!
//! | Collector | Source | Signal |
//! |---|---|---|
//! | [`check_transport`] | endpoint URL + TLS settings | secure flag and explanation |
//! | [`LatencySampler`] | `GET /api/latency` x5, sequential | round-trip samples (ms) |
//! | [`collect_headers`] | `GET /api/check-headers` | echoed headers + proxy subset |
//! | [`ThroughputSampler`] | download/upload probes | Mbit/s per direction |
//! | [`lookup_geo`] | `GET /api/geo-ip` | location, ISP, country code |
//!
//! A failing collector yields "signal unavailable" ([`CollectorError`]) and
//! never affects its siblings: they share nothing but a cloned
//! [`ProbeClient`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use wc_02_signal_collectors::{LatencySampler, ProbeClient, ProbeClientConfig};
//!
//! # async fn run() -> Result<(), wc_02_signal_collectors::CollectorError> {
//! let client = ProbeClient::new("http://127.0.0.1:3000", ProbeClientConfig::default())?;
//! let samples = LatencySampler::new(client).sample().await;
//! println!("{} samples", samples.len());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod geo;
pub mod headers;
pub mod latency;
pub mod throughput;
pub mod transport;

pub use client::{ProbeClient, ProbeClientConfig};
pub use error::CollectorError;
pub use geo::{country_code_to_flag, lookup_geo};
pub use headers::{collect_headers, HeaderSnapshot, ProxyReport, PROXY_HEADER_NAMES};
pub use latency::{LatencySampler, LATENCY_ATTEMPTS};
pub use throughput::{
    mbps, ThroughputReport, ThroughputSampler, TransferSample, DEFAULT_DOWNLOAD_BYTES,
    DEFAULT_UPLOAD_BYTES,
};
pub use transport::{check_transport, is_secure_context, TransportSecurity};
