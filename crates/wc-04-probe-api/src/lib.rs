//! # WC-04 Probe API
//!
//! The HTTP backend the signal collectors measure against.
//!
//! ## Routes
//!
//! | Route | Method | Purpose |
//! |---|---|---|
//! | `/api/check-headers` | GET | echo request headers (lowercased names) |
//! | `/api/latency` | GET | server clock, for round-trip timing |
//! | `/api/connection-speed/download` | GET | `size` zero bytes (default 2 MiB, max 20 MiB) |
//! | `/api/connection-speed/upload` | POST | count body bytes |
//! | `/api/geo-ip` | GET | location of `ip` via the geolocation provider |
//! | `/api/score` | POST | heuristic score of submitted signals |
//! | `/api/stun-log` | POST | acknowledge a discovery outcome |
//! | `/health` | GET | version, uptime and counters |
//!
//! Every response carries `cache-control: no-store`; errors are
//! `{"error": "..."}` with a non-2xx status.
//!
//! ## Architecture
//!
//! ```text
//! Request → CORS → no-store → Tracing/metrics → Timeout → Handler
//!                                                           │
//!                                     GeoProvider port ─────┘ (ipapi.co adapter)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use wc_04_probe_api::{ProbeApiService, ServerConfig};
//!
//! let service = ProbeApiService::new(ServerConfig::default())?;
//! service.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod service;

pub use adapters::IpApiProvider;
pub use domain::config::{
    ConfigError, CorsConfig, GeoConfig, HttpConfig, LimitsConfig, ServerConfig, TimeoutConfig,
};
pub use domain::error::{ApiError, ApiResult, ProbeApiError};
pub use middleware::{MetricsSnapshot, ProbeMetrics};
pub use ports::{GeoProvider, GeoProviderError};
pub use router::{build_router, AppState};
pub use service::ProbeApiService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
