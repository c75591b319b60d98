//! Middleware stack for the probe API.
//!
//! Layer order: Request → CORS → no-store header → Tracing/metrics → Timeout → Handler

pub mod cors;
pub mod metrics;
pub mod timeout;
pub mod tracing;

pub use cors::create_cors_layer;
pub use metrics::{MetricsSnapshot, ProbeMetrics};
pub use timeout::{timeout_for_path, TimeoutLayer};
pub use tracing::TracingLayer;
