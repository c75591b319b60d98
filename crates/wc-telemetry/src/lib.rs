//! # wifi-check Telemetry
//!
//! Structured logging for the probe API server and the panel.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WC_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directives |
//! | `WC_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |
//! | `WC_CONSOLE_OUTPUT` | `true` | Log to stderr |
//! | `WC_LOG_FILE` | unset | Append to a file instead of stderr |
//! | `WC_SERVICE_NAME` / `OTEL_SERVICE_NAME` | `wifi-check` | Service name |

mod config;
mod logging;

pub use config::TelemetryConfig;

use std::path::PathBuf;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Cannot open log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A global subscriber is already installed")]
    AlreadyInitialised,
}

/// Install logging for the lifetime of the process.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let writer = logging::init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
        _writer: writer,
    })
}

/// Held by `main` for the life of the process; logs shutdown on drop.
///
/// Dropping it also flushes and stops the log file writer, so it must
/// outlive every task that logs.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
    _writer: Option<WorkerGuard>,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
