//! Telemetry configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every event
    pub service_name: String,

    /// Filter directives (`info`, `wc_04_probe_api=debug,info`, ...)
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Write to stderr when no log file is set
    pub console_output: bool,

    /// Append logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "wifi-check".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            console_output: true,
            log_file: None,
        }
    }
}

fn flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WC_SERVICE_NAME` or `OTEL_SERVICE_NAME`: Service name (default: wifi-check)
    /// - `WC_LOG_LEVEL` or `RUST_LOG`: Filter directives (default: info)
    /// - `WC_JSON_LOGS`: JSON output (default: false locally, true in containers)
    /// - `WC_CONSOLE_OUTPUT`: Log to stderr (default: true)
    /// - `WC_LOG_FILE`: Append to this file instead of stderr
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("WC_SERVICE_NAME")
                .or_else(|| lookup("OTEL_SERVICE_NAME"))
                .unwrap_or(defaults.service_name),

            log_level: lookup("WC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("WC_JSON_LOGS")
                .map(|v| flag(&v))
                .unwrap_or(is_container),

            console_output: lookup("WC_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            log_file: lookup("WC_LOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Configuration for a full-screen terminal UI: nothing may reach the
    /// terminal, so logs go to `WC_LOG_FILE` or nowhere.
    pub fn for_terminal_ui() -> Self {
        let mut config = Self::from_env();
        config.console_output = false;
        config
    }

    /// Builder-style method to set the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Whether any log output is configured.
    pub fn has_output(&self) -> bool {
        self.console_output || self.log_file.is_some()
    }
}
