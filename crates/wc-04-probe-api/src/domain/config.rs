//! Server configuration with validation.
//!
//! Every section has defaults, so an empty TOML document is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

const MIB: usize = 1024 * 1024;

/// Main probe API configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener
    pub http: HttpConfig,
    /// Transfer size limits
    pub limits: LimitsConfig,
    /// Per-route timeouts
    pub timeouts: TimeoutConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Address lookup provider
    pub geo: GeoConfig,
}

impl ServerConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_upload_bytes cannot be 0".into(),
            ));
        }

        if self.limits.max_download_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_download_bytes cannot be 0".into(),
            ));
        }

        if self.limits.default_download_bytes == 0
            || self.limits.default_download_bytes > self.limits.max_download_bytes
        {
            return Err(ConfigError::InvalidLimit(format!(
                "default_download_bytes must be in 1..={}",
                self.limits.max_download_bytes
            )));
        }

        for (name, value) in [
            ("default", self.timeouts.default),
            ("transfer", self.timeouts.transfer),
            ("upstream", self.timeouts.upstream),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!(
                    "{name} timeout cannot be 0"
                )));
            }
        }

        if self.geo.enabled {
            let url = reqwest::Url::parse(&self.geo.provider_url)
                .map_err(|e| ConfigError::Invalid(format!("geo.provider_url: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "geo.provider_url must be http or https, got {}",
                    url.scheme()
                )));
            }
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
        }
    }
}

/// Transfer size limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted upload body (default: 25 MiB)
    pub max_upload_bytes: usize,
    /// Largest payload the download probe will generate (default: 20 MiB)
    pub max_download_bytes: usize,
    /// Payload size when `size` is absent or out of range (default: 2 MiB)
    pub default_download_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 25 * MIB,
            max_download_bytes: 20 * MIB,
            default_download_bytes: 2 * MIB,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Timeout for most routes
    #[serde(with = "humantime_serde")]
    pub default: Duration,
    /// Timeout for the download and upload probes
    #[serde(with = "humantime_serde")]
    pub transfer: Duration,
    /// Timeout for routes that call the address lookup provider
    #[serde(with = "humantime_serde")]
    pub upstream: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(10),
            transfer: Duration::from_secs(60),
            upstream: Duration::from_secs(8),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache, in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec!["Content-Type".to_string()],
            max_age: 86400,
        }
    }
}

/// Address lookup provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Serve `/api/geo-ip`; when false the route answers 503
    pub enabled: bool,
    /// Provider base URL; lookups go to `<base>/<ip>/json/`
    pub provider_url: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider_url: "https://ipapi.co".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid TOML or has mistyped keys
    #[error("cannot parse configuration: {0}")]
    Parse(String),
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Durations as `"10s"`, `"500ms"`, `"2m"` or bare seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s" and "m": both are suffixes of it.
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
