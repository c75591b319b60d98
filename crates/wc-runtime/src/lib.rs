//! # wifi-check Server Runtime
//!
//! Configuration loading for the `wc-server` binary.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments (`--config` / `WC_CONFIG`)
//! 2. Install logging from `WC_LOG_*`
//! 3. Load the TOML file, if any, then apply environment overrides
//! 4. Validate and serve until Ctrl+C

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wc_04_probe_api::ServerConfig;

/// Probe API server for the wifi-check panel.
#[derive(Debug, Parser)]
#[command(name = "wc-server", version, about)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "WC_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Load configuration from an optional file, then the process environment.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// [`load_config`] with an injectable environment.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            let config = ServerConfig::from_toml_str(&source)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        }
        None => ServerConfig::default(),
    };

    apply_env_overrides(&mut config, lookup);
    config.validate().context("validating configuration")?;
    Ok(config)
}

/// `WC_HTTP_HOST`, `WC_HTTP_PORT` and `WC_GEO_PROVIDER_URL` override the
/// file. Unparseable values are logged and ignored.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("WC_HTTP_HOST") {
        match host.parse() {
            Ok(h) => config.http.host = h,
            Err(_) => warn!(value = %host, "WC_HTTP_HOST is not an IP address"),
        }
    }
    if let Some(port) = lookup("WC_HTTP_PORT") {
        match port.parse() {
            Ok(p) => config.http.port = p,
            Err(_) => warn!(value = %port, "WC_HTTP_PORT is not a port number"),
        }
    }
    if let Some(url) = lookup("WC_GEO_PROVIDER_URL") {
        config.geo.provider_url = url;
    }
}
