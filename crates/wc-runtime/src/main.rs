//! `wc-server`: the probe API behind the wifi-check panel.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use wc_04_probe_api::ProbeApiService;
use wc_runtime::{load_config, Args};
use wc_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _telemetry = init_telemetry(TelemetryConfig::from_env()).context("initialising logging")?;

    let config = load_config(args.config.as_deref())?;
    let service = ProbeApiService::new(config).context("building probe API")?;
    info!(addr = %service.config().http_addr(), "Probe API configured");

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!(error = %e, "Cannot listen for Ctrl+C; shutting down"),
        }
    };

    service.run(shutdown).await.context("running probe API")?;
    Ok(())
}
