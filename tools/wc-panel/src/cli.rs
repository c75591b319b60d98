//! Command-line arguments.

use crate::error::PanelError;
use clap::Parser;
use std::time::Duration;
use wc_01_address_discovery::{DiscoveryConfig, RendezvousServer, DEFAULT_RENDEZVOUS};
use wc_02_signal_collectors::{ProbeClientConfig, DEFAULT_DOWNLOAD_BYTES, DEFAULT_UPLOAD_BYTES};

/// wifi-check: network diagnostic panel
#[derive(Parser, Debug, Clone)]
#[command(name = "wc-panel")]
#[command(about = "Checks transport security, public address, latency and proxies on the route")]
pub struct Args {
    /// Probe API base URL
    #[arg(short, long, env = "WC_ENDPOINT", default_value = "http://127.0.0.1:3000")]
    pub endpoint: String,

    /// STUN server used for public address discovery
    #[arg(long, env = "WC_STUN_SERVER", default_value = DEFAULT_RENDEZVOUS)]
    pub stun_server: String,

    /// Give up on address discovery after this many seconds
    #[arg(long, default_value = "7")]
    pub stun_timeout: u64,

    /// Accept invalid TLS certificates (the transport check then reports insecure)
    #[arg(long)]
    pub insecure: bool,

    /// Also measure download and upload throughput
    #[arg(long)]
    pub throughput: bool,

    /// Download probe size in bytes
    #[arg(long, default_value_t = DEFAULT_DOWNLOAD_BYTES)]
    pub download_bytes: u64,

    /// Upload probe size in bytes
    #[arg(long, default_value_t = DEFAULT_UPLOAD_BYTES)]
    pub upload_bytes: u64,

    /// Run the diagnostics once, print a report and exit
    #[arg(long)]
    pub once: bool,

    /// With --once, print the report as JSON
    #[arg(long, requires = "once")]
    pub json: bool,
}

impl Args {
    pub fn probe_client_config(&self) -> ProbeClientConfig {
        ProbeClientConfig {
            accept_invalid_certs: self.insecure,
            ..ProbeClientConfig::default()
        }
    }

    pub fn discovery_config(&self) -> Result<DiscoveryConfig, PanelError> {
        let server: RendezvousServer = self.stun_server.parse().map_err(PanelError::StunServer)?;
        let config = DiscoveryConfig::default()
            .with_server(server)
            .with_timeout(Duration::from_secs(self.stun_timeout));
        config.validate().map_err(PanelError::Discovery)?;
        Ok(config)
    }
}
