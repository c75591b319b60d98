//! Panel start-up errors.

use thiserror::Error;
use wc_01_address_discovery::ConfigError;
use wc_02_signal_collectors::CollectorError;

/// Invalid command-line settings. Failures during a run never surface
/// here: they become "unavailable" entries in the snapshot.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("invalid probe endpoint: {0}")]
    Endpoint(#[source] CollectorError),

    #[error("invalid STUN server: {0}")]
    StunServer(#[source] ConfigError),

    #[error("invalid discovery settings: {0}")]
    Discovery(#[source] ConfigError),
}
