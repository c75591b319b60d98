//! Outbound ports for the probe API.

use async_trait::async_trait;
use shared_types::GeoInfo;

/// Geolocation provider failure.
///
/// The variants decide the HTTP status of `/api/geo-ip`: a provider that
/// answered with an error is a bad gateway, anything else is internal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoProviderError {
    /// The provider answered with a non-2xx status or an error payload.
    #[error("provider rejected the lookup: {0}")]
    Rejected(String),

    /// The provider could not be reached or timed out.
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    /// The provider answered with something that is not JSON.
    #[error("provider answer undecodable: {0}")]
    Malformed(String),
}

/// Resolves a public address to a location.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    async fn lookup(&self, ip: &str) -> Result<GeoInfo, GeoProviderError>;
}
