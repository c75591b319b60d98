//! # Driving Port (Inbound API)

use crate::domain::{DiscoveryError, ReflexiveAddress};
use async_trait::async_trait;

/// Discover the approximate public address of this host.
///
/// One call is one bounded negotiation: it resolves exactly once, with either
/// an address or the reason there is none. Nothing is cached between calls.
///
/// # Example
///
/// ```rust,ignore
/// async fn show(api: &dyn AddressDiscoveryApi) {
///     match api.discover().await {
///         Ok(address) => println!("public address: {address}"),
///         Err(reason) => println!("unavailable: {reason}"),
///     }
/// }
/// ```
#[async_trait]
pub trait AddressDiscoveryApi: Send + Sync {
    async fn discover(&self) -> Result<ReflexiveAddress, DiscoveryError>;
}
