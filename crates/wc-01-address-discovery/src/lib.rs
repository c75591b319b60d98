//! # WC-01 Address Discovery
//!
//! Approximates this host's public (NAT-external) address by running a
//! one-shot peer negotiation against a public STUN server and harvesting the
//! server reflexive candidate from the gathered metadata.
//!
//! ## Architecture
//!
//! - **Domain Layer:** candidate descriptor parsing, the ordered retained
//!   address set, configuration and errors
//! - **Ports Layer:** `PeerConnector` / `PeerSession` (driven),
//!   `AddressDiscoveryApi` (driving)
//! - **Service Layer:** `AddressDiscovery`, a single bounded negotiation
//! - **Adapters Layer:** native STUN connector (`network` feature)
//!
//! ## Outcomes
//!
//! | Situation | Result |
//! |---|---|
//! | negotiation capability missing | `Unsupported`, no session opened |
//! | offer creation fails | `OfferFailed`, no retry |
//! | no `srflx` candidate before end-of-candidates or 7 s | `BlockedOrUnavailable` |
//! | one or more `srflx` candidates | the first one |
//!
//! ## Example
//!
//! ```rust,no_run
//! use wc_01_address_discovery::{AddressDiscovery, DiscoveryConfig};
//!
//! # async fn run() {
//! let discovery = AddressDiscovery::stun(DiscoveryConfig::default());
//! match discovery.discover().await {
//!     Ok(address) => println!("public address: {address}"),
//!     Err(reason) => println!("unavailable: {reason}"),
//! }
//! # }
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(feature = "network")]
pub mod adapters;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use domain::{
    reflexive_address, CandidateDescriptor, CandidateSet, CandidateType, ConfigError,
    DiscoveryConfig, DiscoveryError, ReflexiveAddress, RendezvousServer, DEFAULT_RENDEZVOUS,
};
pub use ports::{AddressDiscoveryApi, CandidateEvent, NegotiationError, PeerConnector, PeerSession};
pub use service::{AddressDiscovery, DiscoveryHandle};

#[cfg(feature = "network")]
pub use adapters::StunPeerConnector;
