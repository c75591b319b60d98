//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Port (Inbound):** the discovery call consumers make
//! - **Driven Ports (Outbound):** the peer-session capability discovery needs

pub mod inbound;
pub mod outbound;

pub use inbound::AddressDiscoveryApi;
pub use outbound::{CandidateEvent, NegotiationError, PeerConnector, PeerSession};
