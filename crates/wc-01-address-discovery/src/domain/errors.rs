//! Discovery error types.

use thiserror::Error;

/// Why a discovery call produced no address.
///
/// `Unsupported` and `BlockedOrUnavailable` are ordinary outcomes on
/// restrictive hosts and networks, not faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The runtime cannot negotiate peer sessions at all.
    #[error("peer negotiation is not supported in this environment")]
    Unsupported,

    /// The session could not be opened or the local offer failed.
    #[error("failed to create the negotiation offer: {0}")]
    OfferFailed(String),

    /// Negotiation finished without a server reflexive candidate.
    #[error("could not obtain the public address via STUN (it may be blocked)")]
    BlockedOrUnavailable,

    /// The discovery task was aborted before it resolved.
    #[error("discovery was cancelled")]
    Cancelled,
}

/// Rejected discovery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid rendezvous server: {0:?}")]
    InvalidServer(String),

    #[error("discovery timeout must be greater than zero")]
    ZeroTimeout,

    #[error("retransmission timeout must be greater than zero")]
    ZeroRetransmissionTimeout,

    #[error("at least one binding request must be sent")]
    NoTransmissions,
}
