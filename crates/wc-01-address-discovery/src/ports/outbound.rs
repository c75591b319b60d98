//! # Driven Ports (Outbound SPI)
//!
//! The peer-session capability discovery drives. The host supplies a
//! concrete connector; the crate ships a native STUN one behind the
//! `network` feature.

use crate::domain::DiscoveryConfig;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One candidate-gathering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateEvent {
    /// A candidate descriptor line. An empty line also ends gathering.
    Candidate(String),
    /// Gathering is complete.
    EndOfCandidates,
}

/// Opens peer sessions against a rendezvous server.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single connector is shared by
/// every discovery call.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Whether this runtime can negotiate peer sessions at all.
    fn is_available(&self) -> bool;

    /// Open a session configured with exactly one rendezvous server,
    /// `config.server`. Retransmission settings come from the same config.
    async fn open(&self, config: &DiscoveryConfig)
        -> Result<Box<dyn PeerSession>, NegotiationError>;
}

/// A transient peer session, used only to gather candidates.
///
/// Dropping a session must release its resources even if [`close`] was never
/// called.
///
/// [`close`]: PeerSession::close
#[async_trait]
pub trait PeerSession: Send {
    /// Create a data channel. Without one a session has nothing to negotiate
    /// and gathers no candidates.
    fn create_data_channel(&mut self, label: &str) -> Result<(), NegotiationError>;

    /// Create and apply the local offer, starting candidate gathering.
    ///
    /// Events arrive on the returned receiver; a closed receiver means the
    /// same as [`CandidateEvent::EndOfCandidates`].
    async fn create_offer(&mut self) -> Result<mpsc::Receiver<CandidateEvent>, NegotiationError>;

    /// Tear the session down. Idempotent.
    fn close(&mut self);
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    /// Local socket or transport could not be set up
    #[error("transport setup failed: {0}")]
    Transport(String),
    /// The session was already closed
    #[error("session already closed")]
    Closed,
    /// The offer could not be created
    #[error("offer creation failed: {0}")]
    Offer(String),
}
