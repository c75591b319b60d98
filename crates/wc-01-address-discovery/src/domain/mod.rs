//! # Domain Layer
//!
//! Candidate parsing, the retained-address set and configuration. No I/O.

pub mod candidate;
pub mod config;
pub mod errors;

pub use candidate::{
    candidate_priority, format_candidate, reflexive_address, CandidateDescriptor, CandidateSet,
    CandidateType, ReflexiveAddress, REFLEXIVE_MARKER,
};
pub use config::{DiscoveryConfig, RendezvousServer, DEFAULT_RENDEZVOUS, DEFAULT_STUN_PORT};
pub use errors::{ConfigError, DiscoveryError};
