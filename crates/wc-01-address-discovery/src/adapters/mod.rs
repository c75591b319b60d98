//! # Adapters
//!
//! - `stun_codec`: RFC 5389 Binding Request/Response encoding
//! - `stun_connector`: `PeerConnector` over a tokio UDP socket

pub mod stun_codec;
pub mod stun_connector;

pub use stun_codec::{BindingResponse, StunError, TransactionId};
pub use stun_connector::{StunPeerConnector, StunPeerSession};
