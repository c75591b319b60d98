//! # Shared Types Crate
//!
//! Payload shapes shared by the probe API and everything that talks to it.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every JSON body the backend emits or accepts
//!   is defined here, so the server and the collectors cannot drift apart.
//! - **camelCase on the wire**: field names follow the HTTP contract
//!   (`serverTime`, `receivedBytes`, `httpsSecure`, ...), Rust code keeps
//!   snake_case.
//! - **Lenient inbound decoding**: score requests come from arbitrary clients,
//!   so the [`lenient`] helpers coerce odd values instead of rejecting them.

pub mod api;
pub mod entities;
pub mod errors;
pub mod lenient;

pub use api::*;
pub use entities::*;
pub use errors::*;
