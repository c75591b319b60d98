//! Adapters for the probe API.
//!
//! Implementations of the outbound ports against real services.

pub mod ipapi;

pub use ipapi::IpApiProvider;
