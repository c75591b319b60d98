//! # wifi-check Test Suite
//!
//! Cross-crate flows that unit tests cannot cover on their own: the real
//! probe API on an ephemeral loopback port, driven by the collectors, the
//! native STUN connector and the panel runner.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Probe API fixture + fixed geo provider
//! └── integration/
//!     ├── collectors.rs # wc-02 collectors -> wc-04 routes
//!     ├── discovery.rs  # wc-01 native STUN connector on loopback
//!     ├── scoring.rs    # score endpoint contract
//!     └── panel.rs      # full diagnostic run
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wc-tests
//! cargo test -p wc-tests integration::discovery::
//!
//! # Benchmarks
//! cargo bench -p wc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
#[cfg(test)]
pub mod support;
