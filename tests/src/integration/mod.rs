//! End-to-end flows across the workspace crates.

pub mod collectors;
pub mod discovery;
pub mod panel;
pub mod scoring;
