//! Scoring domain: policy, computation and sample statistics.

pub mod policy;
pub mod scoring;
pub mod stats;
