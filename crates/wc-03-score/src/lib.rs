//! # WC-03 Score
//!
//! Pure aggregation of collected signals into a heuristic security score.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): no I/O
//!   - `ScoringPolicy`: penalties and thresholds, validated
//!   - `compute_score`: signals in, [`ScoreResult`](shared_types::ScoreResult) out
//!   - `LatencyStats`: average/min/max over a sample run
//!
//! ## Rules
//!
//! Start at 100 and subtract one penalty per risk factor:
//!
//! | Factor | Penalty |
//! |---|---|
//! | transport not secure | 40 |
//! | average latency above 800 ms | 20 |
//! | otherwise above 300 ms | 10 |
//! | any proxy header | 15 |
//! | discovered address absent from the client address header | 10 |
//!
//! The result is clamped to `0..=100` and banded at 80/60/40.
//!
//! ## Usage Example
//!
//! ```
//! use shared_types::{ScoreRequest, SeverityLevel};
//! use wc_03_score::compute_score;
//!
//! let result = compute_score(&ScoreRequest::default());
//! assert_eq!(result.score, 60);
//! assert_eq!(result.level, SeverityLevel::Ok);
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;

pub use domain::policy::{PolicyError, ScoringPolicy};
pub use domain::scoring::compute_score;
pub use domain::stats::LatencyStats;
