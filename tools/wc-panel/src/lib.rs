//! wc-panel: wifi-check diagnostic panel
//!
//! Runs the collectors one after another against a probe API and renders
//! what they found, either as a full-screen terminal UI or, with `--once`,
//! as a one-shot text or JSON report.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  WIFI-CHECK                                                     │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │  HTTPS / MITM                  │  PUBLIC IP (STUN)              │
//! │  LATENCY                       │  PROXIES / HEADERS             │
//! │  SECURITY SCORE                                [THROUGHPUT]     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The runner publishes an immutable [`PanelSnapshot`] after every collector
//! on a `tokio::sync::watch` channel; the render loop only ever reads the
//! latest one.

pub mod cli;
pub mod domain;
pub mod error;
pub mod report;
pub mod runner;
pub mod ui;

pub use cli::Args;
pub use domain::{App, AppState, PanelSnapshot, Signal, Stage};
pub use error::PanelError;
pub use runner::DiagnosticRunner;
