//! Domain models for the panel.

mod app;
mod snapshot;

pub use app::{App, AppState};
pub use snapshot::{format_ms, PanelSnapshot, Signal, Stage};
