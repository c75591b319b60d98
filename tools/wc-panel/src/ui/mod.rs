//! UI module - TUI rendering components.
//!
//! - `layout.rs`: header, section grid and footer
//! - `sections.rs`: one renderer per collector
//! - `widgets/`: overlays

mod layout;
mod sections;

pub mod widgets;

pub use layout::render;
