//! Reusable UI widgets.

mod about_overlay;

pub use about_overlay::render_about_overlay;
