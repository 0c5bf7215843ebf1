//! Terminal rendering.
//!
//! [`common`] draws the header, status bar and help overlay; [`dashboard`]
//! draws the sensor table and the attribute panel for the selected sensor.

pub mod common;
pub mod dashboard;
pub mod theme;

pub use theme::Theme;
