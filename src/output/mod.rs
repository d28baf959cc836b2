//! Report rendering.
//!
//! - [`terminal`]: byte-stable histogram text and colored summaries
//! - [`json`]: structured experiment reports

pub mod json;
pub mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::{format_calibration, format_report, format_setup};
