//! SVG renderer for generating output from a laid-out drawing
//!
//! This module takes a [`Drawing`](crate::layout::Drawing) and produces an
//! SVG string with one group per layer.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::render_svg;
