//! SVG renderer for canvas frames
//!
//! This module takes a [`Frame`](crate::canvas::Frame) and produces an SVG
//! string with CSS classes and theme custom properties for styling. Widget
//! bodies come from a host-supplied [`BodyRenderer`].

pub mod body;
pub mod config;
pub mod svg;

pub use body::{BodyRenderer, DefaultBodyRenderer};
pub use config::SvgConfig;
pub use svg::{render_svg, SvgBuilder};
