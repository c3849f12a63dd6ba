//! Flamegraph generation using the inferno library.
//!
//! This module renders collapsed stack files into interactive SVG flamegraphs,
//! next to the hot method reports produced from the same file.

pub mod generator;

// Re-export main types
pub use generator::{render_flamegraph, svg_path_for, FlamegraphConfig};
