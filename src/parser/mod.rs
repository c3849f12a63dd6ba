//! Collapsed stack parsing and report schema definitions.
//!
//! This module handles:
//! - Reading collapsed stack files into samples
//! - Rejecting malformed lines with their line number
//! - Defining output schema

pub mod collapsed;
pub mod schema;

// Re-export main types
pub use collapsed::{open_samples, parse_line, read_samples, Sample, SampleReader};
pub use schema::{DisplayNode, ReportEnvelope};
