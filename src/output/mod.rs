//! Output writers for hot method reports.
//!
//! This module handles writing data to disk and terminal:
//! - JSON report artifacts (one per filter policy)
//! - Text summaries

pub mod json;
pub mod summary;

// Re-export main functions
pub use json::{read_report, report_to_string, validate_path, write_display_tree, write_report};
pub use summary::generate_text_summary;
