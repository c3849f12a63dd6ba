//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod validate;

// Re-export main command functions
pub use analyze::{build_classifier, execute_analyze, validate_args, AnalyzeArgs, AnalyzeOutcome};
pub use validate::{check_display_tree, validate_report_file, ReportCheck};
