//! Aggregation of collapsed stack samples into hot method trees.
//!
//! This module transforms parsed samples into:
//! - Filtered stacks (identity, language-only, compacted)
//! - Hot method trees with self/total sample counts
//! - Sorted display trees ready for serialization
//! - Hot method rankings

pub mod builder;
pub mod filter;
pub mod formatter;
pub mod metrics;
pub mod report;
pub mod tree;

// Re-export main types and functions
pub use builder::TreeBuilder;
pub use filter::{CompactClassifier, FilterPolicy, PrefixClassifier};
pub use formatter::{format_tree, format_tree_with_label};
pub use metrics::{calculate_hot_methods, calculate_tree_stats, HotMethod, TreeStats};
pub use report::{analyze_file, build_tree, build_trees, produce_reports, HotMethodReports, PolicyTrees};
pub use tree::{HotMethodTree, TreeNode};
