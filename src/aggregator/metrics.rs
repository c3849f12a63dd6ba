//! Hot method ranking and summary statistics for built trees.
//!
//! Hot methods are the frames where samples terminate most often.
//! These are the primary targets for optimization.

use super::tree::HotMethodTree;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// A frame ranked by the samples that ended in it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotMethod {
    /// Frame identifier
    pub frame: String,

    /// Self samples summed over every path the frame appears on
    pub self_count: u64,

    /// Percentage of the tree's total samples
    pub percentage: f64,
}

/// Rank frames by self count
///
/// # Arguments
/// * `tree` - Built hot method tree
/// * `top_n` - Number of methods to return
///
/// # Returns
/// Up to `top_n` methods with a non-zero self count, hottest first,
/// ties by frame name
pub fn calculate_hot_methods(tree: &HotMethodTree, top_n: usize) -> Vec<HotMethod> {
    let mut by_frame: HashMap<&str, u64> = HashMap::new();
    for node in tree.nodes() {
        if node.self_count() > 0 {
            *by_frame.entry(node.frame()).or_insert(0) += node.self_count();
        }
    }

    debug!(
        "Ranking top {} of {} frames with self samples",
        top_n,
        by_frame.len()
    );

    let total = tree.total_count();
    let mut ranked: Vec<(&str, u64)> = by_frame.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(frame, self_count)| HotMethod {
            frame: frame.to_string(),
            self_count,
            percentage: percentage_of(self_count, total),
        })
        .collect()
}

/// Shape statistics of a tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStats {
    /// Total sample count at the root
    pub total_count: u64,

    /// Nodes, root excluded
    pub node_count: usize,

    /// Nodes without children, root excluded
    pub leaf_count: usize,

    /// Samples that reached the tree
    pub samples_inserted: usize,

    /// Samples removed by the filter
    pub samples_dropped: usize,
}

impl TreeStats {
    pub fn summary(&self) -> String {
        format!(
            "{} samples over {} nodes ({} leaves), {} stacks kept, {} dropped",
            self.total_count,
            self.node_count,
            self.leaf_count,
            self.samples_inserted,
            self.samples_dropped
        )
    }
}

/// Collect shape statistics
pub fn calculate_tree_stats(tree: &HotMethodTree) -> TreeStats {
    let nodes = tree.nodes();
    TreeStats {
        total_count: tree.total_count(),
        node_count: nodes.len() - 1,
        leaf_count: nodes.iter().skip(1).filter(|n| n.is_leaf()).count(),
        samples_inserted: tree.samples_inserted(),
        samples_dropped: tree.samples_dropped(),
    }
}

fn percentage_of(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
