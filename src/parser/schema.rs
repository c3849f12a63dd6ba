//! Output JSON schema definitions for hot method reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::aggregator::filter::FilterPolicy;
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// One node of a display tree
///
/// `value` is the total sample count of the subtree. Children are ordered by
/// descending value, ties in the order the frames were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNode {
    /// Frame identifier, or the root label
    pub name: String,

    /// Total samples at or below this node
    pub value: u64,

    /// Callees, hottest first
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    /// Length of the longest root-to-leaf path, counted in edges
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut pending = vec![(self, 0usize)];
        while let Some((node, depth)) = pending.pop() {
            max_depth = max_depth.max(depth);
            pending.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        max_depth
    }
}

impl Drop for DisplayNode {
    fn drop(&mut self) {
        // Flatten instead of recursing; reports can be arbitrarily deep
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Top-level structure of every hot method artifact written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope {
    /// 0 on success
    pub status: i32,

    /// Empty on success
    pub message: String,

    /// Schema version for compatibility checking
    pub version: String,

    /// Frame filter the tree was built with
    pub policy: FilterPolicy,

    /// Timestamp when the report was generated (RFC 3339)
    pub generated_at: String,

    /// The display tree
    pub data: DisplayNode,
}

impl ReportEnvelope {
    /// Wrap a display tree in a success envelope stamped with the current time
    pub fn success(policy: FilterPolicy, data: DisplayNode) -> Self {
        Self {
            status: 0,
            message: String::new(),
            version: SCHEMA_VERSION.to_string(),
            policy,
            generated_at: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}
