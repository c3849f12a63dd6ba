//! The hot method tree: sample counts aggregated along shared call prefixes.
//!
//! A path from the root spells a stack prefix. Each node records
//! - `self_count`: samples whose (filtered) stack ends exactly here
//! - `total_count`: `self_count` plus the totals of all children
//!
//! Trees are produced by [`TreeBuilder`](super::builder::TreeBuilder) and are
//! immutable afterwards; totals are always populated.
//!
//! A single collapsed line can be thousands of frames deep, so every walk
//! over a tree (totals, dropping) uses an explicit stack instead of recursion.

use crate::utils::error::CountOverflow;
use std::cmp::Reverse;
use std::collections::hash_map;
use std::collections::HashMap;

/// A node of a hot method tree, exclusively owned by its parent
#[derive(Debug)]
pub struct TreeNode {
    frame: String,
    self_count: u64,
    total_count: u64,
    /// Position among siblings when first created; breaks sort ties
    discovery: usize,
    children: HashMap<String, TreeNode>,
}

impl TreeNode {
    pub(crate) fn new(frame: impl Into<String>, discovery: usize) -> Self {
        Self {
            frame: frame.into(),
            self_count: 0,
            total_count: 0,
            discovery,
            children: HashMap::new(),
        }
    }

    /// Frame identifier (empty for the root)
    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn self_count(&self) -> u64 {
        self.self_count
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Order in which this node was discovered among its siblings
    pub fn discovery(&self) -> usize {
        self.discovery
    }

    pub fn child(&self, frame: &str) -> Option<&TreeNode> {
        self.children.get(frame)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Children by descending total count, ties by discovery order
    pub fn sorted_children(&self) -> Vec<&TreeNode> {
        let mut children: Vec<&TreeNode> = self.children.values().collect();
        children.sort_by_key(|c| (Reverse(c.total_count), c.discovery));
        children
    }

    pub(crate) fn add_self_count(&mut self, count: u64) -> Result<(), CountOverflow> {
        self.self_count = self
            .self_count
            .checked_add(count)
            .ok_or(CountOverflow {
                total: self.self_count,
                count,
            })?;
        Ok(())
    }

    /// Child for `frame`, created on first sight
    pub(crate) fn child_entry(&mut self, frame: &str) -> &mut TreeNode {
        let discovery = self.children.len();
        self.children
            .entry(frame.to_string())
            .or_insert_with(|| TreeNode::new(frame, discovery))
    }

    /// Post-order pass filling `total_count` for this subtree
    ///
    /// Each child map is detached while its subtree is summed and re-attached
    /// once the child's total is known. On overflow the subtree is discarded.
    pub(crate) fn compute_totals(&mut self) -> Result<u64, CountOverflow> {
        let root = std::mem::replace(self, TreeNode::new("", 0));
        let mut stack = vec![PendingTotal::open(String::new(), root)];

        while let Some(top) = stack.last_mut() {
            if let Some((key, child)) = top.remaining.next() {
                stack.push(PendingTotal::open(key, child));
                continue;
            }

            let Some(PendingTotal { key, node, .. }) = stack.pop() else {
                break;
            };
            match stack.last_mut() {
                Some(parent) => {
                    let sum = parent.node.total_count.checked_add(node.total_count);
                    parent.node.total_count = sum.ok_or(CountOverflow {
                        total: parent.node.total_count,
                        count: node.total_count,
                    })?;
                    parent.node.children.insert(key, node);
                }
                None => *self = node,
            }
        }

        Ok(self.total_count)
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending: Vec<TreeNode> = self.children.drain().map(|(_, child)| child).collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain().map(|(_, child)| child));
        }
    }
}

/// A node whose children are still being summed
struct PendingTotal {
    key: String,
    node: TreeNode,
    remaining: hash_map::IntoIter<String, TreeNode>,
}

impl PendingTotal {
    fn open(key: String, mut node: TreeNode) -> Self {
        let remaining = std::mem::take(&mut node.children).into_iter();
        node.total_count = node.self_count;
        Self {
            key,
            node,
            remaining,
        }
    }
}

/// A fully built hot method tree
#[derive(Debug)]
pub struct HotMethodTree {
    root: TreeNode,
    samples_inserted: usize,
    samples_dropped: usize,
}

impl HotMethodTree {
    pub(crate) fn new(root: TreeNode, samples_inserted: usize, samples_dropped: usize) -> Self {
        Self {
            root,
            samples_inserted,
            samples_dropped,
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Sum of the counts of every sample inserted
    pub fn total_count(&self) -> u64 {
        self.root.total_count
    }

    /// True when no sample survived filtering
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    /// Samples that reached the tree
    pub fn samples_inserted(&self) -> usize {
        self.samples_inserted
    }

    /// Samples whose filtered stack was empty
    pub fn samples_dropped(&self) -> usize {
        self.samples_dropped
    }

    /// Walk down from the root following `path`
    pub fn find(&self, path: &[&str]) -> Option<&TreeNode> {
        path.iter()
            .try_fold(&self.root, |node, frame| node.child(frame))
    }

    /// Every node, depth first, root included
    pub fn nodes(&self) -> Vec<&TreeNode> {
        let mut nodes = Vec::new();
        let mut pending = vec![&self.root];
        while let Some(node) = pending.pop() {
            nodes.push(node);
            pending.extend(node.children.values());
        }
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Sum of self counts over the whole tree; equals `total_count()`
    pub fn self_count_sum(&self) -> u64 {
        self.nodes().iter().map(|n| n.self_count).sum()
    }
}
