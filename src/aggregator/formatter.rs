//! Conversion of a built hot method tree into its display tree.

use super::tree::{HotMethodTree, TreeNode};
use crate::parser::schema::DisplayNode;
use crate::utils::config::ROOT_LABEL;

/// Format a tree under the standard root label
pub fn format_tree(tree: &HotMethodTree) -> DisplayNode {
    format_tree_with_label(tree, ROOT_LABEL)
}

/// Format a tree, naming the root `root_label`
///
/// Every node is emitted; nothing is pruned. Children are ordered by
/// descending total count, ties by first discovery, so formatting the same
/// tree twice gives identical output.
pub fn format_tree_with_label(tree: &HotMethodTree, root_label: &str) -> DisplayNode {
    let mut root = DisplayNode::new(root_label, tree.total_count());
    let mut stack = vec![PendingDisplay::new(tree.root())];

    // A node is emitted once all of its children have been built
    while let Some(top) = stack.last_mut() {
        if let Some(child) = top.remaining.next() {
            stack.push(PendingDisplay::new(child));
            continue;
        }

        let node = top.node;
        let children = std::mem::take(&mut top.built);
        stack.pop();

        match stack.last_mut() {
            Some(parent) => parent.built.push(DisplayNode {
                name: node.frame().to_string(),
                value: node.total_count(),
                children,
            }),
            None => root.children = children,
        }
    }

    root
}

struct PendingDisplay<'a> {
    node: &'a TreeNode,
    remaining: std::vec::IntoIter<&'a TreeNode>,
    built: Vec<DisplayNode>,
}

impl<'a> PendingDisplay<'a> {
    fn new(node: &'a TreeNode) -> Self {
        let remaining = node.sorted_children().into_iter();
        Self {
            node,
            built: Vec::with_capacity(remaining.len()),
            remaining,
        }
    }
}
