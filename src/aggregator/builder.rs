//! Insertion of filtered samples into a hot method tree.
//!
//! Inserting walks down from the root, creating one child per unseen frame,
//! and adds the sample count to the terminal node's self count only.
//! Totals are filled in once by `finish`, bottom-up, so an insert costs
//! O(depth) with no propagation back up the path.
//!
//! The builder keeps a checked running total of every inserted count. Since
//! no node total can exceed it, an insert that would overflow `u64` is
//! refused before it touches the tree.

use super::tree::{HotMethodTree, TreeNode};
use crate::utils::error::CountOverflow;
use log::debug;

/// Accumulates samples for one tree; consumed by [`TreeBuilder::finish`]
#[derive(Debug)]
pub struct TreeBuilder {
    root: TreeNode,
    total_count: u64,
    samples_inserted: usize,
    samples_dropped: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            root: TreeNode::new("", 0),
            total_count: 0,
            samples_inserted: 0,
            samples_dropped: 0,
        }
    }

    /// Add `count` samples of `stack` (outermost frame first)
    ///
    /// An empty stack contributes nothing; it only bumps the dropped counter.
    ///
    /// # Errors
    /// `CountOverflow` when the sum of all inserted counts would exceed
    /// `u64::MAX`; the tree is left unchanged.
    pub fn insert<S: AsRef<str>>(&mut self, stack: &[S], count: u64) -> Result<(), CountOverflow> {
        if stack.is_empty() {
            self.samples_dropped += 1;
            return Ok(());
        }

        let total = self.total_count.checked_add(count).ok_or(CountOverflow {
            total: self.total_count,
            count,
        })?;

        let mut node = &mut self.root;
        for frame in stack {
            node = node.child_entry(frame.as_ref());
        }
        node.add_self_count(count)?;
        self.total_count = total;
        self.samples_inserted += 1;
        Ok(())
    }

    /// Compute totals and freeze the tree
    pub fn finish(mut self) -> Result<HotMethodTree, CountOverflow> {
        let total = self.root.compute_totals()?;
        debug!(
            "Finished hot method tree: {} samples inserted, {} dropped, total count {}",
            self.samples_inserted, self.samples_dropped, total
        );
        Ok(HotMethodTree::new(
            self.root,
            self.samples_inserted,
            self.samples_dropped,
        ))
    }
}
