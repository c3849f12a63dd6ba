//! Validate command implementation.
//!
//! Re-reads a written report and checks the display tree it carries:
//! counts never grow towards the leaves and siblings are hottest first.

use crate::aggregator::FilterPolicy;
use crate::output::read_report;
use crate::parser::schema::DisplayNode;
use crate::utils::config::ROOT_LABEL;
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// What a valid report contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCheck {
    pub policy: FilterPolicy,
    pub version: String,
    pub root_value: u64,
    /// Nodes, root included
    pub node_count: usize,
    pub depth: usize,
}

/// Validate a report JSON file
///
/// # Errors
/// Unreadable file, invalid JSON, a failed envelope, or a broken tree invariant
pub fn validate_report_file(path: impl AsRef<Path>) -> Result<ReportCheck> {
    let path = path.as_ref();
    let report = read_report(path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;

    if !report.is_success() {
        anyhow::bail!(
            "Report carries failure status {}: {}",
            report.status,
            report.message
        );
    }

    if report.data.name != ROOT_LABEL {
        anyhow::bail!(
            "Root node is labelled {:?}, expected {:?}",
            report.data.name,
            ROOT_LABEL
        );
    }

    check_display_tree(&report.data)?;
    debug!("Report {} passed all checks", path.display());

    Ok(ReportCheck {
        policy: report.policy,
        version: report.version,
        root_value: report.data.value,
        node_count: report.data.node_count(),
        depth: report.data.depth(),
    })
}

/// Check that every node's value covers its children and that children are
/// sorted by non-increasing value
pub fn check_display_tree(root: &DisplayNode) -> Result<()> {
    let mut pending = vec![(root, 0usize)];

    while let Some((node, depth)) = pending.pop() {
        let children_total = node
            .children
            .iter()
            .try_fold(0u64, |sum, c| sum.checked_add(c.value));
        match children_total {
            Some(total) if total <= node.value => {}
            Some(total) => anyhow::bail!(
                "Node {} at depth {} has value {} but its children sum to {}",
                node.name,
                depth,
                node.value,
                total
            ),
            None => anyhow::bail!(
                "Children of {} at depth {} overflow a 64-bit count",
                node.name,
                depth
            ),
        }

        if let Some(pair) = node.children.windows(2).find(|w| w[0].value < w[1].value) {
            anyhow::bail!(
                "Children of {} at depth {} are out of order: {} ({}) before {} ({})",
                node.name,
                depth,
                pair[0].name,
                pair[0].value,
                pair[1].name,
                pair[1].value
            );
        }

        pending.extend(node.children.iter().map(|c| (c, depth + 1)));
    }

    Ok(())
}
