//! One-shot analysis of a collapsed stack file into display trees.
//!
//! Each analysis owns its reader and its trees; nothing is shared between
//! calls, so independent analyses can run on separate threads.

use super::builder::TreeBuilder;
use super::filter::{CompactClassifier, FilterPolicy};
use super::formatter::format_tree;
use super::tree::HotMethodTree;
use crate::parser::collapsed::{open_samples, Sample};
use crate::parser::schema::DisplayNode;
use crate::utils::error::ParseError;
use log::{debug, info};
use std::path::Path;

/// The three trees built from one input, one per filter policy
#[derive(Debug)]
pub struct PolicyTrees {
    pub identity: HotMethodTree,
    pub language: HotMethodTree,
    pub compacted: HotMethodTree,
}

impl PolicyTrees {
    pub fn get(&self, policy: FilterPolicy) -> &HotMethodTree {
        match policy {
            FilterPolicy::Identity => &self.identity,
            FilterPolicy::LanguageOnly => &self.language,
            FilterPolicy::Compacted => &self.compacted,
        }
    }

    /// Display trees for every policy
    pub fn format(&self) -> HotMethodReports {
        HotMethodReports {
            identity: format_tree(&self.identity),
            language: format_tree(&self.language),
            compacted: format_tree(&self.compacted),
        }
    }
}

/// The three display trees produced per input file
#[derive(Debug, Clone, PartialEq)]
pub struct HotMethodReports {
    pub identity: DisplayNode,
    pub language: DisplayNode,
    pub compacted: DisplayNode,
}

impl HotMethodReports {
    pub fn get(&self, policy: FilterPolicy) -> &DisplayNode {
        match policy {
            FilterPolicy::Identity => &self.identity,
            FilterPolicy::LanguageOnly => &self.language,
            FilterPolicy::Compacted => &self.compacted,
        }
    }

    /// Reports in artifact order
    pub fn iter(&self) -> impl Iterator<Item = (FilterPolicy, &DisplayNode)> {
        FilterPolicy::ALL
            .into_iter()
            .map(move |policy| (policy, self.get(policy)))
    }
}

impl IntoIterator for HotMethodReports {
    type Item = (FilterPolicy, DisplayNode);
    type IntoIter = std::array::IntoIter<(FilterPolicy, DisplayNode), 3>;

    /// Reports by value, in artifact order
    fn into_iter(self) -> Self::IntoIter {
        [
            (FilterPolicy::Identity, self.identity),
            (FilterPolicy::LanguageOnly, self.language),
            (FilterPolicy::Compacted, self.compacted),
        ]
        .into_iter()
    }
}

/// Build the tree for one policy
///
/// # Errors
/// The first error from `samples`, or `ParseError::CountOverflow` when the
/// counts do not fit in a `u64`; no tree is returned in either case.
pub fn build_tree<I, C>(
    samples: I,
    policy: FilterPolicy,
    classifier: &C,
) -> Result<HotMethodTree, ParseError>
where
    I: IntoIterator<Item = Result<Sample, ParseError>>,
    C: CompactClassifier + ?Sized,
{
    let mut builder = TreeBuilder::new();
    for sample in samples {
        let sample = sample?;
        let frames = policy.apply(&sample.frames, classifier);
        builder.insert(frames.as_slice(), sample.count)?;
    }
    Ok(builder.finish()?)
}

/// Build all three policy trees in a single pass over `samples`
///
/// # Errors
/// The first error from `samples` or the first count overflow; all three
/// trees are discarded.
pub fn build_trees<I, C>(samples: I, classifier: &C) -> Result<PolicyTrees, ParseError>
where
    I: IntoIterator<Item = Result<Sample, ParseError>>,
    C: CompactClassifier + ?Sized,
{
    let mut builders = FilterPolicy::ALL.map(|_| TreeBuilder::new());
    let mut sample_count = 0usize;

    for sample in samples {
        let sample = sample?;
        sample_count += 1;
        for (policy, builder) in FilterPolicy::ALL.iter().zip(builders.iter_mut()) {
            let frames = policy.apply(&sample.frames, classifier);
            builder.insert(frames.as_slice(), sample.count)?;
        }
    }

    debug!("Aggregated {} samples into {} trees", sample_count, builders.len());

    let [identity, language, compacted] = builders.map(TreeBuilder::finish);
    Ok(PolicyTrees {
        identity: identity?,
        language: language?,
        compacted: compacted?,
    })
}

/// Analyze a collapsed stack file under every policy
///
/// **Public** - main entry point for hosts
///
/// # Arguments
/// * `path` - Collapsed stack file
/// * `classifier` - Decides which classes the compacted policy folds
///
/// # Returns
/// One display tree per filter policy
///
/// # Errors
/// * `ParseError::Io` - file missing or unreadable
/// * `ParseError::MalformedLine` - first malformed line; no report is produced
pub fn produce_reports<C>(path: impl AsRef<Path>, classifier: &C) -> Result<HotMethodReports, ParseError>
where
    C: CompactClassifier + ?Sized,
{
    let path = path.as_ref();
    info!("Analyzing collapsed stacks: {}", path.display());

    let trees = build_trees(open_samples(path)?, classifier)?;
    Ok(trees.format())
}

/// Analyze a collapsed stack file under a single policy
pub fn analyze_file<C>(
    path: impl AsRef<Path>,
    policy: FilterPolicy,
    classifier: &C,
) -> Result<DisplayNode, ParseError>
where
    C: CompactClassifier + ?Sized,
{
    let path = path.as_ref();
    debug!("Analyzing {} with {} filter", path.display(), policy);

    let tree = build_tree(open_samples(path)?, policy, classifier)?;
    Ok(format_tree(&tree))
}
