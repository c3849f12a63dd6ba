//! Frame selection policies applied to each stack before tree insertion.
//!
//! Three policies exist and every analysis runs all of them:
//! - `Identity`: the stack as sampled
//! - `LanguageOnly`: only language frames (those containing `//`)
//! - `Compacted`: language frames, with each run of consecutive
//!   compactable-class frames folded to its first frame
//!
//! Which classes are compactable is decided by the host through a
//! [`CompactClassifier`]; nothing here knows any class naming rules.

use crate::utils::config::{
    COMPACT_HOT_METHOD_FILE, DEFAULT_COMPACT_CLASS_FRAGMENTS, DEFAULT_COMPACT_CLASS_PREFIXES,
    HOT_METHOD_FILE, LANGUAGE_FRAME_MARKER, LANGUAGE_HOT_METHOD_FILE,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decides whether frames of a class are folded by the compacted policy
pub trait CompactClassifier {
    fn is_compactable(&self, class_name: &str) -> bool;
}

impl<F> CompactClassifier for F
where
    F: Fn(&str) -> bool,
{
    fn is_compactable(&self, class_name: &str) -> bool {
        self(class_name)
    }
}

/// Classifier matching class names by prefix or by contained fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixClassifier {
    prefixes: Vec<String>,
    fragments: Vec<String>,
}

impl PrefixClassifier {
    /// Classifier matching only the given prefixes
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            fragments: Vec::new(),
        }
    }

    /// Also match class names containing any of `fragments`
    pub fn with_fragments<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fragments = fragments.into_iter().map(Into::into).collect();
        self
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for PrefixClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_COMPACT_CLASS_PREFIXES.iter().copied())
            .with_fragments(DEFAULT_COMPACT_CLASS_FRAGMENTS.iter().copied())
    }
}

impl CompactClassifier for PrefixClassifier {
    fn is_compactable(&self, class_name: &str) -> bool {
        self.prefixes.iter().any(|p| class_name.starts_with(p.as_str()))
            || self.fragments.iter().any(|f| class_name.contains(f.as_str()))
    }
}

/// The frame filter a hot method tree is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPolicy {
    Identity,
    LanguageOnly,
    Compacted,
}

impl FilterPolicy {
    /// Every policy, in artifact order
    pub const ALL: [FilterPolicy; 3] = [
        FilterPolicy::Identity,
        FilterPolicy::LanguageOnly,
        FilterPolicy::Compacted,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterPolicy::Identity => "identity",
            FilterPolicy::LanguageOnly => "language-only",
            FilterPolicy::Compacted => "compacted",
        }
    }

    /// File name of the JSON artifact produced for this policy
    pub fn artifact_name(self) -> &'static str {
        match self {
            FilterPolicy::Identity => HOT_METHOD_FILE,
            FilterPolicy::LanguageOnly => LANGUAGE_HOT_METHOD_FILE,
            FilterPolicy::Compacted => COMPACT_HOT_METHOD_FILE,
        }
    }

    /// Map a sampled stack to the frames this policy keeps, order preserved
    ///
    /// The classifier is only consulted by `Compacted`.
    pub fn apply<'a, C>(self, stack: &'a [String], classifier: &C) -> Vec<&'a str>
    where
        C: CompactClassifier + ?Sized,
    {
        match self {
            FilterPolicy::Identity => stack.iter().map(String::as_str).collect(),
            FilterPolicy::LanguageOnly => language_frames(stack),
            FilterPolicy::Compacted => compact_frames(stack, classifier),
        }
    }
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a frame comes from the managed runtime rather than native code
pub fn is_language_frame(frame: &str) -> bool {
    frame.contains(LANGUAGE_FRAME_MARKER)
}

/// Class name of a language frame: everything before the first marker
pub fn class_name(frame: &str) -> Option<&str> {
    frame
        .split_once(LANGUAGE_FRAME_MARKER)
        .map(|(class, _)| class)
}

/// Keep only language frames
pub fn language_frames(stack: &[String]) -> Vec<&str> {
    stack
        .iter()
        .map(String::as_str)
        .filter(|frame| is_language_frame(frame))
        .collect()
}

/// Keep language frames, dropping every compactable frame that directly
/// follows another compactable frame
///
/// Native frames are skipped before the run check, so they never break a
/// compactable run.
pub fn compact_frames<'a, C>(stack: &'a [String], classifier: &C) -> Vec<&'a str>
where
    C: CompactClassifier + ?Sized,
{
    let mut result = Vec::with_capacity(stack.len() / 2);
    let mut previous_compactable = false;

    for frame in stack {
        let Some(class) = class_name(frame) else {
            continue;
        };

        let compactable = classifier.is_compactable(class);
        if !compactable || !previous_compactable {
            result.push(frame.as_str());
        }
        previous_compactable = compactable;
    }

    result
}
