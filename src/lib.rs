//! Hotmethod Studio
//!
//! Hot method trees and flamegraphs from collapsed stack-trace samples.
//!
//! A collapsed stack file is aggregated into three call trees, one per
//! frame filter (all frames, language frames only, compacted language
//! frames), and each tree is emitted as a value-sorted display tree.
//!
//! ## Getting Started
//!
//! ```bash
//! hotmethod analyze --input cpu.collapsed --summary
//! ```
//!
//! From code:
//!
//! ```ignore
//! use hotmethod_studio::aggregator::{produce_reports, PrefixClassifier};
//!
//! let reports = produce_reports("cpu.collapsed", &PrefixClassifier::default())?;
//! println!("{} samples", reports.identity.value);
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod utils;
