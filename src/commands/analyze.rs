//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads the collapsed stack file
//! 2. Builds one hot method tree per filter policy
//! 3. Formats the trees into display trees
//! 4. Writes one JSON report per policy
//! 5. Optionally renders a flamegraph and prints a summary

use crate::aggregator::{
    build_trees, calculate_hot_methods, calculate_tree_stats, FilterPolicy, PrefixClassifier,
};
use crate::flamegraph::{render_flamegraph, svg_path_for, FlamegraphConfig};
use crate::output::{generate_text_summary, validate_path, write_report};
use crate::parser::collapsed::open_samples;
use crate::parser::schema::ReportEnvelope;
use crate::utils::config::{
    COLLAPSED_EXTENSION, DEFAULT_COMPACT_CLASS_FRAGMENTS, MAX_TOP_METHODS, STAGING_SUFFIX,
};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Collapsed stack file to analyze
    pub input: PathBuf,

    /// Directory for the reports (defaults to the input's directory)
    pub output_dir: Option<PathBuf>,

    /// Compactable class prefixes (defaults when empty)
    pub compact_prefixes: Vec<String>,

    /// Flamegraph configuration (no flamegraph when `None`)
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Number of hot methods in the summary
    pub top_methods: usize,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: None,
            compact_prefixes: Vec::new(),
            flamegraph_config: None,
            print_summary: false,
            top_methods: 20,
        }
    }
}

/// Files produced by one analyze run
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    /// Report path per policy, in artifact order
    pub reports: Vec<(FilterPolicy, PathBuf)>,

    /// Flamegraph path, if one was rendered
    pub flamegraph: Option<PathBuf>,
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// Reports are built fully in memory before the first file is written, so a
/// malformed input leaves no artifacts behind. Reports are then written under
/// staging names and renamed together, so a failed write leaves none either.
///
/// # Errors
/// * Unreadable or malformed input
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalyzeOutcome> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.input.display());

    let classifier = build_classifier(&args.compact_prefixes);
    debug!("Compactable class prefixes: {:?}", classifier.prefixes());

    // Step 1: Read and aggregate
    info!("Step 1/4: Building hot method trees...");
    let samples = open_samples(&args.input).context("Failed to open collapsed stacks")?;
    let trees = build_trees(samples, &classifier)
        .with_context(|| format!("Failed to analyze {}", args.input.display()))?;

    for policy in FilterPolicy::ALL {
        let tree = trees.get(policy);
        info!("{} tree: {}", policy, calculate_tree_stats(tree).summary());
        if tree.is_empty() {
            warn!("{} filter left no frames; its report has an empty root", policy);
        }
    }

    // Step 2: Format
    info!("Step 2/4: Formatting display trees...");
    let reports = trees.format();

    // Step 3: Write reports
    info!("Step 3/4: Writing reports...");
    let output_dir = resolve_output_dir(&args);
    let targets: Vec<(FilterPolicy, PathBuf)> = FilterPolicy::ALL
        .into_iter()
        .map(|policy| (policy, output_dir.join(policy.artifact_name())))
        .collect();

    for (_, path) in &targets {
        validate_path(path).context("Invalid report path")?;
    }

    // Stage every report first; the final names appear only once all are written
    let mut staged: Vec<PathBuf> = Vec::with_capacity(targets.len());
    for (policy, display) in reports {
        let staging = staging_path(&output_dir.join(policy.artifact_name()));
        let envelope = ReportEnvelope::success(policy, display);
        if let Err(e) = write_report(&envelope, &staging) {
            staged.push(staging);
            discard_staged(&staged);
            return Err(e).with_context(|| format!("Failed to write {} report", policy));
        }
        staged.push(staging);
    }

    for (staging, (policy, path)) in staged.iter().zip(&targets) {
        std::fs::rename(staging, path)
            .with_context(|| format!("Failed to move {} report into place", policy))?;
        info!("✓ {} report written to: {}", policy, path.display());
    }

    // Step 4: Flamegraph
    let flamegraph = match &args.flamegraph_config {
        Some(config) => {
            info!("Step 4/4: Rendering flamegraph...");
            let svg_path = svg_path_for(&args.input, &output_dir);
            render_flamegraph(&args.input, &svg_path, Some(config))
                .context("Failed to render flamegraph")?;
            Some(svg_path)
        }
        None => {
            info!("Step 4/4: Skipping flamegraph generation (not requested)");
            None
        }
    };

    if args.print_summary {
        let methods = calculate_hot_methods(&trees.language, args.top_methods);
        println!("\n{}", "=".repeat(80));
        println!("HOT METHOD SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Input:          {}", args.input.display());
        println!("All samples:    {}", trees.identity.total_count());
        println!("Language view:  {}", trees.language.total_count());
        println!("Compacted view: {}", trees.compacted.total_count());
        println!(
            "\n{}",
            generate_text_summary(&methods, trees.language.total_count(), "LANGUAGE HOT METHODS")
        );
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(AnalyzeOutcome {
        reports: targets,
        flamegraph,
    })
}

/// Classifier from configured prefixes, or the defaults when none are given
pub fn build_classifier(prefixes: &[String]) -> PrefixClassifier {
    if prefixes.is_empty() {
        PrefixClassifier::default()
    } else {
        PrefixClassifier::new(prefixes.iter().cloned())
            .with_fragments(DEFAULT_COMPACT_CLASS_FRAGMENTS.iter().copied())
    }
}

/// Temporary name a report is written under before it is moved into place
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(STAGING_SUFFIX);
    path.with_file_name(name)
}

fn discard_staged(staged: &[PathBuf]) {
    for path in staged.iter().filter(|p| p.is_file()) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Could not remove staged report {}: {}", path.display(), e);
        }
    }
}

fn resolve_output_dir(args: &AnalyzeArgs) -> PathBuf {
    match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    if !args.input.is_file() {
        anyhow::bail!("Input is not a file: {}", args.input.display());
    }

    if args.input.extension().map_or(true, |ext| ext != COLLAPSED_EXTENSION) {
        warn!(
            "Input does not have .{} extension: {}",
            COLLAPSED_EXTENSION,
            args.input.display()
        );
    }

    if args.top_methods == 0 {
        anyhow::bail!("top_methods must be greater than 0");
    }

    if args.top_methods > MAX_TOP_METHODS {
        anyhow::bail!("top_methods is too large (max {})", MAX_TOP_METHODS);
    }

    if args.compact_prefixes.iter().any(|p| p.trim().is_empty()) {
        anyhow::bail!("Compactable class prefixes cannot be empty");
    }

    Ok(())
}
