//! Hotmethod Studio CLI
//!
//! Turns collapsed stack-trace samples into hot method reports
//! and flamegraphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use hotmethod_studio::commands::{execute_analyze, validate_args, validate_report_file, AnalyzeArgs};
use hotmethod_studio::flamegraph::FlamegraphConfig;
use hotmethod_studio::utils::config::{COMPACT_PREFIXES_ENV, SCHEMA_VERSION};

/// Hotmethod Studio - hot method reports from collapsed stacks
#[derive(Parser, Debug)]
#[command(name = "hotmethod")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a collapsed stack file
    Analyze {
        /// Collapsed stack file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the reports (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Class name prefix whose consecutive frames are compacted (repeatable)
        #[arg(long = "compact-prefix", env = COMPACT_PREFIXES_ENV, value_delimiter = ',')]
        compact_prefixes: Vec<String>,

        /// Also render an SVG flamegraph next to the reports
        #[arg(long)]
        flamegraph: bool,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long)]
        width: Option<usize>,

        /// Unit of the sample counts shown in the flamegraph (e.g. "ms" for wall-clock profiles)
        #[arg(long)]
        count_name: Option<String>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Number of hot methods in the summary
        #[arg(long, default_value = "20")]
        top_methods: usize,
    },

    /// Validate a hot method report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            compact_prefixes,
            flamegraph,
            title,
            width,
            count_name,
            summary,
            top_methods,
        } => {
            let flamegraph_config = if flamegraph {
                let mut config = FlamegraphConfig::new();
                if let Some(title) = title {
                    config = config.with_title(title);
                }
                if let Some(width) = width {
                    config = config.with_width(width);
                }
                if let Some(count_name) = count_name {
                    config = config.with_count_name(count_name);
                }
                Some(config)
            } else {
                None
            };

            let args = AnalyzeArgs {
                input,
                output_dir,
                compact_prefixes,
                flamegraph_config,
                print_summary: summary,
                top_methods,
            };

            validate_args(&args)?;
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a report JSON file
fn validate_report(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let check = validate_report_file(&file_path)?;

    println!("✓ Valid hot method report");
    println!("  Version: {}", check.version);
    println!("  Policy:  {}", check.policy);
    println!("  Samples: {}", check.root_value);
    println!("  Nodes:   {}", check.node_count);
    println!("  Depth:   {}", check.depth);

    Ok(())
}

/// Display schema information
fn display_schema(show_details: bool) {
    println!("Hotmethod Studio Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  status: number        - 0 on success");
        println!("  message: string       - Empty on success");
        println!("  version: string       - Schema version (e.g., '1.0.0')");
        println!("  policy: string        - identity | language-only | compacted");
        println!("  generated_at: string  - ISO 8601 timestamp");
        println!("  data: node            - Display tree root");
        println!("    name: string        - Frame identifier ('root' at the top)");
        println!("    value: number       - Samples at or below this frame");
        println!("    children: node[]    - Callees, hottest first");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
fn display_version() {
    println!("Hotmethod Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Hot method trees and flamegraphs from collapsed stack samples.");
}
