use clap::{Args as ClapArgs, Parser, Subcommand};
use ir::Severity;
use regex::Regex;
use std::path::PathBuf;

use crate::output::{FlowFormat, Format, SummaryFormat};

fn parse_severity(s: &str) -> Result<Severity, String> {
    s.parse()
}

fn parse_positive(s: &str) -> Result<usize, String> {
    let v: usize = s
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if v == 0 {
        Err("value must be greater than 0".into())
    } else {
        Ok(v)
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "taintmap - security risk heatmaps and taint-flow graphs from pattern matching",
    long_about = "taintmap scans source files with a catalog of weighted risk patterns (sources, sinks, transforms and generic smells), links the hits into a heuristic data-flow graph and aggregates the weights into per-file and per-directory risk scores.

Examples:
  taintmap scan src/                    # Issues from built-in rules and patterns
  taintmap heatmap . --top 10           # Rank the riskiest files and directories
  taintmap flow src/api.js --format dot # Source-to-sink graph of one file
  taintmap quick src/api.js             # Single-file quick check
  taintmap patterns list                # Show the pattern catalog",
    subcommand_required = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Show version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress logs
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report issues from built-in rules and pattern hits
    Scan(ScanArgs),
    /// Rank files and directories of a workspace by risk
    Heatmap(HeatmapArgs),
    /// Show the data-flow graph of a file
    Flow(FlowArgs),
    /// Quick risk check of a single file
    Quick(QuickArgs),
    /// Inspect and validate pattern catalogs
    #[command(subcommand, alias = "pattern")]
    Patterns(PatternsCmd),
}

#[derive(ClapArgs, Default)]
pub struct CatalogArgs {
    /// Extra pattern file or directory (JSON or YAML), repeatable
    #[arg(long = "patterns")]
    pub patterns: Vec<PathBuf>,
}

#[derive(ClapArgs, Default)]
pub struct WalkArgs {
    /// Exclude files matching these glob patterns
    #[arg(long, value_parser = crate::parse_exclude, value_delimiter = ',')]
    pub exclude: Vec<Regex>,
    /// Don't use default exclusion patterns
    #[arg(long)]
    pub no_default_exclude: bool,
    /// Maximum file size to analyze (in bytes), 0 for no limit
    #[arg(long)]
    pub max_file_size: Option<u64>,
}

#[derive(ClapArgs)]
pub struct ScanArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,
    /// Output format for scan results
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// Exit with error code if issues of this severity or higher are found
    #[arg(long = "fail-on", value_parser = parse_severity)]
    pub fail_on: Option<Severity>,
    #[command(flatten)]
    pub walk: WalkArgs,
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(ClapArgs)]
pub struct HeatmapArgs {
    /// Workspace root
    pub path: PathBuf,
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    pub format: SummaryFormat,
    /// Worker threads, 1 analyzes files one by one
    #[arg(long, value_parser = parse_positive)]
    pub threads: Option<usize>,
    /// Skip files whose analysis takes longer than this (milliseconds)
    #[arg(long)]
    pub timeout_file_ms: Option<u64>,
    /// Stop the sweep after this many milliseconds and report partial results
    #[arg(long)]
    pub deadline_ms: Option<u64>,
    /// Number of files listed in text output
    #[arg(long, value_parser = parse_positive)]
    pub top: Option<usize>,
    #[command(flatten)]
    pub walk: WalkArgs,
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(ClapArgs)]
pub struct FlowArgs {
    /// File to analyze
    pub file: PathBuf,
    /// Keep only matches on lines mentioning this identifier
    #[arg(long)]
    pub var: Option<String>,
    #[arg(long, value_enum, default_value_t = FlowFormat::Text)]
    pub format: FlowFormat,
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(ClapArgs)]
pub struct QuickArgs {
    /// File to check
    pub file: PathBuf,
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    pub format: SummaryFormat,
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Subcommand)]
pub enum PatternsCmd {
    /// List the loaded patterns
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Validate a pattern file or directory
    Verify {
        /// Path to the pattern file or directory
        path: PathBuf,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
