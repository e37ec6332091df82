use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "funcsize")]
#[command(about = "Find the largest functions in git repositories (JavaScript/TypeScript, Java, Python)")]
pub struct CliArgs {
    /// Git repository URLs or local paths to scan
    pub repositories: Vec<String>,

    /// File containing repository URLs/paths, one per line (# comments and
    /// blank lines ignored)
    #[arg(short = 'i', long)]
    pub input_file: Option<PathBuf>,

    /// Output file; format is inferred from the extension (overrides config)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Output format, if the extension should not decide
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of repositories scanned in parallel (overrides config)
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// How many of the largest functions to report per repository (overrides config)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub top: Option<u32>,

    /// Ignore functions smaller than this many lines (overrides config)
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub min_size: Option<u32>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
