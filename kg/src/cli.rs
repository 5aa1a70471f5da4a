//! CLI argument parsing for kubegen

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kg")]
#[command(
    author,
    version,
    about = "Generate numbered blockscape-client manifests from blockscape-client.yaml",
    long_about = None
)]
pub struct Cli {
    /// Number of manifests to generate (indices 0..COUNT, negative generates none)
    #[arg(value_name = "COUNT", allow_negative_numbers = true)]
    pub count: i64,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Worker threads (default: 1, sequential)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Only print the summary line
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Passes to run for COUNT; a negative count runs none
    pub fn passes(&self) -> usize {
        if self.count <= 0 {
            0
        } else {
            usize::try_from(self.count).unwrap_or(usize::MAX)
        }
    }
}
