//! The command-line surface (spec.md §6): a single flat command with no
//! subcommands -- there is only one thing this tool does, so the
//! `Commands`/`Subcommand` split a multi-command driver would use doesn't
//! apply here.

use std::path::PathBuf;

use clap::Parser;

/// Finds likely dynamic-memory defects in C++ class members.
#[derive(Parser, Debug)]
#[command(name = "leakcheck")]
#[command(author = "leakcheck maintainers")]
#[command(version = concat!("version ", env!("CARGO_PKG_VERSION")))]
#[command(about = "Static analysis for dynamic-memory defects in C++ classes", long_about = None)]
pub struct Cli {
    /// Files or directories to scan.
    pub paths: Vec<PathBuf>,

    /// Comma-separated directory names to prune from the scan.
    #[arg(long, value_name = "CSV")]
    pub exclude: Option<String>,

    /// Emit the structured (JSON) report instead of the human one.
    #[arg(long)]
    pub json: bool,

    /// Log each file as it is scanned.
    #[arg(short, long)]
    pub verbose: bool,
}
