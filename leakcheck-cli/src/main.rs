//! leakcheck - static analysis front-end for dynamic-memory defects in C++
//! class members (spec.md §6).
//!
//! Wires the three core crates together: discover source files, parse each
//! one, merge the resulting class records, run the rule engine, and render
//! whichever report format was requested.

mod cli;
mod discover;
mod error;
mod report;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use error::{LeakcheckError, Result};
use leakcheck_analyze::{analyze, ClassRegistry};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .try_init();
}

/// Runs the pipeline, returning whether any leaks were found.
fn run(cli: &Cli) -> Result<bool> {
    if cli.paths.is_empty() {
        return Err(LeakcheckError::NoPaths);
    }

    let excludes: Vec<String> = cli
        .exclude
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let files = discover::discover(&cli.paths, &excludes)?;

    let mut registry = ClassRegistry::new();
    for file in &files {
        tracing::info!(file = %file.display(), "scanning");
        match std::fs::read_to_string(file) {
            Ok(source) => {
                let classes = leakcheck_par::parse_source(&source, &file.to_string_lossy());
                registry.add_all(classes);
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipping unreadable file");
            }
        }
    }

    let classes = registry.into_classes();
    let leaks = analyze(&classes);

    if cli.json {
        println!("{}", report::json::render(&leaks));
    } else {
        println!("{}", report::human::render(&leaks));
    }

    Ok(!leaks.is_empty())
}
