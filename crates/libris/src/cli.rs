//! Command-line interface for the `libris` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::logging::Verbosity;

/// libris - Flat-file library management
///
/// Tracks books, patrons, and checkouts through an interactive menu,
/// persisting each collection to a JSON file between runs.
#[derive(Debug, Parser)]
#[command(name = "libris")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the collection files (overrides configuration)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
