//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: run the curation cycle that is due today
//! - window: show which cycle and window a run would use
//! - history: list completed cycles

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Curatr - biweekly research paper curation
#[derive(Parser, Debug)]
#[command(name = "curatr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the cycle that is due (the default)
    Run {
        /// Fetch, filter and score, but store nothing
        #[arg(long)]
        dry_run: bool,

        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Show the cycle and fetch window a run would use
    Window {
        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// List completed cycles
    History,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            dry_run: false,
            today: None,
        }
    }
}
