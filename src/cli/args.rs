//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::demo::Scenario;

/// Run and inspect demo step trees: setup, children, cleanup, depth-first
#[derive(Parser, Debug)]
#[command(name = "steptree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .steptree.toml (default: cwd)
    #[arg(short = 'C', long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a demo tree and report pass/fail
    Run {
        /// Which demo tree to run
        #[arg(value_enum)]
        scenario: Scenario,
    },

    /// Show a demo tree and the phases a successful run performs
    Plan {
        /// Which demo tree to show
        #[arg(value_enum)]
        scenario: Scenario,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented template
    Template,
    /// Show config file locations
    Path,
}
