//! CLI argument parsing for the release runner.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Walk through a release checklist one step at a time.
///
/// Steps come from a YAML release file. Each step is printed with its
/// variables filled in, may query git history or run a command, and waits
/// for confirmation before the next one starts.
#[derive(Parser, Debug)]
#[command(name = "release")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Release file to read.
    #[arg(short = 'f', long = "file", global = true, default_value = "release.yaml")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the release steps in order.
    ///
    /// Each step is rendered, its action (if any) runs, and the runner waits
    /// for Enter before continuing. Type `q` at the prompt to stop.
    Start(StartArgs),

    /// Check that the release file parses and every step is well formed.
    Validate,

    /// Print the steps of the release file without running anything.
    List,
}

/// Arguments for the `start` command.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Resume with the variables from a JSON snapshot instead of deriving
    /// them from the release file.
    #[arg(long, value_name = "SNAPSHOT")]
    pub resume: Option<PathBuf>,

    /// Write the final variables to a JSON snapshot when the run ends,
    /// whether it completed or not.
    #[arg(long, value_name = "PATH")]
    pub save_variables: Option<PathBuf>,

    /// Do not wait at the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
