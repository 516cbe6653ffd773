//! Command implementations for the release runner.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod list;
mod presenter;
mod start;
mod validate;

use crate::cli::{Cli, Command};
use release_runner::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Start(args) => start::cmd_start(&cli.file, args),
        Command::Validate => validate::cmd_validate(&cli.file),
        Command::List => list::cmd_list(&cli.file),
    }
}
