//! Implementation of the `release start` command.
//!
//! 1. Load and validate the release file
//! 2. Seed variables (derive them, or load a resumed snapshot)
//! 3. Drive the run through the line presenter
//! 4. Optionally save the final variables
//! 5. Map the run result to an error and exit code

use super::presenter::LinePresenter;
use crate::cli::StartArgs;
use release_runner::config::ReleaseConfig;
use release_runner::engine::{ReleaseRun, RunReport, RunStatus};
use release_runner::error::{ReleaseError, Result};
use release_runner::snapshot;
use release_runner::variables::{self, Variables};
use std::path::Path;

pub fn cmd_start(file: &Path, args: StartArgs) -> Result<()> {
    let config = ReleaseConfig::load(file)?;
    let process_env = variables::capture_process_env();

    let initial: Variables = match &args.resume {
        Some(path) => {
            tracing::info!(snapshot = %path.display(), "resuming from variable snapshot");
            snapshot::load(path)?
        }
        None => variables::build(&config.version.strategy(), &config.variables, &process_env)?,
    };

    let stdin = std::io::stdin();
    let mut presenter =
        LinePresenter::new(stdin.lock(), std::io::stdout()).auto_confirm(args.yes);

    let report = ReleaseRun::new(&config.steps, initial, process_env).run(&mut presenter);

    if let Some(path) = &args.save_variables {
        snapshot::save(path, &report.variables)?;
        tracing::info!(path = %path.display(), "saved variable snapshot");
    }

    report_result(report)
}

/// Turn a finished run into the command result.
fn report_result(report: RunReport) -> Result<()> {
    match &report.status {
        RunStatus::Completed => Ok(()),
        RunStatus::Cancelled { step } => Err(ReleaseError::Cancelled(*step)),
        RunStatus::Aborted { step, error } => Err(report
            .failure()
            .map(|(_, err)| err.clone())
            .unwrap_or_else(|| ReleaseError::Config(format!("step {}: {}", step, error)))),
    }
}
