//! Run results handed back to the caller.

use crate::error::ReleaseError;
use crate::exit_codes;
use crate::variables::Variables;

/// How a single step ended.
#[derive(Debug)]
pub enum StepResult {
    /// The action (if any) ran; `output` is what `set_variable` would store.
    Succeeded { output: String },
    /// The action failed and the run stopped here.
    Failed { error: ReleaseError },
    /// The run was cancelled while this step's action was running.
    Cancelled,
}

/// Outcome of one executed step.
#[derive(Debug)]
pub struct StepOutcome {
    /// 1-based position in the plan.
    pub number: usize,
    /// Rendered title.
    pub title: String,
    pub result: StepResult,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.result, StepResult::Succeeded { .. })
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every step ran and was confirmed.
    Completed,
    /// The action of step `step` (1-based) failed with `error`.
    Aborted { step: usize, error: String },
    /// The operator stopped the run at or during step `step` (1-based).
    Cancelled { step: usize },
}

/// Everything a caller needs after a run: per-step outcomes in execution
/// order, the terminal status, and the final variables (for resuming).
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<StepOutcome>,
    pub status: RunStatus,
    pub variables: Variables,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// The failing step number and its error, if the run aborted.
    pub fn failure(&self) -> Option<(usize, &ReleaseError)> {
        self.outcomes.iter().find_map(|outcome| match &outcome.result {
            StepResult::Failed { error } => Some((outcome.number, error)),
            _ => None,
        })
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Completed => exit_codes::SUCCESS,
            RunStatus::Cancelled { .. } => exit_codes::CANCELLED,
            RunStatus::Aborted { .. } => self
                .failure()
                .map(|(_, err)| err.exit_code())
                .unwrap_or(exit_codes::USER_ERROR),
        }
    }
}
