//! The seam between the engine and whatever shows steps to the operator.

use crate::actions::ActionOutput;
use crate::error::ReleaseError;

/// A step with all of its text rendered against the current variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    /// 1-based position in the plan.
    pub number: usize,
    /// Number of steps in the plan.
    pub total: usize,
    pub title: String,
    /// Ends with exactly one newline when present.
    pub description: Option<String>,
    pub checklist: Vec<String>,
    pub open_url: Option<String>,
    /// `none`, `git`, or `run`.
    pub action: &'static str,
}

/// Operator decision at the confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Proceed to the next step.
    Continue,
    /// Stop the run here.
    Abort,
}

/// Presentation layer driven by [`ReleaseRun::run`](super::ReleaseRun::run).
///
/// Calls arrive strictly in step order: `step_rendered`, then either
/// `action_finished` followed by `await_advance`, or `step_failed`.
pub trait Presenter {
    /// Shown before the step's action runs.
    fn step_rendered(&mut self, step: &RenderedStep);

    /// The step's action completed (also called for steps without an action).
    fn action_finished(&mut self, _step: &RenderedStep, _output: &ActionOutput) {}

    /// The step's action failed; the run ends after this call.
    fn step_failed(&mut self, _step: &RenderedStep, _error: &ReleaseError) {}

    /// The confirmation gate. Blocks until the operator decides.
    fn await_advance(&mut self, step: &RenderedStep) -> Advance;
}
