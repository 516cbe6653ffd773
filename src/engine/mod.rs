//! Step execution engine.
//!
//! A [`ReleaseRun`] walks the plan once, in order. For each step it renders
//! the text against the current variables, hands the result to the
//! presenter, runs the step's action, stores `set_variable`, and then blocks
//! at the confirmation gate. The first action error ends the run.
//!
//! The loop is exposed both as a single [`ReleaseRun::run`] call and as the
//! underlying pull API (`begin_step` / `execute` / `advance` / `abort`) for
//! front ends that own their own event loop.

mod presenter;
mod report;


pub use presenter::{Advance, Presenter, RenderedStep};
pub use report::{RunReport, RunStatus, StepOutcome, StepResult};

use crate::actions::{self, ActionContext, ActionOutput};
use crate::cancel::CancelToken;
use crate::config::Step;
use crate::error::{ReleaseError, Result};
use crate::template::render;
use crate::variables::{ProcessEnv, Variables};

/// Where a run currently is. Step indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Rendering(usize),
    ActionDispatch(usize),
    AwaitingConfirmation(usize),
    Completed,
    Aborted(usize),
    Cancelled(usize),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Aborted(_) | RunState::Cancelled(_)
        )
    }
}

/// One release run over a fixed list of steps.
#[derive(Debug)]
pub struct ReleaseRun<'a> {
    steps: &'a [Step],
    variables: Variables,
    process_env: ProcessEnv,
    cancel: CancelToken,
    state: RunState,
    rendered: Option<RenderedStep>,
    outcomes: Vec<StepOutcome>,
}

impl<'a> ReleaseRun<'a> {
    /// Create a run. `variables` is the initial mapping (freshly built or a
    /// resumed snapshot); `process_env` is the ambient environment commands
    /// inherit.
    pub fn new(steps: &'a [Step], variables: Variables, process_env: ProcessEnv) -> Self {
        Self {
            steps,
            variables,
            process_env,
            cancel: CancelToken::new(),
            state: RunState::Idle,
            rendered: None,
            outcomes: Vec::new(),
        }
    }

    /// Use an externally owned cancellation token (e.g. one set from a
    /// signal handler).
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Current variables. Reflects every `set_variable` stored so far.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// The step currently being shown, if any.
    pub fn current_step(&self) -> Option<&RenderedStep> {
        self.rendered.as_ref()
    }

    /// Render step `index` against the current variables.
    pub fn render_step(&self, index: usize) -> Option<RenderedStep> {
        let step = self.steps.get(index)?;
        Some(RenderedStep {
            number: index + 1,
            total: self.steps.len(),
            title: render(step.title(), &self.variables),
            description: step.description().map(|d| render(d, &self.variables)),
            checklist: step
                .checklist()
                .iter()
                .map(|item| render(item, &self.variables))
                .collect(),
            open_url: step.open_url().map(|url| render(url, &self.variables)),
            action: step.action().kind(),
        })
    }

    /// Move to the next step and render it.
    ///
    /// Returns `None` once the run is over: all steps done (state becomes
    /// `Completed`), the run already ended, or the cancel token is set (state
    /// becomes `Cancelled`). Calling it while a step is in progress, or
    /// before its gate was passed with [`advance`](Self::advance), returns
    /// that step again.
    pub fn begin_step(&mut self) -> Option<RenderedStep> {
        let index = match self.state {
            RunState::Idle => 0,
            RunState::AwaitingConfirmation(i) if self.rendered.is_none() => i + 1,
            RunState::Rendering(_)
            | RunState::ActionDispatch(_)
            | RunState::AwaitingConfirmation(_) => return self.rendered.clone(),
            RunState::Completed | RunState::Aborted(_) | RunState::Cancelled(_) => return None,
        };

        if index >= self.steps.len() {
            tracing::info!(steps = self.steps.len(), "release run completed");
            self.state = RunState::Completed;
            self.rendered = None;
            return None;
        }

        if self.cancel.is_cancelled() {
            tracing::warn!(step = index + 1, "release run cancelled before step");
            self.state = RunState::Cancelled(index);
            self.rendered = None;
            return None;
        }

        let rendered = self.render_step(index)?;
        tracing::info!(
            step = rendered.number,
            total = rendered.total,
            title = %rendered.title,
            action = rendered.action,
            "starting step"
        );
        self.state = RunState::Rendering(index);
        self.rendered = Some(rendered.clone());
        Some(rendered)
    }

    /// Run the current step's action and store `set_variable`.
    ///
    /// On success the run waits at the confirmation gate. On failure the run
    /// is aborted (or cancelled, if the cancel token fired during the action)
    /// and the error is returned; variables stored by earlier steps are kept.
    pub fn execute(&mut self) -> Result<ActionOutput> {
        let RunState::Rendering(index) = self.state else {
            return Err(ReleaseError::Config(format!(
                "no step is ready to execute (state: {:?})",
                self.state
            )));
        };
        let steps = self.steps;
        let step = &steps[index];
        let number = index + 1;
        let title = self
            .rendered
            .as_ref()
            .map(|r| r.title.clone())
            .unwrap_or_default();

        self.state = RunState::ActionDispatch(index);
        tracing::debug!(step = number, action = step.action().kind(), "dispatching action");

        let ctx = ActionContext {
            variables: &self.variables,
            process_env: &self.process_env,
            cancel: &self.cancel,
        };
        let result = actions::dispatch(step.action(), ctx);

        if self.cancel.is_cancelled() {
            tracing::warn!(step = number, "release run cancelled during step");
            self.state = RunState::Cancelled(index);
            self.outcomes.push(StepOutcome {
                number,
                title,
                result: StepResult::Cancelled,
            });
            return Err(ReleaseError::Cancelled(number));
        }

        match result {
            Ok(output) => {
                let text = output.text().to_string();
                if let Some(name) = step.set_variable() {
                    tracing::debug!(
                        step = number,
                        variable = name,
                        bytes = text.len(),
                        "storing variable"
                    );
                    self.variables.insert(name.to_string(), text.clone());
                }
                self.outcomes.push(StepOutcome {
                    number,
                    title,
                    result: StepResult::Succeeded { output: text },
                });
                self.state = RunState::AwaitingConfirmation(index);
                Ok(output)
            }
            Err(error) => {
                tracing::error!(step = number, error = %error, "step failed");
                let returned = error.clone();
                self.outcomes.push(StepOutcome {
                    number,
                    title,
                    result: StepResult::Failed { error },
                });
                self.state = RunState::Aborted(index);
                Err(returned)
            }
        }
    }

    /// Pass the confirmation gate of the current step.
    pub fn advance(&mut self) {
        if let RunState::AwaitingConfirmation(index) = self.state {
            tracing::debug!(step = index + 1, "step confirmed");
            self.rendered = None;
        }
    }

    /// Stop the run at the current step.
    pub fn abort(&mut self) {
        let index = match self.state {
            RunState::Idle => 0,
            RunState::Rendering(i)
            | RunState::ActionDispatch(i)
            | RunState::AwaitingConfirmation(i) => i,
            RunState::Completed | RunState::Aborted(_) | RunState::Cancelled(_) => return,
        };
        tracing::warn!(step = index + 1, "release run aborted by operator");
        self.state = RunState::Cancelled(index);
        self.rendered = None;
    }

    /// Drive the whole run through `presenter`.
    pub fn run(mut self, presenter: &mut dyn Presenter) -> RunReport {
        while let Some(step) = self.begin_step() {
            presenter.step_rendered(&step);

            match self.execute() {
                Ok(output) => presenter.action_finished(&step, &output),
                Err(error) => {
                    if !matches!(error, ReleaseError::Cancelled(_)) {
                        presenter.step_failed(&step, &error);
                    }
                    break;
                }
            }

            match presenter.await_advance(&step) {
                Advance::Continue => self.advance(),
                Advance::Abort => {
                    self.abort();
                    break;
                }
            }
        }

        self.into_report()
    }

    /// Finish the run and hand back outcomes and final variables.
    ///
    /// A run that has not reached a terminal state is reported as cancelled
    /// at its current step.
    pub fn into_report(mut self) -> RunReport {
        if !self.state.is_terminal() {
            self.abort();
        }

        let status = match self.state {
            RunState::Aborted(index) => {
                let number = index + 1;
                let error = self
                    .outcomes
                    .iter()
                    .find_map(|outcome| match &outcome.result {
                        StepResult::Failed { error } if outcome.number == number => {
                            Some(error.to_string())
                        }
                        _ => None,
                    })
                    .unwrap_or_default();
                RunStatus::Aborted {
                    step: number,
                    error,
                }
            }
            RunState::Cancelled(index) => RunStatus::Cancelled { step: index + 1 },
            _ => RunStatus::Completed,
        };

        RunReport {
            outcomes: self.outcomes,
            status,
            variables: self.variables,
        }
    }
}
