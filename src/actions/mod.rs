//! Step actions.
//!
//! A step runs at most one action:
//!
//! - **Git**: shortlog of commits since a tag or merge
//! - **Command**: shell command with captured stdout/stderr
//!
//! Every action produces text output; that text is what `set_variable`
//! stores.

pub mod command;
pub mod git;

pub use command::CommandOutput;
pub use git::Shortlog;

use crate::cancel::CancelToken;
use crate::config::Action;
use crate::error::Result;
use crate::variables::{ProcessEnv, Variables};

/// What an action produced.
#[derive(Debug, Clone)]
pub enum ActionOutput {
    /// The step had no action.
    Nothing,
    /// Rendered shortlog text.
    Shortlog(String),
    /// Captured command result.
    Command(CommandOutput),
}

impl ActionOutput {
    /// The textual output stored by `set_variable`: empty for no action, the
    /// shortlog text, or the command's stdout.
    pub fn text(&self) -> &str {
        match self {
            ActionOutput::Nothing => "",
            ActionOutput::Shortlog(text) => text,
            ActionOutput::Command(output) => &output.stdout,
        }
    }
}

/// Inputs an action may read. Actions never write variables.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub variables: &'a Variables,
    pub process_env: &'a ProcessEnv,
    pub cancel: &'a CancelToken,
}

/// Run a step's action.
pub fn dispatch(action: &Action, ctx: ActionContext<'_>) -> Result<ActionOutput> {
    match action {
        Action::None => Ok(ActionOutput::Nothing),
        Action::Git(config) => git::run(config, ctx.variables).map(ActionOutput::Shortlog),
        Action::Command(config) => {
            command::run_step(config, ctx.variables, ctx.process_env, ctx.cancel)
                .map(ActionOutput::Command)
        }
    }
}
