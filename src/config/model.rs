//! ReleaseConfig and Step definitions.

use super::types::*;
use crate::error::{ReleaseError, Result};
use crate::version::{Timezone, VersionStrategy};
use indexmap::IndexMap;
use serde::Deserialize;

/// A parsed `release.yaml` document.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseConfig {
    /// How the reserved `version` variable is derived.
    pub version: VersionConfig,

    /// Declared variables, rendered in declaration order.
    #[serde(default)]
    pub variables: IndexMap<String, String>,

    /// The release plan.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// The `version` section of the release file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
    /// Derive the version from the current time.
    pub from_time: Option<FromTime>,
}

impl VersionConfig {
    /// Convert the YAML shape into a version strategy.
    ///
    /// A missing format is carried through so that deriving the version,
    /// not loading the file, reports it.
    pub fn strategy(&self) -> VersionStrategy {
        let (format, timezone) = match &self.from_time {
            Some(FromTime::Format(format)) => (Some(format.clone()), Timezone::default()),
            Some(FromTime::Detailed { format, timezone }) => (format.clone(), *timezone),
            None => (None, Timezone::default()),
        };
        VersionStrategy::FromTime { format, timezone }
    }
}

/// One unit of the release plan.
///
/// Steps are immutable once built. Constructors normalize the title (trimmed)
/// and the description (exactly one trailing newline).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawStep")]
pub struct Step {
    title: String,
    description: Option<String>,
    action: Action,
    set_variable: Option<String>,
    checklist: Vec<String>,
    open_url: Option<String>,
}

impl Step {
    /// Create an instruction-only step.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            description: None,
            action: Action::None,
            set_variable: None,
            checklist: Vec::new(),
            open_url: None,
        }
    }

    /// Set the description, normalized to end with exactly one newline.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(normalize_description(&description.into()));
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Store the action's output under `name` once the step has run.
    pub fn with_set_variable(mut self, name: impl Into<String>) -> Self {
        self.set_variable = Some(name.into());
        self
    }

    pub fn with_checklist<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checklist = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_open_url(mut self, url: impl Into<String>) -> Self {
        self.open_url = Some(url.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn set_variable(&self) -> Option<&str> {
        self.set_variable.as_deref()
    }

    pub fn checklist(&self) -> &[String] {
        &self.checklist
    }

    pub fn open_url(&self) -> Option<&str> {
        self.open_url.as_deref()
    }

    /// Check the step preconditions the engine relies on.
    ///
    /// - the title is non-empty after trimming
    /// - `set_variable` requires an action
    /// - `set_variable` names are non-empty
    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(ReleaseError::Config(
                "step title must not be empty".to_string(),
            ));
        }

        if let Some(name) = &self.set_variable {
            if name.trim().is_empty() {
                return Err(ReleaseError::Config(format!(
                    "step '{}': set_variable must not be empty",
                    self.title
                )));
            }
            if !self.action.is_some() {
                return Err(ReleaseError::Config(format!(
                    "step '{}' has no action, but variable '{}' is set",
                    self.title, name
                )));
            }
        }

        Ok(())
    }
}

/// Description normalization: strip trailing newlines, then add exactly one.
fn normalize_description(description: &str) -> String {
    let mut normalized = description.trim_end_matches(['\n', '\r']).to_string();
    normalized.push('\n');
    normalized
}

/// Step as written in YAML, before the action fields are folded into [`Action`].
#[derive(Debug, Deserialize)]
struct RawStep {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    git: Option<GitConfig>,
    #[serde(default)]
    run: Option<CommandConfig>,
    #[serde(default)]
    set_variable: Option<String>,
    #[serde(default)]
    checklist: Vec<String>,
    #[serde(default)]
    open_url: Option<String>,
}

impl TryFrom<RawStep> for Step {
    type Error = ReleaseError;

    fn try_from(raw: RawStep) -> Result<Self> {
        let action = match (raw.git, raw.run) {
            (Some(_), Some(_)) => {
                return Err(ReleaseError::Config(format!(
                    "step '{}': only 1 action can be specified for a step at once \
                     (specified actions: \"git\" and \"run\")",
                    raw.title.trim()
                )));
            }
            (Some(git), None) => Action::Git(git),
            (None, Some(run)) => Action::Command(run),
            (None, None) => Action::None,
        };

        let mut step = Step::new(raw.title)
            .with_action(action)
            .with_checklist(raw.checklist);
        step.set_variable = raw.set_variable;
        step.open_url = raw.open_url;
        if let Some(description) = raw.description.filter(|d| !d.trim().is_empty()) {
            step = step.with_description(description);
        }

        step.validate()?;
        Ok(step)
    }
}
