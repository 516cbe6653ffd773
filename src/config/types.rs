//! Action and version types used by the release file model.

use crate::version::Timezone;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The optional side effect a step performs.
///
/// A step carries at most one action; the variants make that structural.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Action {
    /// Instructions only. The step's output is the empty string.
    #[default]
    None,
    /// Summarize git history since a reference point.
    Git(GitConfig),
    /// Run a shell command and capture its output.
    Command(CommandConfig),
}

impl Action {
    /// Returns true for any action other than [`Action::None`].
    pub fn is_some(&self) -> bool {
        !matches!(self, Action::None)
    }

    /// Short name used in logs and listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::None => "none",
            Action::Git(_) => "git",
            Action::Command(_) => "run",
        }
    }
}

/// Configuration for a git action (YAML key `git`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Repository path; a template rendered against current variables.
    pub repo: String,

    /// Shortlog request.
    pub get_shortlog: ShortlogConfig,
}

/// Parameters of a shortlog request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlogConfig {
    /// Reference point the history walk stops at.
    pub since: SinceWhat,

    /// Whether commits with more than one parent are listed. Required.
    pub include_merge_commits: bool,
}

/// Strategy for choosing the reference commit of a shortlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SinceWhat {
    /// Nearest tag reachable from HEAD, lightweight or annotated.
    LatestTag,
    /// Nearest annotated tag reachable from HEAD.
    LatestAnnotatedTag,
    /// Most recent merge commit reachable from HEAD.
    LatestMerge,
}

impl std::fmt::Display for SinceWhat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinceWhat::LatestTag => write!(f, "latest tag"),
            SinceWhat::LatestAnnotatedTag => write!(f, "latest annotated tag"),
            SinceWhat::LatestMerge => write!(f, "latest merge"),
        }
    }
}

/// Configuration for a command action (YAML key `run`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Command line passed to the shell; a template.
    pub command: String,

    /// Environment entries layered over the process environment.
    /// Values are used as written, without template rendering.
    #[serde(default)]
    pub env: IndexMap<String, String>,

    /// Working directory; a template. Defaults to the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chdir: Option<String>,

    /// Shell invocation the command is appended to, e.g. `bash -eu -c`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
}

impl CommandConfig {
    /// A command with no environment overrides, run from the current directory.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: IndexMap::new(),
            chdir: None,
            shell: None,
        }
    }
}

/// The `from_time` version strategy as written in YAML.
///
/// Accepts either a bare format string or a mapping with `format` and an
/// optional `timezone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FromTime {
    Format(String),
    Detailed {
        #[serde(default)]
        format: Option<String>,
        #[serde(default)]
        timezone: Timezone,
    },
}
