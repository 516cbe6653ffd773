//! Git history action: "who committed what since the last release".
//!
//! Resolves a reference commit (latest tag, latest annotated tag, or latest
//! merge), walks HEAD's ancestry down to it, and groups the first line of
//! each commit message by committer name.

use crate::config::{GitConfig, SinceWhat};
use crate::error::Result;
use crate::git::{self, CommitInfo};
use crate::template::render;
use crate::variables::Variables;
use indexmap::IndexMap;
use std::path::Path;

/// Indentation of each commit line under its committer header.
const COMMIT_INDENT: &str = "      ";

/// Commit summaries grouped by committer, in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortlog {
    groups: IndexMap<String, Vec<String>>,
}

impl Shortlog {
    /// Collect commits from a newest-first walk, stopping before `stop_at`.
    pub fn collect<I>(commits: I, stop_at: &str, include_merges: bool) -> Self
    where
        I: IntoIterator<Item = CommitInfo>,
    {
        let mut shortlog = Shortlog::default();

        for commit in commits {
            if commit.id == stop_at {
                break;
            }
            if !include_merges && commit.is_merge() {
                continue;
            }
            shortlog
                .groups
                .entry(commit.committer.clone())
                .or_default()
                .push(commit.summary().to_string());
        }

        shortlog
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of listed commits.
    pub fn commit_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Committer names in first-encounter order.
    pub fn committers(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Render as text: a `"<name> (<n>):"` header per committer, one
    /// indented line per commit, and a blank line after each group.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        for (name, summaries) in &self.groups {
            lines.push(format!("{} ({}):", name, summaries.len()));
            for summary in summaries {
                lines.push(format!("{}{}", COMMIT_INDENT, summary));
            }
            lines.push(String::new());
        }
        lines.join("\n")
    }
}

/// Resolve a since-strategy to a commit id against the repository's current
/// state.
pub fn resolve_since(repo: &Path, since: SinceWhat) -> Result<String> {
    match since {
        SinceWhat::LatestTag | SinceWhat::LatestAnnotatedTag => {
            let include_lightweight = since == SinceWhat::LatestTag;
            let described = git::describe_long(repo, include_lightweight)?;
            let tag = git::tag_name_from_describe(&described);
            tracing::debug!(repo = %repo.display(), %described, %tag, "resolved nearest tag");
            git::tag_commit(repo, tag)
        }
        SinceWhat::LatestMerge => git::latest_merge_commit(repo),
    }
}

/// Build the shortlog of `repo` since the given reference point.
///
/// # Errors
///
/// `ReleaseError::Git` when the repository cannot be opened, HEAD cannot be
/// resolved, or no matching tag/merge exists. An empty history between HEAD
/// and the reference is not an error and renders as an empty string.
pub fn shortlog(repo: &Path, since: SinceWhat, include_merges: bool) -> Result<String> {
    git::ensure_repository(repo)?;
    git::head_commit(repo)?;

    let stop_at = resolve_since(repo, since)?;
    let commits = git::walk_from_head(repo, &stop_at)?;
    let shortlog = Shortlog::collect(commits, &stop_at, include_merges);

    tracing::info!(
        repo = %repo.display(),
        %since,
        committers = shortlog.groups.len(),
        commits = shortlog.commit_count(),
        "collected shortlog"
    );

    Ok(shortlog.render())
}

/// Run a step's git action: render the repository path, then shortlog it.
pub fn run(config: &GitConfig, variables: &Variables) -> Result<String> {
    let repo = render(&config.repo, variables);
    shortlog(
        Path::new(&repo),
        config.get_shortlog.since,
        config.get_shortlog.include_merge_commits,
    )
}
