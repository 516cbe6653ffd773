//! Git command runner.
//!
//! Provides a safe wrapper around the system `git` binary with captured
//! stdout/stderr and structured error handling, plus the read-only queries the
//! git action needs: describe, tag lookup, HEAD resolution, and a commit walk.

use crate::error::{ReleaseError, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Field separator inside one `git log` record.
const FIELD_SEP: char = '\x1f';
/// Separator between `git log` records.
const RECORD_SEP: char = '\x1e';

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }
}

/// Run a git command with the specified working directory.
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(ReleaseError::Git)` - On spawn failure or non-zero exit code
///
/// # Examples
///
/// ```no_run
/// use release_runner::git::run_git;
/// use std::path::Path;
///
/// let output = run_git(Path::new("."), &["describe", "--tags", "--long"])?;
/// println!("Nearest tag: {}", output.stdout);
/// # Ok::<(), release_runner::error::ReleaseError>(())
/// ```
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            ReleaseError::Git(format!(
                "failed to execute git {} in '{}': {}",
                args.first().unwrap_or(&""),
                cwd.display(),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.clone()
        } else {
            git_output.stderr.clone()
        };

        Err(ReleaseError::Git(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

/// Message of a git error without the variant prefix, for re-wrapping.
fn detail(err: ReleaseError) -> String {
    match err {
        ReleaseError::Git(msg) => msg,
        other => other.to_string(),
    }
}

/// Check that `path` is inside a git repository.
pub fn ensure_repository<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(ReleaseError::Git(format!(
            "cannot open repository '{}': not a directory",
            path.display()
        )));
    }

    run_git(path, &["rev-parse", "--git-dir"])
        .map(|_| ())
        .map_err(|_| {
            ReleaseError::Git(format!(
                "cannot open repository '{}': not a git repository",
                path.display()
            ))
        })
}

/// Resolve HEAD to a full commit id.
pub fn head_commit<P: AsRef<Path>>(repo: P) -> Result<String> {
    run_git(repo, &["rev-parse", "--verify", "HEAD^{commit}"])
        .map(|out| out.stdout)
        .map_err(|e| ReleaseError::Git(format!("cannot resolve HEAD: {}", detail(e))))
}

/// Describe HEAD in long form (`<tag>-<n>-g<sha>`).
///
/// With `include_lightweight` the nearest tag of any kind is used; otherwise
/// only annotated tags are considered.
pub fn describe_long<P: AsRef<Path>>(repo: P, include_lightweight: bool) -> Result<String> {
    let mut args = vec!["describe", "--long"];
    if include_lightweight {
        args.push("--tags");
    }

    run_git(repo, &args).map(|out| out.stdout).map_err(|e| {
        let kind = if include_lightweight { "tag" } else { "annotated tag" };
        ReleaseError::Git(format!("no {} reachable from HEAD: {}", kind, detail(e)))
    })
}

/// Extract the tag name from long `git describe` output: the segment before
/// the first `-`.
pub fn tag_name_from_describe(describe: &str) -> &str {
    describe.split('-').next().unwrap_or(describe)
}

/// Look up `refs/tags/<name>` and peel it to the commit it marks.
pub fn tag_commit<P: AsRef<Path>>(repo: P, name: &str) -> Result<String> {
    let spec = format!("refs/tags/{}^{{commit}}", name);
    run_git(repo, &["rev-parse", "--verify", &spec])
        .map(|out| out.stdout)
        .map_err(|e| {
            ReleaseError::Git(format!(
                "tag reference 'refs/tags/{}' not found: {}",
                name,
                detail(e)
            ))
        })
}

/// Most recent merge commit reachable from HEAD.
pub fn latest_merge_commit<P: AsRef<Path>>(repo: P) -> Result<String> {
    let out = run_git(repo, &["rev-list", "--merges", "--max-count=1", "HEAD"])?;
    if out.is_empty() {
        return Err(ReleaseError::Git(
            "no merge commit reachable from HEAD".to_string(),
        ));
    }
    Ok(out.stdout)
}

/// A commit as seen by the history walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub parent_count: usize,
    pub committer: String,
    pub message: String,
}

impl CommitInfo {
    /// A merge commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parent_count > 1
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// `git log` arguments for the history walk. Signature display is forced off
/// so a `log.showSignature` user setting cannot interleave GPG output.
const WALK_ARGS: &[&str] = &[
    "log",
    "--topo-order",
    "--no-color",
    "--no-show-signature",
    "--format=%H%x1f%P%x1f%cn%x1f%B%x1e",
    "HEAD",
];

/// Walk the ancestry of HEAD in topological (newest first) order, stopping
/// before `stop_at`. Without a match the walk runs to the root.
///
/// Records are parsed as `git log` streams them; once `stop_at` arrives the
/// process is killed, so history older than the reference is never read.
pub fn walk_from_head<P: AsRef<Path>>(repo: P, stop_at: &str) -> Result<Vec<CommitInfo>> {
    let repo = repo.as_ref();

    let mut child = Command::new("git")
        .current_dir(repo)
        .args(WALK_ARGS)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            ReleaseError::Git(format!(
                "failed to execute git log in '{}': {}",
                repo.display(),
                e
            ))
        })?;

    let Some(stdout) = child.stdout.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(ReleaseError::Git("git log output was not captured".to_string()));
    };

    let walked = read_until_commit(BufReader::new(stdout), stop_at);
    let (commits, reached) = match walked {
        Ok(walked) => walked,
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
    };

    if reached {
        let _ = child.kill();
        let _ = child.wait();
        tracing::debug!(commits = commits.len(), "history walk reached reference commit");
        return Ok(commits);
    }

    let output = child
        .wait_with_output()
        .map_err(|e| ReleaseError::Git(format!("failed to wait for git log: {}", e)))?;
    if !output.status.success() {
        return Err(ReleaseError::Git(format!(
            "git log failed (exit code {}): {}",
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(commits)
}

/// Parse records until the one whose id is `stop_at`.
///
/// Returns the commits before it and whether it was found.
fn read_until_commit<R: BufRead>(mut reader: R, stop_at: &str) -> Result<(Vec<CommitInfo>, bool)> {
    let mut commits = Vec::new();
    let mut record = Vec::new();

    loop {
        record.clear();
        let read = reader
            .read_until(RECORD_SEP as u8, &mut record)
            .map_err(|e| ReleaseError::Git(format!("failed to read git log output: {}", e)))?;
        if read == 0 {
            return Ok((commits, false));
        }
        if record.last() == Some(&(RECORD_SEP as u8)) {
            record.pop();
        }

        let text = String::from_utf8_lossy(&record);
        let text = text.trim_start_matches(['\n', '\r']);
        if text.trim().is_empty() {
            continue;
        }

        let commit = parse_commit_record(text)?;
        if commit.id == stop_at {
            return Ok((commits, true));
        }
        commits.push(commit);
    }
}

fn parse_commit_record(record: &str) -> Result<CommitInfo> {
    let mut fields = record.splitn(4, FIELD_SEP);
    let (Some(id), Some(parents), Some(committer), Some(message)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(ReleaseError::Git(format!(
            "unexpected git log record: {:?}",
            record
        )));
    };

    Ok(CommitInfo {
        id: id.to_string(),
        parent_count: parents.split_whitespace().count(),
        committer: committer.to_string(),
        message: message.to_string(),
    })
}
