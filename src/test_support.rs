use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Scratch git repository for tests.
pub(crate) struct TestRepo {
    dir: TempDir,
    counter: std::cell::Cell<usize>,
}

impl TestRepo {
    /// An initialized repository with no commits on an unborn `main`.
    pub(crate) fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path();

        git(path, &["init"], &[]);
        // Deterministic default branch name across environments.
        git(path, &["symbolic-ref", "HEAD", "refs/heads/main"], &[]);
        git(path, &["config", "user.email", "test@example.com"], &[]);
        git(path, &["config", "user.name", "Test User"], &[]);
        git(path, &["config", "commit.gpgsign", "false"], &[]);
        git(path, &["config", "tag.gpgsign", "false"], &[]);

        Self {
            dir,
            counter: std::cell::Cell::new(0),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit a new file as the configured test user; returns the commit id.
    pub(crate) fn commit(&self, message: &str) -> String {
        self.commit_with_env(message, &[])
    }

    /// Commit a new file with `name` as both author and committer.
    pub(crate) fn commit_as(&self, message: &str, name: &str) -> String {
        self.commit_with_env(
            message,
            &[("GIT_AUTHOR_NAME", name), ("GIT_COMMITTER_NAME", name)],
        )
    }

    fn commit_with_env(&self, message: &str, env: &[(&str, &str)]) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);

        std::fs::write(self.path().join(format!("file{}.txt", n)), format!("File {}\n", n))
            .unwrap();
        git(self.path(), &["add", "."], &[]);
        git(self.path(), &["commit", "-m", message], env);
        self.head()
    }

    pub(crate) fn head(&self) -> String {
        git(self.path(), &["rev-parse", "HEAD"], &[])
    }

    pub(crate) fn lightweight_tag(&self, name: &str) {
        git(self.path(), &["tag", name], &[]);
    }

    pub(crate) fn annotated_tag(&self, name: &str) {
        git(self.path(), &["tag", "-a", name, "-m", &format!("Release {}", name)], &[]);
    }

    /// Create `branch` from HEAD, commit on it, and merge it back into `main`
    /// with a merge commit. Returns the merge commit id.
    pub(crate) fn merge_side_branch(&self, branch: &str, work: &str, merge_message: &str) -> String {
        self.merge_side_branch_as(branch, work, "Test User", merge_message)
    }

    /// Like [`TestRepo::merge_side_branch`], with the branch commit made by
    /// `name`. The merge commit itself is made by the configured test user.
    pub(crate) fn merge_side_branch_as(
        &self,
        branch: &str,
        work: &str,
        name: &str,
        merge_message: &str,
    ) -> String {
        git(self.path(), &["checkout", "-q", "-b", branch], &[]);
        self.commit_as(work, name);
        git(self.path(), &["checkout", "-q", "main"], &[]);
        git(
            self.path(),
            &["merge", "--no-ff", "--no-edit", "-m", merge_message, branch],
            &[],
        );
        self.head()
    }
}

/// A repository with a single commit and no tags.
pub(crate) fn create_test_repo() -> TestRepo {
    let repo = TestRepo::empty();
    repo.commit("Initial commit");
    repo
}

fn git(repo_dir: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .envs(env.iter().copied())
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
