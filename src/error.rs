//! Error types for the release runner.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for release operations.
///
/// Each variant maps to a specific exit code. The template renderer has no
/// variant: unresolved placeholders are left in place rather than reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    /// The release file is unreadable or violates a step precondition
    /// (both `git` and `run`, `set_variable` without an action, blank title).
    #[error("{0}")]
    Config(String),

    /// The version strategy could not produce a version string.
    #[error("Cannot derive version: {0}")]
    Version(String),

    /// Git repository, tag, or HEAD could not be resolved.
    #[error("Git operation failed: {0}")]
    Git(String),

    /// A command action could not be spawned or waited on.
    #[error("Command failed: {0}")]
    Command(String),

    /// Local I/O failed (snapshot files, terminal).
    #[error("{0}")]
    Io(String),

    /// The operator aborted the run.
    #[error("Release run cancelled at step {0}")]
    Cancelled(usize),
}

impl ReleaseError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReleaseError::Config(_) => exit_codes::USER_ERROR,
            ReleaseError::Io(_) => exit_codes::USER_ERROR,
            ReleaseError::Version(_) => exit_codes::VERSION_FAILURE,
            ReleaseError::Git(_) => exit_codes::GIT_FAILURE,
            ReleaseError::Command(_) => exit_codes::COMMAND_FAILURE,
            ReleaseError::Cancelled(_) => exit_codes::CANCELLED,
        }
    }
}

/// Result type alias for release operations.
pub type Result<T> = std::result::Result<T, ReleaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_has_correct_exit_code() {
        let err = ReleaseError::Config("bad step".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn version_error_has_correct_exit_code() {
        let err = ReleaseError::Version("format is empty".to_string());
        assert_eq!(err.exit_code(), exit_codes::VERSION_FAILURE);
    }

    #[test]
    fn git_error_has_correct_exit_code() {
        let err = ReleaseError::Git("no tag".to_string());
        assert_eq!(err.exit_code(), exit_codes::GIT_FAILURE);
    }

    #[test]
    fn command_error_has_correct_exit_code() {
        let err = ReleaseError::Command("spawn failed".to_string());
        assert_eq!(err.exit_code(), exit_codes::COMMAND_FAILURE);
    }

    #[test]
    fn cancelled_has_correct_exit_code() {
        assert_eq!(ReleaseError::Cancelled(2).exit_code(), exit_codes::CANCELLED);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = ReleaseError::Git("no tags found".to_string());
        assert_eq!(err.to_string(), "Git operation failed: no tags found");

        let err = ReleaseError::Cancelled(3);
        assert_eq!(err.to_string(), "Release run cancelled at step 3");
    }
}
