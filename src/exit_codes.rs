//! Exit code constants for the release CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid release file)
//! - 2: Version could not be derived
//! - 3: Git action failure
//! - 4: Command action failure
//! - 5: Run cancelled by the operator

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable or invalid release file.
pub const USER_ERROR: i32 = 1;

/// The version strategy could not produce a version string.
pub const VERSION_FAILURE: i32 = 2;

/// A git action failed: repository, tag or HEAD could not be resolved.
pub const GIT_FAILURE: i32 = 3;

/// A command action could not be spawned.
pub const COMMAND_FAILURE: i32 = 4;

/// The operator aborted the run at a confirmation gate.
pub const CANCELLED: i32 = 5;
