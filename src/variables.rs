//! The variable environment threaded through a release run.
//!
//! Layering, lowest to highest:
//!
//! 1. The process environment, reachable only as `${env.NAME}`.
//! 2. The reserved `version` variable.
//! 3. Config-declared variables, each rendered against everything resolved
//!    before it, in declaration order.
//!
//! Steps then add or overwrite entries through `set_variable`.

use crate::error::Result;
use crate::template::render_with_env;
use crate::version::VersionStrategy;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Ordered name -> value mapping. Insertion order is declaration order, then
/// `set_variable` order; overwriting keeps the original position.
pub type Variables = IndexMap<String, String>;

/// Snapshot of the process environment used for `${env.NAME}` lookups and as
/// the ambient environment of command actions.
pub type ProcessEnv = HashMap<String, String>;

/// Name of the reserved variable holding the derived version.
pub const VERSION_VARIABLE: &str = "version";

/// Capture the current process environment.
///
/// Entries that are not valid UTF-8 are skipped.
pub fn capture_process_env() -> ProcessEnv {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Build the initial variable environment for a run.
///
/// # Errors
///
/// Returns `ReleaseError::Version` if the strategy cannot produce a version.
pub fn build(
    strategy: &VersionStrategy,
    declared: &IndexMap<String, String>,
    env: &ProcessEnv,
) -> Result<Variables> {
    let version = strategy.derive()?;
    Ok(build_with_version(version, declared, env))
}

/// Build the variable environment from an already derived version string.
pub fn build_with_version(
    version: String,
    declared: &IndexMap<String, String>,
    env: &ProcessEnv,
) -> Variables {
    let mut variables = Variables::new();
    variables.insert(VERSION_VARIABLE.to_string(), version);

    for (name, raw) in declared {
        let value = render_with_env(raw, &variables, env);
        tracing::debug!(variable = %name, "resolved declared variable");
        variables.insert(name.clone(), value);
    }

    variables
}
