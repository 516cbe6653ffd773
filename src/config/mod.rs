//! Release file model.
//!
//! This module defines the structures parsed from `release.yaml`: the version
//! strategy, declared variables, and the ordered step list. Loading validates
//! the step preconditions the engine relies on; unknown fields are ignored for
//! forward compatibility.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{ReleaseConfig, Step, VersionConfig};
pub use types::{Action, CommandConfig, FromTime, GitConfig, ShortlogConfig, SinceWhat};
