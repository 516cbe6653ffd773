//! Release runner library.
//!
//! Loads a release plan from YAML, builds the variable environment, and
//! drives the steps through a [`engine::Presenter`]. Steps can summarize git
//! history since the last tag or run shell commands, and later steps can
//! reference what earlier ones produced.

pub mod actions;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod snapshot;
pub mod template;
pub mod variables;
pub mod version;

#[cfg(test)]
mod test_support;
