//! Template renderer for step text and action arguments.
//!
//! Performs flat `${name}` substitution against the variable environment.
//! It is used for step titles, descriptions, checklists, git repository paths,
//! command lines, and declared variables.
//!
//! # Syntax
//!
//! - `${name}` or `$name` - Substitutes the value of variable `name`
//! - `${env.NAME}` - Process environment lookup (only via [`render_with_env`])
//! - `$$` - Renders as a literal `$`
//!
//! # Error Handling
//!
//! Rendering never fails. A placeholder whose name is not a known variable is
//! copied to the output unchanged, so a step can mention a variable that a
//! later step has yet to set. Substituted values are not rescanned.

use crate::variables::{ProcessEnv, Variables};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Prefix that routes a braced placeholder to the process environment.
pub const ENV_PREFIX: &str = "env.";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$(?:(?P<escaped>\$)|\{(?P<braced>(?:env\.)?[A-Za-z_][A-Za-z0-9_]*)\}|(?P<named>[A-Za-z_][A-Za-z0-9_]*))",
    )
    .expect("placeholder pattern is valid")
});

/// Render a template string against the variable environment.
///
/// `${env.NAME}` placeholders are left untouched; use [`render_with_env`]
/// when process environment lookups are wanted.
///
/// # Examples
///
/// ```
/// use release_runner::template::render;
/// use release_runner::variables::Variables;
///
/// let mut vars = Variables::new();
/// vars.insert("version".to_string(), "2024.05.01".to_string());
///
/// let result = render("Release ${version} (${missing})", &vars);
/// assert_eq!(result, "Release 2024.05.01 (${missing})");
/// ```
pub fn render(text: &str, variables: &Variables) -> String {
    substitute(text, |name| variables.get(name).map(String::as_str))
}

/// Render a template string, also resolving `${env.NAME}` from `env`.
///
/// A bare `${NAME}` only ever resolves against `variables`, even when the
/// process environment has a `NAME` entry.
pub fn render_with_env(text: &str, variables: &Variables, env: &ProcessEnv) -> String {
    substitute(text, |name| match name.strip_prefix(ENV_PREFIX) {
        Some(key) => env.get(key).map(String::as_str),
        None => variables.get(name).map(String::as_str),
    })
}

fn substitute<'v, F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'v str>,
{
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            if caps.name("escaped").is_some() {
                return "$".to_string();
            }

            let name = caps
                .name("braced")
                .or_else(|| caps.name("named"))
                .map(|m| m.as_str())
                .unwrap_or_default();

            // Bare `$env` never carries the prefix; the regex only allows it braced.
            match lookup(name) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
