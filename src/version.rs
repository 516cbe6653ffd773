//! Version strategies.
//!
//! The reserved `version` variable is derived from the release file's
//! `version` section before any step renders. The only strategy today is
//! `from_time`: the current wall-clock time formatted with a strftime string.

use crate::error::{ReleaseError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Timezone used when formatting a time-based version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    /// The operator's local timezone (default).
    #[default]
    Local,
    /// Coordinated universal time.
    Utc,
}

/// How the `version` variable is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStrategy {
    /// Format the current time with a strftime-like string.
    FromTime {
        format: Option<String>,
        timezone: Timezone,
    },
}

impl VersionStrategy {
    /// Shorthand for a `from_time` strategy in the local timezone.
    pub fn from_time(format: impl Into<String>) -> Self {
        VersionStrategy::FromTime {
            format: Some(format.into()),
            timezone: Timezone::Local,
        }
    }

    /// Produce the version string for the current time.
    pub fn derive(&self) -> Result<String> {
        self.derive_at(Utc::now())
    }

    /// Produce the version string for a fixed instant.
    ///
    /// Fails with [`ReleaseError::Version`] when the format is missing, empty,
    /// or contains a specifier chrono does not understand. A format of only
    /// whitespace is valid and renders as itself.
    pub fn derive_at(&self, now: DateTime<Utc>) -> Result<String> {
        match self {
            VersionStrategy::FromTime { format, timezone } => {
                let format = format
                    .as_deref()
                    .filter(|f| !f.is_empty())
                    .ok_or_else(|| {
                        ReleaseError::Version(
                            "version.from_time must be a non-empty format string".to_string(),
                        )
                    })?;

                match timezone {
                    Timezone::Local => format_time(&now.with_timezone(&Local), format),
                    Timezone::Utc => format_time(&now, format),
                }
            }
        }
    }
}

fn format_time<Tz>(time: &DateTime<Tz>, format: &str) -> Result<String>
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(ReleaseError::Version(format!(
            "invalid time format '{}'",
            format
        )));
    }

    let mut version = String::new();
    write!(version, "{}", time.format_with_items(items.iter())).map_err(|_| {
        ReleaseError::Version(format!("time format '{}' cannot be rendered", format))
    })?;
    Ok(version)
}
