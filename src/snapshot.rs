//! Variable snapshots for resuming a run.
//!
//! A snapshot is the variable environment serialized as a flat JSON object,
//! keys in insertion order. Injecting one replaces the freshly derived
//! initial variables entirely.
//!
//! Writes go through a temporary file in the same directory followed by a
//! rename, so an interrupted save never leaves a truncated snapshot behind.

use crate::error::{ReleaseError, Result};
use crate::variables::{VERSION_VARIABLE, Variables};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Parse a snapshot from JSON text.
pub fn from_json(json: &str) -> Result<Variables> {
    let variables: Variables = serde_json::from_str(json)
        .map_err(|e| ReleaseError::Config(format!("failed to parse variable snapshot: {}", e)))?;

    if !variables.contains_key(VERSION_VARIABLE) {
        return Err(ReleaseError::Config(format!(
            "variable snapshot has no '{}' entry",
            VERSION_VARIABLE
        )));
    }

    Ok(variables)
}

/// Serialize variables to pretty-printed JSON.
pub fn to_json(variables: &Variables) -> Result<String> {
    serde_json::to_string_pretty(variables)
        .map_err(|e| ReleaseError::Io(format!("failed to serialize variables: {}", e)))
}

/// Load a snapshot file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Variables> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        ReleaseError::Io(format!(
            "failed to read variable snapshot '{}': {}",
            path.display(),
            e
        ))
    })?;
    from_json(&content)
}

/// Save a snapshot file, replacing any previous one.
pub fn save<P: AsRef<Path>>(path: P, variables: &Variables) -> Result<()> {
    let path = path.as_ref();
    let mut json = to_json(variables)?;
    json.push('\n');

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            ReleaseError::Io(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, json.as_bytes())?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ReleaseError::Io(format!(
            "failed to replace variable snapshot '{}': {}",
            path.display(),
            e
        ))
    })
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ReleaseError::Io(format!("invalid snapshot path '{}'", target.display()))
        })?;
    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        ReleaseError::Io(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content)
        .and_then(|_| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            ReleaseError::Io(format!("failed to write temporary file: {}", e))
        })
}
