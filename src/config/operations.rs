//! Release file loading and validation.

use super::model::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use std::path::Path;

impl ReleaseConfig {
    /// Load a release file from disk.
    ///
    /// # Returns
    ///
    /// * `Ok(ReleaseConfig)` - Successfully loaded and validated release file
    /// * `Err(ReleaseError::Config)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ReleaseError::Config(format!(
                "failed to read release file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a release file from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ReleaseConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ReleaseError::Config(format!("invalid release file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every step, reporting the 1-based step number on failure.
    ///
    /// Parsing already enforces these rules per step; this also covers
    /// configs assembled in code.
    pub fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            step.validate().map_err(|e| {
                ReleaseError::Config(format!("step {}: {}", index + 1, e))
            })?;
        }
        Ok(())
    }
}
