//! Implementation of the `release validate` command.

use release_runner::config::ReleaseConfig;
use release_runner::error::Result;
use std::path::Path;

pub fn cmd_validate(file: &Path) -> Result<()> {
    let shown = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    println!("Validating {}", shown.display());

    let config = ReleaseConfig::load(file)?;
    tracing::debug!(
        steps = config.steps.len(),
        variables = config.variables.len(),
        "release file parsed"
    );

    println!("Configuration file seems valid!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_runner::error::ReleaseError;
    use tempfile::TempDir;

    #[test]
    fn valid_file_passes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.yaml");
        std::fs::write(
            &path,
            "version:\n  from_time: \"%Y.%m.%d\"\nsteps:\n  - title: Tag\n",
        )
        .unwrap();

        assert!(cmd_validate(&path).is_ok());
    }

    #[test]
    fn invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.yaml");
        std::fs::write(
            &path,
            "version:\n  from_time: \"%Y\"\nsteps:\n  - title: Note\n    set_variable: x\n",
        )
        .unwrap();

        let err = cmd_validate(&path).unwrap_err();
        assert!(matches!(err, ReleaseError::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = cmd_validate(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read release file"));
    }
}
