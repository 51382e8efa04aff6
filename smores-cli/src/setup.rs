//! Building a [`Smores`] instance from configuration and command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use smores::{Smores, SmoresConfig};

/// Load configuration from `config_file`, or from the working directory when
/// none is given, and append `extra_schema_dirs`.
pub fn load_config(config_file: Option<&Path>, extra_schema_dirs: &[PathBuf]) -> Result<SmoresConfig> {
    let mut config = match config_file {
        Some(path) => SmoresConfig::load_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => SmoresConfig::load().context("failed to load configuration")?,
    };
    config.schema_dirs.extend(extra_schema_dirs.iter().cloned());
    Ok(config)
}

/// Build an instance with every configured schema directory registered.
pub fn build(config: &SmoresConfig) -> Result<Smores> {
    for dir in &config.schema_dirs {
        if !dir.is_dir() {
            anyhow::bail!("schema directory {} does not exist", dir.display());
        }
    }
    let smores = Smores::from_config(config).context("failed to load schemas")?;
    tracing::debug!(schemas = smores.registry().len(), "schemas registered");
    Ok(smores)
}

/// Read a whole text file, naming it in the error.
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_extra_schema_dirs_are_appended() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("smores.yaml");
        fs::write(&config_path, "fallback: '?'\nschema_dirs: [a]\n").unwrap();

        let config = load_config(Some(&config_path), &[PathBuf::from("b")]).unwrap();
        assert_eq!(config.fallback, "?");
        assert_eq!(config.schema_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn test_missing_schema_dir_is_an_error() {
        let config = SmoresConfig {
            schema_dirs: vec![PathBuf::from("/definitely/not/here")],
            ..SmoresConfig::default()
        };
        let err = build(&config).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_read_json_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json(&path).unwrap_err();
        assert!(err.to_string().contains("data.json"));
    }
}
