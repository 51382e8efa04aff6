//! Configuration loading using Figment
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. `smores.toml`, `smores.yaml`, `smores.yml`, `smores.json` in the working directory,
//!    or one explicitly named file
//! 3. Environment variables with the `SMORES_` prefix

use crate::error::{ConfigError, ConfigResult};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use smores_schema::DEFAULT_DISPLAY_FIELD;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Prefix of environment variables read by [`SmoresConfig::load`].
pub const ENV_PREFIX: &str = "SMORES_";

/// Base name of configuration files.
pub const CONFIG_FILE_STEM: &str = "smores";

/// Settings for a [`Smores`](crate::Smores) instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoresConfig {
    /// Text rendered in place of tags that do not resolve.
    pub fallback: String,
    /// Key under which records expose their default display.
    pub default_display_field: String,
    /// Directories of YAML schema definitions to register.
    pub schema_dirs: Vec<PathBuf>,
}

impl Default for SmoresConfig {
    fn default() -> Self {
        Self {
            fallback: String::new(),
            default_display_field: DEFAULT_DISPLAY_FIELD.to_string(),
            schema_dirs: Vec::new(),
        }
    }
}

impl SmoresConfig {
    /// Load from the current directory and the environment.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from_dir(&std::env::current_dir()?)
    }

    /// Load from config files in `dir` and the environment.
    pub fn load_from_dir(dir: &Path) -> ConfigResult<Self> {
        debug!(dir = %dir.display(), "loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        for (ext, path) in ["toml", "yaml", "yml", "json"]
            .iter()
            .map(|ext| (*ext, dir.join(format!("{CONFIG_FILE_STEM}.{ext}"))))
            .filter(|(_, path)| path.is_file())
        {
            trace!(path = %path.display(), "loading config file");
            figment = figment.merge(file_provider(ext, &path)?);
        }
        Self::extract(figment)
    }

    /// Load from one explicit file and the environment.
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(file_provider(&ext, path)?);
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> ConfigResult<Self> {
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
            .extract()?;
        debug!(
            schema_dirs = config.schema_dirs.len(),
            display_field = %config.default_display_field,
            "configuration loaded"
        );
        Ok(config)
    }
}

fn file_provider(ext: &str, path: &Path) -> ConfigResult<Figment> {
    match ext {
        "toml" => Ok(Figment::from(Toml::file(path))),
        "yaml" | "yml" => Ok(Figment::from(Yaml::file(path))),
        "json" => Ok(Figment::from(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
