//! Bulk loading of schema definitions from a directory.

use crate::definition::SchemaDefinition;
use crate::error::{Result, SchemaError};
use crate::registry::SchemaRegistry;
use crate::types::SchemaDescriptor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Loads every `.yaml`/`.yml` schema definition under a directory.
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    root: PathBuf,
    strict: bool,
}

impl SchemaLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            strict: false,
        }
    }

    /// Fail on the first invalid definition instead of skipping it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load all definitions, sorted by file path.
    pub fn load(&self) -> Result<Vec<SchemaDescriptor>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_definition(entry.path()) => {
                    paths.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) if !self.strict => {
                    tracing::warn!(path = ?e.path(), %e, "skipping unreadable schema directory entry");
                }
                Err(e) => return Err(SchemaError::Io(e.into())),
            }
        }
        paths.sort();

        let mut schemas = Vec::with_capacity(paths.len());
        for path in paths {
            match load_file(&path) {
                Ok(schema) => {
                    tracing::debug!(?path, schema = schema.name(), "loaded schema definition");
                    schemas.push(schema);
                }
                Err(e) if !self.strict => {
                    tracing::warn!(?path, %e, "skipping invalid schema definition");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(schemas)
    }

    /// Load all definitions and register them.
    pub fn register_into(&self, registry: &mut SchemaRegistry) -> Result<Vec<Arc<SchemaDescriptor>>> {
        let schemas = self.load()?;
        Ok(schemas
            .into_iter()
            .map(|schema| registry.register(schema))
            .collect())
    }
}

fn is_definition(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn load_file(path: &Path) -> Result<SchemaDescriptor> {
    let content = std::fs::read_to_string(path)?;
    let definition: SchemaDefinition =
        serde_yaml_ng::from_str(&content).map_err(|source| SchemaError::Definition {
            path: path.to_path_buf(),
            source,
        })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    definition.into_descriptor(base_dir)
}
