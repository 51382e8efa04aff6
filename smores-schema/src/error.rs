//! Error types for the schema model and registry

use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors that can occur while building, loading or registering schemas
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two fields of one schema share a name (compared case-insensitively)
    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    /// A schema or field name that tags cannot address
    #[error("invalid name '{name}': names may only contain ASCII letters, digits and '_'")]
    InvalidName { name: String },

    /// The designated default-display field is not declared on the schema
    #[error("schema '{schema}' has no field named '{field}' to use as default display")]
    UnknownDisplayField { schema: String, field: String },

    /// Unregistering a schema that was never registered
    #[error("schema '{name}' is not registered")]
    NotRegistered { name: String },

    /// A template field definition without text or file
    #[error("template field '{field}' in schema '{schema}' needs either `text` or `file`")]
    MissingTemplate { schema: String, field: String },

    /// Schema definition file could not be parsed
    #[error("invalid schema definition {path}: {source}")]
    Definition {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}
