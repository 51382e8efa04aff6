//! Error types for resolution, rendering and configuration

use smores_schema::SchemaError;
use smores_templating::TemplatingError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for smores operations
pub type Result<T> = std::result::Result<T, SmoresError>;

/// Result type for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors returned to callers of the render and registration surfaces
#[derive(Debug, Error)]
pub enum SmoresError {
    /// A call-level input had the wrong shape
    #[error("invalid input: {0}")]
    InputType(String),

    /// Schema building, loading or registration failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Tag syntax or template evaluation failed
    #[error(transparent)]
    Templating(#[from] TemplatingError),

    /// A path did not resolve against the schema graph
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A pre-processor pattern failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a path does not resolve against the schema graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No registered schema has the root name
    #[error("no schema named '{name}' is registered")]
    UnknownRoot {
        /// The root name as written
        name: String,
    },

    /// The root of a tag carried an index
    #[error("root '{name}' cannot be indexed")]
    IndexedRoot {
        /// The root name as written
        name: String,
    },

    /// The current schema has no such field
    #[error("schema '{schema}' has no field '{field}'")]
    UnknownField {
        /// Schema being walked
        schema: String,
        /// Requested field
        field: String,
    },

    /// An index on a field that is not a list
    #[error("field '{field}' of schema '{schema}' is not a list and cannot be indexed")]
    IndexNotAllowed {
        /// Schema being walked
        schema: String,
        /// Indexed field
        field: String,
    },

    /// Steps after a scalar or template field
    #[error("field '{field}' of schema '{schema}' has nothing to continue into")]
    TrailingSteps {
        /// Schema owning the terminal field
        schema: String,
        /// The terminal field
        field: String,
    },

    /// A nested field names a schema that is not registered
    #[error("field '{field}' refers to unknown schema '{target}'")]
    UnresolvedReference {
        /// The nested field
        field: String,
        /// The referenced schema name
        target: String,
    },
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        /// Underlying figment error
        source: figment::Error,
    },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat {
        /// The offending file
        path: PathBuf,
    },

    /// The working directory could not be determined
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError { source: error }
    }
}
