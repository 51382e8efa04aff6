//! # smores
//!
//! Schema-aware tag templates. Authors write compact tags such as
//! `{user.dogs:1.name}`; smores resolves them against a graph of typed schemas,
//! expands them into Liquid and renders them against live data. Tags that do
//! not resolve render a configurable fallback instead of failing.
//!
//! ## Features
//!
//! - **Tag rendering**: case-insensitive names, 1-based indices, sub-templates and pre-processors
//! - **Autocomplete**: validity, the longest resolved prefix and next-step candidates
//! - **Schemas**: built in code or loaded from YAML, registered permanently or for one call
//! - **Configuration**: fallback, display field and schema directories via files and `SMORES_*`
//!
//! ## Quick Start
//!
//! ```
//! use serde_json::json;
//! use smores::{SchemaDescriptor, SchemaRef, Smores};
//!
//! let mut smores = Smores::builder().fallback("?").build().unwrap();
//! smores.register(
//!     SchemaDescriptor::builder("Dog")
//!         .scalar("name")
//!         .default_template("Name: {{name}}")
//!         .build()
//!         .unwrap(),
//! );
//! smores.register(
//!     SchemaDescriptor::builder("User")
//!         .scalar("name")
//!         .nested_many("dogs", SchemaRef::named("dog"))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let data = json!({"user": {"name": "Leanne", "dogs": [{"name": "Rufus"}, {"name": "Spot"}]}});
//! let out = smores.render(&data, "{user.name}: {user.dogs:2.name} {user.cats}").unwrap();
//! assert_eq!(out, "Leanne: Spot ?");
//!
//! let state = smores.autocomplete("user.do");
//! assert_eq!(state.options, vec!["dogs"]);
//! ```

#![warn(missing_docs)]

/// Tag autocompletion
pub mod autocomplete;

/// Configuration loading
pub mod config;

/// Error types
pub mod error;

/// The `Smores` facade
pub mod library;

/// Pre-processors applied to expanded text
pub mod preprocess;

/// Render orchestration
pub mod render;

/// Path resolution against the schema graph
pub mod resolver;

/// Serializing data through schemas
pub mod serialize;

pub use autocomplete::{autocomplete, AutocompleteState, RootFilter, Status, INDEX_HINT};
pub use config::SmoresConfig;
pub use error::{ConfigError, ConfigResult, ResolveError, Result, SmoresError};
pub use library::{Session, Smores, SmoresBuilder};
pub use preprocess::{loop_table_rows, table_loops, TableLoop};
pub use render::{PreProcess, RenderOptions, Renderer};
pub use resolver::{Endpoint, PathResolver, Resolution, Step};
pub use serialize::SchemaSerializer;

pub use smores_schema::{
    FieldDef, FieldKind, SchemaBuilder, SchemaDescriptor, SchemaLoader, SchemaRef, SchemaRegistry,
    DEFAULT_DISPLAY_FIELD,
};
pub use smores_templating::{
    expand, parse_tag, DataNode, Fallback, PathStep, SubTemplates, TagPath, TemplateEngine,
};
