//! Schema model and registry for smores tag templates
//!
//! `smores-schema` describes the record shapes that `{tag}` paths walk through.
//! It knows nothing about templates or data; it only answers "which fields does
//! this record type have, and what kind is each one".
//!
//! # Architecture
//!
//! - **Typed fields**: every field is a [`FieldKind`] (scalar, nested, nested list, template)
//! - **Lazy references**: nested fields point at a schema, a schema name, or `SelfRef`
//! - **Explicit registry**: a [`SchemaRegistry`] value with scoped temporary registration
//! - **YAML on disk**: one `.yaml` definition per schema, bulk loaded with [`SchemaLoader`]

pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;
pub mod types;

pub use definition::{FieldDefinition, FieldTypeDefinition, SchemaDefinition};
pub use error::{Result, SchemaError};
pub use loader::SchemaLoader;
pub use registry::{SchemaRegistry, TemporarySchemas};
pub use types::{
    is_tag_name, FieldDef, FieldKind, SchemaBuilder, SchemaDescriptor, SchemaRef,
    DEFAULT_DISPLAY_FIELD,
};
