//! The [`Smores`] facade
//!
//! Owns a schema registry, a template engine and the default fallback, and
//! exposes the render, autocomplete and resolve operations over them.

use crate::autocomplete::{autocomplete, AutocompleteState, RootFilter};
use crate::config::SmoresConfig;
use crate::error::Result;
use crate::render::{RenderOptions, Renderer};
use crate::resolver::{PathResolver, Resolution};
use serde_json::Value;
use smores_schema::{SchemaDescriptor, SchemaLoader, SchemaRegistry, DEFAULT_DISPLAY_FIELD};
use smores_templating::{parse_path, Fallback, PathStep, TemplateEngine};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Schema-aware tag templates.
///
/// ```
/// use serde_json::json;
/// use smores::{SchemaDescriptor, Smores};
///
/// let mut smores = Smores::new().unwrap();
/// smores.register(
///     SchemaDescriptor::builder("User")
///         .scalar("name")
///         .build()
///         .unwrap(),
/// );
/// let out = smores
///     .render(&json!({"user": {"name": "Leanne Graham"}}), "Hi {user.name}")
///     .unwrap();
/// assert_eq!(out, "Hi Leanne Graham");
/// ```
#[derive(Debug)]
pub struct Smores {
    registry: SchemaRegistry,
    engine: TemplateEngine,
    fallback: Fallback,
}

impl Smores {
    /// An instance with an empty registry, the standard display field and an
    /// empty fallback.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Configure a new instance.
    pub fn builder() -> SmoresBuilder {
        SmoresBuilder::default()
    }

    /// Build from loaded configuration, registering every schema found in its
    /// schema directories.
    pub fn from_config(config: &SmoresConfig) -> Result<Self> {
        let mut smores = Self::builder()
            .fallback(config.fallback.as_str())
            .default_display_field(config.default_display_field.as_str())
            .build()?;
        for dir in &config.schema_dirs {
            smores.load_schema_dir(dir)?;
        }
        Ok(smores)
    }

    /// A borrowed view for running operations.
    pub fn session(&self) -> Session<'_> {
        Session {
            registry: &self.registry,
            engine: &self.engine,
            fallback: &self.fallback,
        }
    }

    /// The schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Mutable access to the schema registry.
    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    /// The template engine.
    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// The fallback used when a call does not override it.
    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// Register a schema and hand it back.
    pub fn register(&mut self, schema: impl Into<Arc<SchemaDescriptor>>) -> Arc<SchemaDescriptor> {
        self.registry.register(schema)
    }

    /// Register several schemas.
    pub fn register_all<I>(&mut self, schemas: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<SchemaDescriptor>>,
    {
        self.registry.register_all(schemas);
    }

    /// Remove a registered schema.
    pub fn unregister(&mut self, schema: &Arc<SchemaDescriptor>) -> Result<()> {
        Ok(self.registry.unregister(schema)?)
    }

    /// Register every schema defined in a directory of YAML files.
    pub fn load_schema_dir(
        &mut self,
        dir: impl AsRef<Path>,
    ) -> Result<Vec<Arc<SchemaDescriptor>>> {
        let dir = dir.as_ref();
        let registered = SchemaLoader::new(dir).register_into(&mut self.registry)?;
        info!(
            dir = %dir.display(),
            count = registered.len(),
            "registered schemas from directory"
        );
        Ok(registered)
    }

    /// Run `body` with `schemas` registered, removing them afterwards on every
    /// exit path.
    pub fn with_schemas<I, F, R>(&mut self, schemas: I, body: F) -> R
    where
        I: IntoIterator,
        I::Item: Into<Arc<SchemaDescriptor>>,
        F: FnOnce(Session<'_>) -> R,
    {
        let guard = self.registry.scoped(schemas);
        debug!(count = guard.added().len(), "running with temporary schemas");
        body(Session {
            registry: &guard,
            engine: &self.engine,
            fallback: &self.fallback,
        })
    }

    /// Render `template` with `data`, an object keyed by root schema name.
    pub fn render(&self, data: &Value, template: &str) -> Result<String> {
        self.session().render(data, template)
    }

    /// Render with sub-templates, a fallback override or a pre-processor.
    pub fn render_with(
        &self,
        data: &Value,
        template: &str,
        options: &RenderOptions,
    ) -> Result<String> {
        self.session().render_with(data, template, options)
    }

    /// Complete a partially typed tag.
    pub fn autocomplete(&self, fragment: &str) -> AutocompleteState {
        self.session().autocomplete(fragment)
    }

    /// Complete a partially typed tag, restricting the root schemas offered.
    pub fn autocomplete_filtered(&self, fragment: &str, filter: &RootFilter) -> AutocompleteState {
        self.session().autocomplete_filtered(fragment, filter)
    }

    /// Resolve `path` below the root schema `root_name`.
    pub fn resolve(&self, root_name: &str, path: &[PathStep]) -> Result<Resolution> {
        self.session().resolve(root_name, path)
    }

    /// Parse and resolve a dotted path such as `user.dogs:1.name`.
    pub fn resolve_path(&self, path: &str) -> Result<Resolution> {
        self.session().resolve_path(path)
    }

    /// Expand the tags in `template` into engine syntax without evaluating it.
    pub fn expand(&self, template: &str) -> Result<String> {
        self.session().expand(template)
    }
}

/// Operations over borrowed registry, engine and fallback.
///
/// Obtained from [`Smores::session`] or inside [`Smores::with_schemas`].
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    registry: &'a SchemaRegistry,
    engine: &'a TemplateEngine,
    fallback: &'a Fallback,
}

impl<'a> Session<'a> {
    /// The registry operations run against.
    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    fn renderer(&self) -> Renderer<'a> {
        Renderer::new(self.registry, self.engine, self.fallback)
    }

    /// See [`Smores::render`].
    pub fn render(&self, data: &Value, template: &str) -> Result<String> {
        self.render_with(data, template, &RenderOptions::default())
    }

    /// See [`Smores::render_with`].
    pub fn render_with(
        &self,
        data: &Value,
        template: &str,
        options: &RenderOptions,
    ) -> Result<String> {
        self.renderer().render(data, template, options)
    }

    /// See [`Smores::autocomplete`].
    pub fn autocomplete(&self, fragment: &str) -> AutocompleteState {
        autocomplete(self.registry, fragment, &RootFilter::default())
    }

    /// See [`Smores::autocomplete_filtered`].
    pub fn autocomplete_filtered(&self, fragment: &str, filter: &RootFilter) -> AutocompleteState {
        autocomplete(self.registry, fragment, filter)
    }

    /// See [`Smores::resolve`].
    pub fn resolve(&self, root_name: &str, path: &[PathStep]) -> Result<Resolution> {
        Ok(PathResolver::new(self.registry).resolve(root_name, path)?)
    }

    /// See [`Smores::resolve_path`].
    pub fn resolve_path(&self, path: &str) -> Result<Resolution> {
        let path = parse_path(path)?;
        Ok(PathResolver::new(self.registry).resolve_tag(&path)?)
    }

    /// See [`Smores::expand`].
    pub fn expand(&self, template: &str) -> Result<String> {
        self.renderer().expand(template, self.fallback)
    }
}

/// Builder for [`Smores`].
#[derive(Debug, Clone)]
pub struct SmoresBuilder {
    fallback: Fallback,
    default_display_field: String,
    schemas: Vec<Arc<SchemaDescriptor>>,
}

impl Default for SmoresBuilder {
    fn default() -> Self {
        Self {
            fallback: Fallback::default(),
            default_display_field: DEFAULT_DISPLAY_FIELD.to_string(),
            schemas: Vec::new(),
        }
    }
}

impl SmoresBuilder {
    /// Text or function used for tags that do not resolve.
    pub fn fallback(mut self, fallback: impl Into<Fallback>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Key under which records expose their default display.
    pub fn default_display_field(mut self, name: impl Into<String>) -> Self {
        self.default_display_field = name.into();
        self
    }

    /// Register `schema` when the instance is built.
    pub fn schema(mut self, schema: impl Into<Arc<SchemaDescriptor>>) -> Self {
        self.schemas.push(schema.into());
        self
    }

    /// Build the instance.
    pub fn build(self) -> Result<Smores> {
        let engine = TemplateEngine::new(self.default_display_field.to_ascii_lowercase())?;
        let mut registry = SchemaRegistry::new();
        registry.register_all(self.schemas);
        Ok(Smores {
            registry,
            engine,
            fallback: self.fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> SchemaDescriptor {
        SchemaDescriptor::builder("User")
            .scalars(["name", "email"])
            .default_template("{{name}}---{{email}}")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_registers_schemas() {
        let smores = Smores::builder()
            .fallback("INVALID_TAG")
            .schema(user())
            .build()
            .unwrap();
        assert_eq!(smores.registry().names(), vec!["user"]);
        let out = smores
            .render(&json!({"user": {"name": "Ann"}}), "{user.name} {user.nope}")
            .unwrap();
        assert_eq!(out, "Ann INVALID_TAG");
    }

    #[test]
    fn test_with_schemas_is_scoped() {
        let mut smores = Smores::new().unwrap();
        let out = smores.with_schemas([user()], |session| {
            assert_eq!(session.registry().len(), 1);
            session.render(&json!({"user": {"name": "Ann"}}), "{user.name}")
        });
        assert_eq!(out.unwrap(), "Ann");
        assert!(smores.registry().is_empty());
    }

    #[test]
    fn test_unregister_unknown_schema_is_an_error() {
        let mut smores = Smores::new().unwrap();
        let schema = Arc::new(user());
        assert!(smores.unregister(&schema).is_err());
        smores.register(Arc::clone(&schema));
        smores.unregister(&schema).unwrap();
        assert!(smores.registry().is_empty());
    }

    #[test]
    fn test_custom_display_field_name() {
        let smores = Smores::builder()
            .default_display_field("Label")
            .schema(
                SchemaDescriptor::builder("User")
                    .scalar("name")
                    .template("label", "<{{name}}>")
                    .display_field("label")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let out = smores.render(&json!({"user": {"name": "Ann"}}), "{user}").unwrap();
        assert_eq!(out, "<Ann>");
    }

    #[test]
    fn test_resolve_path() {
        let smores = Smores::builder().schema(user()).build().unwrap();
        assert!(smores.resolve_path("user.name").is_ok());
        assert!(smores.resolve_path("user.nope").is_err());
        assert!(smores.resolve_path("user..name").is_err());
    }
}
