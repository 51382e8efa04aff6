//! Render orchestration
//!
//! A render runs in a fixed order: validate inputs, substitute sub-templates,
//! expand tags (screening those with registered roots through the resolver),
//! pre-process, build the context from registered roots, evaluate.

use crate::error::{Result, SmoresError};
use crate::resolver::PathResolver;
use crate::serialize::SchemaSerializer;
use serde_json::{Map, Value};
use smores_schema::SchemaRegistry;
use smores_templating::{
    expand_with, json_type, DataNode, Expansion, Fallback, Record, SubTemplates, TagPath,
    TemplateEngine,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A rewrite applied to expanded template text before evaluation.
pub type PreProcess = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Per-call render settings.
#[derive(Clone, Default)]
pub struct RenderOptions {
    /// Snippets substituted for `{name}` before tags are parsed.
    pub sub_templates: SubTemplates,
    /// Overrides the configured fallback for this call.
    pub fallback: Option<Fallback>,
    /// Runs on the expanded text.
    pub pre_process: Option<PreProcess>,
}

impl RenderOptions {
    /// Options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these sub-templates.
    pub fn sub_templates(mut self, sub_templates: SubTemplates) -> Self {
        self.sub_templates = sub_templates;
        self
    }

    /// Use this fallback instead of the configured one.
    pub fn fallback(mut self, fallback: impl Into<Fallback>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Rewrite the expanded text with `f`.
    pub fn pre_process(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.pre_process = Some(Arc::new(f));
        self
    }

    /// Rewrite the expanded text with a shared pre-processor.
    pub fn pre_process_with(mut self, pre_process: PreProcess) -> Self {
        self.pre_process = Some(pre_process);
        self
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("sub_templates", &self.sub_templates)
            .field("fallback", &self.fallback)
            .field("pre_process", &self.pre_process.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Renders templates against one registry and engine.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    registry: &'a SchemaRegistry,
    engine: &'a TemplateEngine,
    fallback: &'a Fallback,
}

impl<'a> Renderer<'a> {
    /// A renderer using `fallback` unless a call overrides it.
    pub fn new(
        registry: &'a SchemaRegistry,
        engine: &'a TemplateEngine,
        fallback: &'a Fallback,
    ) -> Self {
        Self {
            registry,
            engine,
            fallback,
        }
    }

    /// Render `template` with `data`, an object keyed by root schema name.
    pub fn render(&self, data: &Value, template: &str, options: &RenderOptions) -> Result<String> {
        let Value::Object(data) = data else {
            return Err(SmoresError::InputType(format!(
                "data must be an object keyed by schema name, got {}",
                json_type(data)
            )));
        };
        let fallback = options.fallback.as_ref().unwrap_or(self.fallback);

        let text = options.sub_templates.apply(template);
        let mut text = self.expand(&text, fallback)?;
        if let Some(pre_process) = &options.pre_process {
            text = pre_process(&text);
        }
        let context = self.context(data)?;
        Ok(self.engine.render(&text, &context)?)
    }

    /// Expand tags, replacing those that cannot resolve with the bare fallback.
    ///
    /// Tags whose root is not a registered schema are left to evaluation; they
    /// may name a loop variable.
    pub fn expand(&self, template: &str, fallback: &Fallback) -> Result<String> {
        let resolver = PathResolver::new(self.registry);
        Ok(expand_with(template, fallback, |path| {
            screen(&resolver, path)
        })?)
    }

    /// Serialize each entry of `data` whose name is a registered schema.
    pub fn context(&self, data: &Map<String, Value>) -> Result<DataNode> {
        let serializer = SchemaSerializer::new(PathResolver::new(self.registry), self.engine);
        let mut globals = Record::new(Arc::clone(self.engine.display_key()));
        for (name, value) in data {
            match self.registry.lookup_by_name(name) {
                Some(schema) => globals.insert(name, serializer.dump(schema, value)?),
                None => debug!(name = %name, "no schema registered for data; dropped"),
            }
        }
        Ok(DataNode::Record(globals))
    }
}

fn screen(resolver: &PathResolver<'_>, path: &TagPath) -> Expansion {
    if resolver.registry().lookup_by_name(&path.root().name).is_none() {
        return Expansion::Lookup(path.clone());
    }
    match resolver.resolve_tag(path) {
        Ok(resolution) if !resolution.through_unindexed_list => {
            Expansion::Lookup(resolution.to_tag_path())
        }
        Ok(_) => {
            debug!(tag = %path, "tag crosses a list without an index");
            Expansion::Unresolved
        }
        Err(e) => {
            debug!(tag = %path, error = %e, "tag does not resolve");
            Expansion::Unresolved
        }
    }
}
