//! Serializing JSON data through a schema
//!
//! Only declared fields survive. Nested fields are dumped through their target
//! schema, template fields are rendered from the record's other fields, and the
//! schema's default-display field is exposed under the engine's display key.

use crate::error::Result;
use crate::resolver::PathResolver;
use serde_json::{Map, Value};
use smores_schema::{FieldDef, FieldKind, SchemaDescriptor};
use smores_templating::{expand, json_type, DataNode, Fallback, Record, TemplateEngine};
use std::sync::Arc;
use tracing::{trace, warn};

/// Dumps data into the view tree the template engine reads.
#[derive(Debug, Clone, Copy)]
pub struct SchemaSerializer<'a> {
    resolver: PathResolver<'a>,
    engine: &'a TemplateEngine,
}

impl<'a> SchemaSerializer<'a> {
    /// A serializer resolving named references through `resolver`.
    pub fn new(resolver: PathResolver<'a>, engine: &'a TemplateEngine) -> Self {
        Self { resolver, engine }
    }

    /// Serialize `value` as an instance of `schema`.
    ///
    /// Null becomes a missing node. Values that are not objects are logged and
    /// treated as missing.
    pub fn dump(&self, schema: &Arc<SchemaDescriptor>, value: &Value) -> Result<DataNode> {
        match value {
            Value::Object(map) => Ok(DataNode::Record(self.dump_record(schema, map)?)),
            Value::Null => Ok(DataNode::Missing),
            other => {
                warn!(
                    schema = schema.name(),
                    found = json_type(other),
                    "expected an object; value ignored"
                );
                Ok(DataNode::Missing)
            }
        }
    }

    fn dump_record(
        &self,
        schema: &Arc<SchemaDescriptor>,
        map: &Map<String, Value>,
    ) -> Result<Record> {
        let display_key = self.engine.display_key();
        let mut record = Record::new(Arc::clone(display_key));
        let mut templates = Vec::new();

        for field in schema.fields() {
            let value = lookup(map, &field.name);
            let node = match &field.kind {
                FieldKind::Scalar => value
                    .map(|v| DataNode::from_json(v, display_key))
                    .unwrap_or(DataNode::Missing),
                FieldKind::NestedOne(_) => self.dump_nested(schema, field, value)?,
                FieldKind::NestedMany(_) => self.dump_many(schema, field, value)?,
                FieldKind::Template { .. } => {
                    templates.push(field);
                    continue;
                }
            };
            record.insert(&field.name, node);
        }

        if !templates.is_empty() {
            let context = DataNode::Record(record.clone());
            for field in templates {
                let text = self.render_template(field, &context)?;
                record.insert(&field.name, DataNode::text(text));
            }
        }

        if let Some(display) = schema.default_display() {
            if !display.eq_ignore_ascii_case(display_key) {
                if let Some(node) = record.get(display).cloned() {
                    record.insert(display_key, node);
                }
            }
        }
        Ok(record)
    }

    fn dump_nested(
        &self,
        owner: &Arc<SchemaDescriptor>,
        field: &FieldDef,
        value: Option<&Value>,
    ) -> Result<DataNode> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(DataNode::Missing);
        };
        match self.resolver.target(owner, field) {
            Ok(target) => self.dump(&target, value),
            Err(e) => {
                warn!(error = %e, "nested schema not registered; using raw data");
                Ok(DataNode::from_json(value, self.engine.display_key()))
            }
        }
    }

    fn dump_many(
        &self,
        owner: &Arc<SchemaDescriptor>,
        field: &FieldDef,
        value: Option<&Value>,
    ) -> Result<DataNode> {
        let items = match value {
            None | Some(Value::Null) => return Ok(DataNode::Missing),
            Some(Value::Array(items)) => items,
            Some(other) => {
                warn!(
                    schema = owner.name(),
                    field = %field.name,
                    found = json_type(other),
                    "expected a list; value ignored"
                );
                return Ok(DataNode::Missing);
            }
        };
        match self.resolver.target(owner, field) {
            Ok(target) => items
                .iter()
                .map(|item| self.dump(&target, item))
                .collect::<Result<Vec<_>>>()
                .map(DataNode::List),
            Err(e) => {
                warn!(error = %e, "nested schema not registered; using raw data");
                Ok(DataNode::List(
                    items
                        .iter()
                        .map(|item| DataNode::from_json(item, self.engine.display_key()))
                        .collect(),
                ))
            }
        }
    }

    fn render_template(&self, field: &FieldDef, context: &DataNode) -> Result<String> {
        let FieldKind::Template {
            text,
            uses_tag_syntax,
        } = &field.kind
        else {
            return Ok(String::new());
        };
        trace!(field = %field.name, "rendering template field");
        let rendered = if *uses_tag_syntax {
            let expanded = expand(text, &Fallback::default())?;
            self.engine.render(&expanded, context)?
        } else {
            self.engine.render(text, context)?
        };
        Ok(rendered)
    }
}

/// Exact key first, then a case-insensitive match.
fn lookup<'v>(map: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}
