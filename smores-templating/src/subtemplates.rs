//! Named text snippets substituted into a template before tags are parsed.
//!
//! Substitution is plain text replacement of `{name}`, so a snippet may itself
//! contain tags. Snippets are applied in insertion order; a snippet whose body
//! contains another snippet's `{name}` is substituted again if that name comes
//! later.

use crate::error::{Result, TemplatingError};
use indexmap::IndexMap;

/// Ordered mapping of snippet name to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubTemplates {
    entries: IndexMap<String, String>,
}

impl SubTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a snippet.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(name.into(), text.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Build from `(name, text)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut subs = Self::new();
        for (name, text) in pairs {
            subs.insert(name, text);
        }
        subs
    }

    /// Accept only a JSON object whose values are all strings.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            TemplatingError::SubTemplates(format!(
                "expected a mapping of names to text, got {}",
                json_type(value)
            ))
        })?;
        let mut subs = Self::new();
        for (name, text) in map {
            let text = text.as_str().ok_or_else(|| {
                TemplatingError::SubTemplates(format!(
                    "value for '{name}' must be text, got {}",
                    json_type(text)
                ))
            })?;
            subs.insert(name.clone(), text);
        }
        Ok(subs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `{name}` with its snippet.
    pub fn apply(&self, template: &str) -> String {
        let mut text = template.to_string();
        for (name, body) in &self.entries {
            let marker = format!("{{{name}}}");
            if text.contains(&marker) {
                tracing::trace!(sub_template = %name, "substituting sub-template");
                text = text.replace(&marker, body);
            }
        }
        text
    }
}

/// JSON type name for error messages.
pub fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
