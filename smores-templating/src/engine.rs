//! Template engine for rendering expanded templates
//!
//! Wraps a Liquid parser with the standard library plus the `fallback` filter.

use crate::error::{Result, TemplatingError};
use crate::expand::finalize_outputs;
use crate::filters::FallbackFilterParser;
use crate::view::DataNode;
use std::sync::Arc;

/// Template engine with Liquid configuration
pub struct TemplateEngine {
    parser: liquid::Parser,
    display_key: Arc<str>,
}

impl TemplateEngine {
    /// Create an engine whose records render through `display_key`.
    pub fn new(display_key: impl Into<Arc<str>>) -> Result<Self> {
        let display_key = display_key.into();
        let parser = liquid::ParserBuilder::with_stdlib()
            .filter(FallbackFilterParser::new(Arc::clone(&display_key)))
            .build()
            .map_err(|e| TemplatingError::Parse(e.to_string()))?;
        Ok(Self {
            parser,
            display_key,
        })
    }

    /// The default-display field name records render through.
    pub fn display_key(&self) -> &Arc<str> {
        &self.display_key
    }

    /// Parse a template string. Every output is finalized, so records and
    /// lists print their default display.
    pub fn parse(&self, template_str: &str) -> Result<liquid::Template> {
        self.parser
            .parse(&finalize_outputs(template_str))
            .map_err(|e| TemplatingError::Parse(e.to_string()))
    }

    /// Render a template string against a data tree.
    pub fn render(&self, template_str: &str, globals: &DataNode) -> Result<String> {
        let template = self.parse(template_str)?;
        template
            .render(globals)
            .map_err(|e| TemplatingError::Render(e.to_string()))
    }

    /// Render against plain JSON, converted without a schema.
    pub fn render_json(&self, template_str: &str, data: &serde_json::Value) -> Result<String> {
        let globals = DataNode::from_json(data, &self.display_key);
        self.render(template_str, &globals)
    }

    /// Get a reference to the underlying parser
    pub fn parser(&self) -> &liquid::Parser {
        &self.parser
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("display_key", &self.display_key)
            .finish_non_exhaustive()
    }
}
