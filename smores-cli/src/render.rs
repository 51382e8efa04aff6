//! The `render` and `expand` commands.

use std::path::Path;

use anyhow::{Context, Result};
use smores::{table_loops, Fallback, RenderOptions, Renderer, Smores, SubTemplates, TableLoop};

use crate::setup::{read_json, read_text};

/// Inputs of the `render` command.
#[derive(Debug, Clone, Copy)]
pub struct RenderArgs<'a> {
    pub template: &'a Path,
    pub data: &'a Path,
    pub sub_templates: Option<&'a Path>,
    pub fallback: Option<&'a str>,
    pub echo_tags: bool,
    pub table_loops: &'a [String],
}

impl<'a> RenderArgs<'a> {
    pub fn new(template: &'a Path, data: &'a Path) -> Self {
        Self {
            template,
            data,
            sub_templates: None,
            fallback: None,
            echo_tags: false,
            table_loops: &[],
        }
    }
}

/// Render a template file against a JSON data file.
pub fn run_render(smores: &Smores, args: &RenderArgs<'_>) -> Result<String> {
    let template = read_text(args.template)?;
    let data = read_json(args.data)?;

    let mut options = RenderOptions::new();
    if let Some(path) = args.sub_templates {
        let sub_templates = SubTemplates::from_json(&read_json(path)?)
            .with_context(|| format!("invalid sub-templates in {}", path.display()))?;
        options = options.sub_templates(sub_templates);
    }
    if let Some(fallback) = fallback_override(args.fallback, args.echo_tags) {
        options = options.fallback(fallback);
    }
    if !args.table_loops.is_empty() {
        let loops = args
            .table_loops
            .iter()
            .map(|spec| parse_table_loop(spec))
            .collect::<Result<Vec<_>>>()?;
        options = options.pre_process_with(table_loops(loops));
    }

    smores
        .render_with(&data, &template, &options)
        .with_context(|| format!("failed to render {}", args.template.display()))
}

/// Expand the tags of a template file without rendering it.
pub fn run_expand(smores: &Smores, template: &Path, fallback: Option<&str>) -> Result<String> {
    let text = read_text(template)?;
    let fallback = fallback_override(fallback, false).unwrap_or_else(|| smores.fallback().clone());
    Renderer::new(smores.registry(), smores.engine(), &fallback)
        .expand(&text, &fallback)
        .with_context(|| format!("failed to expand {}", template.display()))
}

fn fallback_override(fallback: Option<&str>, echo_tags: bool) -> Option<Fallback> {
    if echo_tags {
        Some(Fallback::echo_tag())
    } else {
        fallback.map(Fallback::literal)
    }
}

/// Parse `ITERATOR=ITERABLE`; rows with a cell that outputs the iterator are looped.
pub fn parse_table_loop(spec: &str) -> Result<TableLoop> {
    let (iterator, iterable) = spec
        .split_once('=')
        .map(|(a, b)| (a.trim(), b.trim()))
        .filter(|(a, b)| !a.is_empty() && !b.is_empty())
        .with_context(|| format!("table loop '{spec}' is not ITERATOR=ITERABLE"))?;
    Ok(TableLoop::for_iterator(iterator, iterable)?)
}
