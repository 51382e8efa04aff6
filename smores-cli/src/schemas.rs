//! The `schemas` command.

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use smores::{SchemaDescriptor, Smores};

#[derive(Debug, Serialize)]
struct SchemaSummary<'a> {
    name: &'a str,
    display: Option<&'a str>,
    fields: Vec<FieldSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct FieldSummary<'a> {
    name: &'a str,
    kind: String,
}

fn summarize(schema: &SchemaDescriptor) -> SchemaSummary<'_> {
    SchemaSummary {
        name: schema.name(),
        display: schema.default_display(),
        fields: schema
            .fields()
            .map(|field| FieldSummary {
                name: &field.name,
                kind: field.kind.label(),
            })
            .collect(),
    }
}

/// List registered schemas, sorted by name.
pub fn run_schemas(smores: &Smores, json: bool) -> Result<String> {
    let mut schemas: Vec<_> = smores.registry().all().iter().collect();
    schemas.sort_by_key(|schema| schema.key());
    let summaries: Vec<_> = schemas.iter().map(|schema| summarize(schema)).collect();

    if json {
        let output = serde_json::json!({ "schemas": summaries });
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    if summaries.is_empty() {
        return Ok("No schemas registered.".to_string());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Schema", "Field", "Kind", "Display"]);
    for summary in &summaries {
        for field in &summary.fields {
            let display = if summary.display == Some(field.name) {
                "*"
            } else {
                ""
            };
            table.add_row(vec![summary.name, field.name, field.kind.as_str(), display]);
        }
    }
    Ok(table.to_string())
}
