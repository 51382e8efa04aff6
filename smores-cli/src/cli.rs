//! CLI definition for the smores command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// smores - schema-aware tag templates.
///
/// Schemas are read from YAML definitions in the directories given with
/// `--schemas` or listed under `schema_dirs` in smores.toml/.yaml/.json.
#[derive(Parser, Debug)]
#[command(name = "smores")]
#[command(version)]
#[command(about = "Render and autocomplete schema-aware tag templates")]
#[command(
    long_about = "smores expands compact tags such as {user.dogs:1.name} against a graph of \
    schemas and renders them with live data.\n\n\
    Environment variables:\n  \
    SMORES_FALLBACK               Text rendered for tags that do not resolve\n  \
    SMORES_DEFAULT_DISPLAY_FIELD  Key records use for their default display\n  \
    RUST_LOG                      Log filter (default: warn)"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Read configuration from this file instead of the working directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of YAML schema definitions (repeatable)
    #[arg(short, long = "schemas", global = true, value_name = "DIR")]
    pub schema_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a template file against JSON data
    Render {
        /// Template file
        template: PathBuf,
        /// JSON object keyed by root schema name
        #[arg(long, value_name = "FILE")]
        data: PathBuf,
        /// JSON object of sub-template names to template text
        #[arg(long, value_name = "FILE")]
        sub_templates: Option<PathBuf>,
        /// Text rendered for tags that do not resolve
        #[arg(long, conflicts_with = "echo_tags")]
        fallback: Option<String>,
        /// Render unresolved tags as written
        #[arg(long)]
        echo_tags: bool,
        /// Repeat table rows per list item: ITERATOR=ITERABLE, e.g. dog=user.dogs
        #[arg(long = "table-loop", value_name = "ITERATOR=ITERABLE")]
        table_loops: Vec<String>,
    },

    /// Complete a partially typed tag
    Autocomplete {
        /// Fragment without braces, e.g. user.dogs:1.na
        fragment: String,
        /// Offer only these root schemas
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        /// Never offer these root schemas
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered schemas and their fields
    Schemas {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a template with its tags expanded to Liquid
    Expand {
        /// Template file
        template: PathBuf,
        /// Text rendered for tags that do not resolve
        #[arg(long)]
        fallback: Option<String>,
    },
}
