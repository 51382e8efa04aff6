//! smores CLI - render and autocomplete schema-aware tag templates.
//!
//! Commands:
//! - `smores render <template> --data <file>`: Render a template against JSON data
//! - `smores autocomplete <fragment>`: Complete a partially typed tag
//! - `smores schemas`: List registered schemas and their fields
//! - `smores expand <template>`: Show the Liquid a template expands to
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use tracing_subscriber::EnvFilter;

use smores_cli::{complete, render, schemas, setup};
use smores_cli::{Cli, Commands};

fn run(cli: Cli) -> anyhow::Result<String> {
    let config = setup::load_config(cli.config.as_deref(), &cli.schema_dirs)?;
    let smores = setup::build(&config)?;

    match cli.command {
        Commands::Render {
            template,
            data,
            sub_templates,
            fallback,
            echo_tags,
            table_loops,
        } => {
            let args = render::RenderArgs {
                sub_templates: sub_templates.as_deref(),
                fallback: fallback.as_deref(),
                echo_tags,
                table_loops: &table_loops,
                ..render::RenderArgs::new(&template, &data)
            };
            render::run_render(&smores, &args)
        }

        Commands::Autocomplete {
            fragment,
            only,
            exclude,
            json,
        } => complete::run_autocomplete(&smores, &fragment, &only, &exclude, json),

        Commands::Schemas { json } => schemas::run_schemas(&smores, json),

        Commands::Expand { template, fallback } => {
            render::run_expand(&smores, &template, fallback.as_deref())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("smores=debug,smores_cli=debug,smores_schema=debug,smores_templating=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parsing_render() {
        let cli = Cli::try_parse_from([
            "smores",
            "--schemas",
            "defs",
            "render",
            "letter.txt",
            "--data",
            "data.json",
            "--table-loop",
            "dog=user.dogs",
        ])
        .unwrap();
        assert_eq!(cli.schema_dirs, vec![PathBuf::from("defs")]);
        match cli.command {
            Commands::Render {
                template,
                data,
                table_loops,
                echo_tags,
                ..
            } => {
                assert_eq!(template, PathBuf::from("letter.txt"));
                assert_eq!(data, PathBuf::from("data.json"));
                assert_eq!(table_loops, vec!["dog=user.dogs"]);
                assert!(!echo_tags);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_render_requires_data() {
        assert!(Cli::try_parse_from(["smores", "render", "letter.txt"]).is_err());
    }

    #[test]
    fn test_cli_fallback_conflicts_with_echo() {
        let result = Cli::try_parse_from([
            "smores",
            "render",
            "t.txt",
            "--data",
            "d.json",
            "--fallback",
            "?",
            "--echo-tags",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_autocomplete() {
        let cli = Cli::try_parse_from([
            "smores",
            "autocomplete",
            "user.do",
            "--only",
            "user,dog",
            "--json",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Autocomplete { ref only, json: true, .. } if only == &["user", "dog"]
        ));
    }

    #[test]
    fn test_cli_debug_is_global() {
        let cli = Cli::try_parse_from(["smores", "schemas", "--debug"]).unwrap();
        assert!(cli.debug);
    }
}
