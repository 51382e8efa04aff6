//! The `autocomplete` command.

use anyhow::Result;
use smores::{AutocompleteState, RootFilter, Smores};

/// Complete `fragment`, printing either JSON or a short text report.
pub fn run_autocomplete(
    smores: &Smores,
    fragment: &str,
    only: &[String],
    exclude: &[String],
    json: bool,
) -> Result<String> {
    let filter = RootFilter::new().only(only).exclude(exclude);
    let state = smores.autocomplete_filtered(fragment, &filter);
    if json {
        return Ok(serde_json::to_string_pretty(&state)?);
    }
    Ok(format_state(&state))
}

fn format_state(state: &AutocompleteState) -> String {
    let mut out = format!("{} {}", state.status, state.valid_fragment)
        .trim_end()
        .to_string();
    for option in &state.options {
        out.push_str("\n  ");
        out.push_str(option);
    }
    out
}
