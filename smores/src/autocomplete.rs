//! Tag autocompletion
//!
//! Given the text typed so far inside a tag, report whether it already names
//! something renderable, the longest prefix that resolved, and what may come
//! next. Results are sorted so editors can show them as-is.

use crate::error::ResolveError;
use crate::resolver::{skips_root_alias, PathResolver, Step};
use serde::{Deserialize, Serialize};
use smores_schema::{SchemaDescriptor, SchemaRegistry};
use smores_templating::{join_steps, parse_partial, PathStep};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// The suggestion offered after a list field.
pub const INDEX_HINT: &str = ":1";

/// Whether a fragment can be rendered as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// The fragment names a value or a record with a default display.
    Valid,
    /// Anything else.
    Invalid,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Valid => f.write_str("VALID"),
            Status::Invalid => f.write_str("INVALID"),
        }
    }
}

/// Result of one autocomplete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteState {
    /// Validity of the whole fragment.
    pub status: Status,
    /// Sorted, lowercased candidates for the next step.
    pub options: Vec<String>,
    /// The longest prefix that resolved, in tag syntax.
    pub valid_fragment: String,
}

impl AutocompleteState {
    fn new(status: Status, mut options: Vec<String>, valid: &[PathStep]) -> Self {
        options.sort();
        options.dedup();
        Self {
            status,
            options,
            valid_fragment: join_steps(valid),
        }
    }

    fn invalid(options: Vec<String>, valid: &[PathStep]) -> Self {
        Self::new(Status::Invalid, options, valid)
    }

    /// True for [`Status::Valid`].
    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }
}

/// Restricts which root schemas are offered and accepted.
///
/// Names compare case-insensitively. An empty `only` list admits every root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootFilter {
    only: Vec<String>,
    exclude: Vec<String>,
}

impl RootFilter {
    /// A filter that admits every root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit only these roots.
    pub fn only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.only = names
            .into_iter()
            .map(|n| n.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// Never admit these roots.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude = names
            .into_iter()
            .map(|n| n.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// Whether `name` passes the filter.
    pub fn allows(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        (self.only.is_empty() || self.only.contains(&name)) && !self.exclude.contains(&name)
    }
}

/// Complete `fragment` against the schemas in `registry`.
pub fn autocomplete(
    registry: &SchemaRegistry,
    fragment: &str,
    filter: &RootFilter,
) -> AutocompleteState {
    let fragment = fragment.trim();
    let roots: Vec<String> = registry
        .names()
        .into_iter()
        .filter(|name| filter.allows(name))
        .collect();

    if fragment.is_empty() {
        return AutocompleteState::invalid(roots, &[]);
    }

    let steps = parse_partial(fragment);
    let Some(first) = steps.first() else {
        return AutocompleteState::invalid(Vec::new(), &[]);
    };

    let root = match registry.lookup_by_name(&first.name) {
        Some(root) if roots.contains(&first.name) => Arc::clone(root),
        _ if steps.len() == 1 => {
            let matches = roots
                .into_iter()
                .filter(|name| name.starts_with(&first.name))
                .collect();
            return AutocompleteState::invalid(matches, &[]);
        }
        _ => return AutocompleteState::invalid(Vec::new(), &[]),
    };
    if first.index.is_some() {
        return AutocompleteState::invalid(Vec::new(), &[]);
    }

    let mut valid = vec![first.clone()];
    let mut rest = &steps[1..];
    if skips_root_alias(&root, rest) {
        valid.push(rest[0].clone());
        rest = &rest[1..];
    }

    let resolver = PathResolver::new(registry);
    let mut current: Option<Arc<SchemaDescriptor>> = Some(root);
    for (i, step) in rest.iter().enumerate() {
        let Some(schema) = current.take() else {
            trace!(step = %step, "step after a terminal field");
            return AutocompleteState::invalid(Vec::new(), &valid);
        };
        match resolver.step(&schema, step) {
            Ok(Step::Nested { field, target }) => {
                if field.kind.is_many() && step.index.is_none() {
                    if i + 1 == rest.len() {
                        return AutocompleteState::invalid(vec![INDEX_HINT.to_string()], &valid);
                    }
                    trace!(field = %field.name, "list crossed without an index");
                }
                current = Some(target);
            }
            Ok(Step::Terminal(_)) => current = None,
            Err(ResolveError::UnknownField { .. }) => {
                let matches = schema
                    .field_names()
                    .filter(|name| name.starts_with(&step.name))
                    .map(str::to_string)
                    .collect();
                return AutocompleteState::invalid(matches, &valid);
            }
            Err(e) => {
                trace!(error = %e, "fragment does not resolve");
                return AutocompleteState::invalid(Vec::new(), &valid);
            }
        }
        valid.push(step.clone());
    }

    match current {
        Some(schema) => {
            let status = if schema.has_default_display() {
                Status::Valid
            } else {
                Status::Invalid
            };
            let options = schema.field_names().map(str::to_string).collect();
            AutocompleteState::new(status, options, &valid)
        }
        None => AutocompleteState::new(Status::Valid, Vec::new(), &valid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register(
            SchemaDescriptor::builder("Address")
                .scalars(["street", "city"])
                .build()
                .unwrap(),
        );
        registry.register(
            SchemaDescriptor::builder("User")
                .scalar("name")
                .nested("address", smores_schema::SchemaRef::named("address"))
                .default_template("{{name}}")
                .build()
                .unwrap(),
        );
        registry
    }

    #[test]
    fn empty_fragment_lists_roots() {
        let state = autocomplete(&registry(), "  ", &RootFilter::new());
        assert_eq!(state.status, Status::Invalid);
        assert_eq!(state.options, vec!["address", "user"]);
        assert_eq!(state.valid_fragment, "");
    }

    #[test]
    fn root_filter_applies_to_roots_only() {
        let filter = RootFilter::new().exclude(["ADDRESS"]);
        let state = autocomplete(&registry(), "", &filter);
        assert_eq!(state.options, vec!["user"]);

        let state = autocomplete(&registry(), "address", &filter);
        assert_eq!(state.options, Vec::<String>::new());

        let state = autocomplete(&registry(), "user.address", &filter);
        assert_eq!(state.valid_fragment, "user.address");
        assert_eq!(state.options, vec!["city", "street"]);
    }

    #[test]
    fn only_filter_limits_roots() {
        let filter = RootFilter::new().only(["user"]);
        assert!(filter.allows("User"));
        assert!(!filter.allows("address"));
        assert!(RootFilter::new().allows("anything"));
    }

    #[test]
    fn schema_without_default_display_is_invalid() {
        let state = autocomplete(&registry(), "user.address", &RootFilter::new());
        assert_eq!(state.status, Status::Invalid);
        assert_eq!(state.valid_fragment, "user.address");
    }

    #[test]
    fn serializes_with_wire_names() {
        let state = autocomplete(&registry(), "user.name", &RootFilter::new());
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"status": "VALID", "options": [], "validFragment": "user.name"})
        );
    }
}
