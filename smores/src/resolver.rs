//! Walking tag paths through the schema graph
//!
//! The resolver answers whether a path such as `user.dogs:1.name` names something
//! a schema actually declares. Rendering uses it to screen tags before evaluation
//! and autocomplete uses its single-step primitive to drive its state machine.

use crate::error::ResolveError;
use smores_schema::{FieldDef, SchemaDescriptor, SchemaRef, SchemaRegistry};
use smores_templating::{PathStep, TagPath};
use std::sync::Arc;
use tracing::trace;

/// Where a resolved path ends.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// A record; it renders through its default-display field.
    Schema(Arc<SchemaDescriptor>),
    /// A scalar or template field of `owner`.
    Field {
        /// Schema declaring the field.
        owner: Arc<SchemaDescriptor>,
        /// The terminal field.
        field: FieldDef,
    },
}

impl Endpoint {
    /// The schema the path ends on, if it ends on a record.
    pub fn schema(&self) -> Option<&Arc<SchemaDescriptor>> {
        match self {
            Endpoint::Schema(schema) => Some(schema),
            Endpoint::Field { .. } => None,
        }
    }

    /// The schema that was current when the walk stopped.
    pub fn owner(&self) -> &Arc<SchemaDescriptor> {
        match self {
            Endpoint::Schema(schema) => schema,
            Endpoint::Field { owner, .. } => owner,
        }
    }
}

/// A successfully resolved path.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The root schema.
    pub root: Arc<SchemaDescriptor>,
    /// Steps below the root, with a redundant self-named first step removed.
    pub steps: Vec<PathStep>,
    /// What the path names.
    pub endpoint: Endpoint,
    /// True when a list field was crossed without an index before further steps.
    pub through_unindexed_list: bool,
}

impl Resolution {
    /// The path in canonical form, rooted at the lowercased schema name.
    pub fn to_tag_path(&self) -> TagPath {
        TagPath::rooted(PathStep::new(self.root.name()), self.steps.iter().cloned())
    }
}

/// One step of a walk.
#[derive(Debug, Clone)]
pub enum Step {
    /// Descended into a nested record (or list of records).
    Nested {
        /// The nested field taken.
        field: FieldDef,
        /// The schema now current.
        target: Arc<SchemaDescriptor>,
    },
    /// Reached a scalar or template field; nothing may follow.
    Terminal(FieldDef),
}

/// Resolves paths against one registry.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> PathResolver<'r> {
    /// Create a resolver over `registry`.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// The registry paths are resolved against.
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// Look up a root schema by name.
    pub fn root(&self, name: &str) -> Result<Arc<SchemaDescriptor>, ResolveError> {
        self.registry
            .lookup_by_name(name)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownRoot {
                name: name.to_string(),
            })
    }

    /// The schema a nested field of `owner` points at.
    pub fn target(
        &self,
        owner: &Arc<SchemaDescriptor>,
        field: &FieldDef,
    ) -> Result<Arc<SchemaDescriptor>, ResolveError> {
        let unresolved = |target: &str| ResolveError::UnresolvedReference {
            field: field.name.clone(),
            target: target.to_string(),
        };
        match field.kind.schema_ref() {
            Some(SchemaRef::Schema(schema)) => Ok(Arc::clone(schema)),
            Some(SchemaRef::SelfRef) => Ok(Arc::clone(owner)),
            Some(SchemaRef::Named(name)) => self
                .registry
                .lookup_by_name(name)
                .cloned()
                .ok_or_else(|| unresolved(name)),
            None => Err(unresolved(field.kind.label().as_str())),
        }
    }

    /// Take a single step from `current`.
    pub fn step(
        &self,
        current: &Arc<SchemaDescriptor>,
        step: &PathStep,
    ) -> Result<Step, ResolveError> {
        let field = current
            .field(&step.name)
            .ok_or_else(|| ResolveError::UnknownField {
                schema: current.name().to_string(),
                field: step.name.clone(),
            })?;
        if step.index.is_some() && !field.kind.is_many() {
            return Err(ResolveError::IndexNotAllowed {
                schema: current.name().to_string(),
                field: field.name.clone(),
            });
        }
        trace!(schema = current.name(), field = %field.name, "resolved step");
        if field.kind.is_terminal() {
            return Ok(Step::Terminal(field.clone()));
        }
        let target = self.target(current, field)?;
        Ok(Step::Nested {
            field: field.clone(),
            target,
        })
    }

    /// Resolve `path` below the root schema named `root_name`.
    pub fn resolve(&self, root_name: &str, path: &[PathStep]) -> Result<Resolution, ResolveError> {
        let root = self.root(root_name)?;
        let steps = if skips_root_alias(&root, path) {
            &path[1..]
        } else {
            path
        };

        let mut endpoint = Endpoint::Schema(Arc::clone(&root));
        let mut through_unindexed_list = false;
        for (i, path_step) in steps.iter().enumerate() {
            let current = match &endpoint {
                Endpoint::Schema(schema) => Arc::clone(schema),
                Endpoint::Field { owner, field } => {
                    return Err(ResolveError::TrailingSteps {
                        schema: owner.name().to_string(),
                        field: field.name.clone(),
                    })
                }
            };
            endpoint = match self.step(&current, path_step)? {
                Step::Nested { field, target } => {
                    let is_last = i + 1 == steps.len();
                    if field.kind.is_many() && path_step.index.is_none() && !is_last {
                        through_unindexed_list = true;
                    }
                    Endpoint::Schema(target)
                }
                Step::Terminal(field) => Endpoint::Field {
                    owner: current,
                    field,
                },
            };
        }

        Ok(Resolution {
            root,
            steps: steps.to_vec(),
            endpoint,
            through_unindexed_list,
        })
    }

    /// Resolve a parsed tag whose first step names the root schema.
    pub fn resolve_tag(&self, tag: &TagPath) -> Result<Resolution, ResolveError> {
        let root = tag.root();
        if root.index.is_some() {
            return Err(ResolveError::IndexedRoot {
                name: root.name.clone(),
            });
        }
        self.resolve(&root.name, tag.rest())
    }
}

/// `user.user.name` means `user.name`, unless `user` really has a `user` field.
pub fn skips_root_alias(root: &SchemaDescriptor, path: &[PathStep]) -> bool {
    path.first().is_some_and(|first| {
        first.index.is_none() && root.matches_name(&first.name) && !root.has_field(&first.name)
    })
}
