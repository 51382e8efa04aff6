//! The schema registry tags resolve against.
//!
//! Entries are unique by identity: registering the same `Arc` twice is a no-op,
//! while two distinct schemas may share a name. Name lookup returns the first one
//! registered, so callers should avoid duplicate names.

use crate::error::{Result, SchemaError};
use crate::types::SchemaDescriptor;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, warn};

/// An explicit collection of registered schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<Arc<SchemaDescriptor>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema and hand it back, so declaration and registration can
    /// happen in one expression.
    pub fn register(&mut self, schema: impl Into<Arc<SchemaDescriptor>>) -> Arc<SchemaDescriptor> {
        let schema = schema.into();
        self.insert(&schema);
        schema
    }

    /// Register every schema from an already resolved list.
    pub fn register_all<I>(&mut self, schemas: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<SchemaDescriptor>>,
    {
        for schema in schemas {
            self.register(schema);
        }
    }

    /// Remove a previously registered schema.
    pub fn unregister(&mut self, schema: &Arc<SchemaDescriptor>) -> Result<()> {
        let idx = self
            .position(schema)
            .ok_or_else(|| SchemaError::NotRegistered {
                name: schema.name().to_string(),
            })?;
        self.schemas.remove(idx);
        debug!(schema = schema.name(), "unregistered schema");
        Ok(())
    }

    /// Case-insensitive exact lookup.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Arc<SchemaDescriptor>> {
        self.schemas.iter().find(|s| s.matches_name(name))
    }

    pub fn contains(&self, schema: &Arc<SchemaDescriptor>) -> bool {
        self.position(schema).is_some()
    }

    /// Registered schemas in registration order.
    pub fn all(&self) -> &[Arc<SchemaDescriptor>] {
        &self.schemas
    }

    /// Lowercased schema names, sorted and deduplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.iter().map(|s| s.key()).collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Register `schemas` for the duration of `body`.
    ///
    /// The schemas are removed again when `body` returns or unwinds. Schemas that
    /// were already registered beforehand stay registered.
    pub fn with_temporary<I, F, R>(&mut self, schemas: I, body: F) -> R
    where
        I: IntoIterator,
        I::Item: Into<Arc<SchemaDescriptor>>,
        F: FnOnce(&mut SchemaRegistry) -> R,
    {
        let mut guard = self.scoped(schemas);
        body(&mut guard)
    }

    /// Register `schemas` until the returned guard is dropped.
    pub fn scoped<I>(&mut self, schemas: I) -> TemporarySchemas<'_>
    where
        I: IntoIterator,
        I::Item: Into<Arc<SchemaDescriptor>>,
    {
        let mut added = Vec::new();
        for schema in schemas {
            let schema = schema.into();
            if self.insert(&schema) {
                added.push(schema);
            }
        }
        debug!(count = added.len(), "registered temporary schemas");
        TemporarySchemas {
            registry: self,
            added,
        }
    }

    fn position(&self, schema: &Arc<SchemaDescriptor>) -> Option<usize> {
        self.schemas.iter().position(|s| Arc::ptr_eq(s, schema))
    }

    /// Returns false when this exact schema is already present.
    fn insert(&mut self, schema: &Arc<SchemaDescriptor>) -> bool {
        if self.contains(schema) {
            return false;
        }
        if self.lookup_by_name(schema.name()).is_some() {
            warn!(
                schema = schema.name(),
                "another schema with this name is already registered; name lookups return the first"
            );
        }
        self.schemas.push(Arc::clone(schema));
        debug!(schema = schema.name(), "registered schema");
        true
    }
}

/// Guard returned by [`SchemaRegistry::scoped`].
///
/// Dereferences to the registry; removes the schemas it added when dropped.
pub struct TemporarySchemas<'r> {
    registry: &'r mut SchemaRegistry,
    added: Vec<Arc<SchemaDescriptor>>,
}

impl TemporarySchemas<'_> {
    /// The schemas this guard will remove.
    pub fn added(&self) -> &[Arc<SchemaDescriptor>] {
        &self.added
    }
}

impl Deref for TemporarySchemas<'_> {
    type Target = SchemaRegistry;

    fn deref(&self) -> &SchemaRegistry {
        self.registry
    }
}

impl DerefMut for TemporarySchemas<'_> {
    fn deref_mut(&mut self) -> &mut SchemaRegistry {
        self.registry
    }
}

impl Drop for TemporarySchemas<'_> {
    fn drop(&mut self) {
        for schema in self.added.drain(..) {
            // The body may already have unregistered it.
            if let Some(idx) = self.registry.position(&schema) {
                self.registry.schemas.remove(idx);
            }
        }
        debug!("removed temporary schemas");
    }
}
