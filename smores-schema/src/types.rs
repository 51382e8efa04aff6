//! Core schema types.
//!
//! A [`SchemaDescriptor`] describes one record shape: an ordered set of named
//! fields, each with a [`FieldKind`], plus the optional field that represents
//! the record as text when a tag names the record itself.

use crate::error::{Result, SchemaError};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Well-known name of the field a schema exposes as its default display.
pub const DEFAULT_DISPLAY_FIELD: &str = "_default_template";

/// Returns true when `name` can be written inside a tag.
pub fn is_tag_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Reference from a nested field to the schema it contains.
#[derive(Clone)]
pub enum SchemaRef {
    /// A schema held directly.
    Schema(Arc<SchemaDescriptor>),
    /// A schema looked up by name in the registry when the path is walked.
    Named(String),
    /// The schema that declares the field ("a dog has a dog").
    SelfRef,
}

impl SchemaRef {
    /// Reference a schema by name.
    pub fn named(name: impl Into<String>) -> Self {
        SchemaRef::Named(name.into())
    }

    /// Display name of the referenced schema, `self` for self-references.
    pub fn target_name(&self) -> &str {
        match self {
            SchemaRef::Schema(schema) => schema.name(),
            SchemaRef::Named(name) => name,
            SchemaRef::SelfRef => "self",
        }
    }
}

impl From<Arc<SchemaDescriptor>> for SchemaRef {
    fn from(schema: Arc<SchemaDescriptor>) -> Self {
        SchemaRef::Schema(schema)
    }
}

impl From<&Arc<SchemaDescriptor>> for SchemaRef {
    fn from(schema: &Arc<SchemaDescriptor>) -> Self {
        SchemaRef::Schema(Arc::clone(schema))
    }
}

// Printing the whole target would recurse through the graph, so only the name is shown.
impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaRef::Schema(schema) => f.debug_tuple("Schema").field(&schema.name()).finish(),
            SchemaRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            SchemaRef::SelfRef => f.write_str("SelfRef"),
        }
    }
}

impl PartialEq for SchemaRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SchemaRef::Schema(a), SchemaRef::Schema(b)) => Arc::ptr_eq(a, b),
            (SchemaRef::Named(a), SchemaRef::Named(b)) => a.eq_ignore_ascii_case(b),
            (SchemaRef::SelfRef, SchemaRef::SelfRef) => true,
            _ => false,
        }
    }
}

/// The kind of a field, which determines how tags may walk through it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A plain value.
    Scalar,
    /// A single nested record.
    NestedOne(SchemaRef),
    /// A list of nested records, addressed with `:N`.
    NestedMany(SchemaRef),
    /// Text rendered from the record's other fields when the record is serialized.
    Template {
        text: String,
        /// Expand `{tag}` syntax in `text` before rendering.
        uses_tag_syntax: bool,
    },
}

impl FieldKind {
    /// The referenced schema for nested kinds.
    pub fn schema_ref(&self) -> Option<&SchemaRef> {
        match self {
            FieldKind::NestedOne(r) | FieldKind::NestedMany(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, FieldKind::NestedMany(_))
    }

    pub fn is_template(&self) -> bool {
        matches!(self, FieldKind::Template { .. })
    }

    /// Scalar and template fields end a path.
    pub fn is_terminal(&self) -> bool {
        self.schema_ref().is_none()
    }

    /// Short label used in listings.
    pub fn label(&self) -> String {
        match self {
            FieldKind::Scalar => "scalar".to_string(),
            FieldKind::NestedOne(r) => format!("nested({})", r.target_name()),
            FieldKind::NestedMany(r) => format!("nested-many({})", r.target_name()),
            FieldKind::Template {
                uses_tag_syntax: true,
                ..
            } => "template(tags)".to_string(),
            FieldKind::Template { .. } => "template".to_string(),
        }
    }
}

/// A named field of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// The name as declared; lookups use the lowercased form.
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Lowercased lookup key.
    pub fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// The typed description of one registered record shape.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    name: String,
    fields: IndexMap<String, FieldDef>,
    default_display: Option<String>,
}

impl SchemaDescriptor {
    /// Start building a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// The name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased name, the form roots are bound under.
    pub fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Case-insensitive field lookup.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(&name.to_ascii_lowercase())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Lowercased field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Lowercased name of the default-display field, if the schema has one.
    pub fn default_display(&self) -> Option<&str> {
        self.default_display.as_deref()
    }

    pub fn has_default_display(&self) -> bool {
        self.default_display.is_some()
    }
}

/// Builder for [`SchemaDescriptor`].
///
/// ```
/// use smores_schema::{SchemaDescriptor, SchemaRef};
///
/// let dog = SchemaDescriptor::builder("Dog")
///     .scalar("name")
///     .nested("dog", SchemaRef::SelfRef)
///     .default_template("Name: {{name}}")
///     .build()
///     .unwrap();
/// assert!(dog.has_default_display());
/// assert_eq!(dog.field("NAME").unwrap().name, "name");
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
    default_display: Option<String>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            default_display: None,
        }
    }

    /// Add a field.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    pub fn scalar(self, name: impl Into<String>) -> Self {
        self.field(FieldDef::new(name, FieldKind::Scalar))
    }

    /// Add several scalar fields at once.
    pub fn scalars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self = self.scalar(name);
        }
        self
    }

    pub fn nested(self, name: impl Into<String>, schema: impl Into<SchemaRef>) -> Self {
        self.field(FieldDef::new(name, FieldKind::NestedOne(schema.into())))
    }

    pub fn nested_many(self, name: impl Into<String>, schema: impl Into<SchemaRef>) -> Self {
        self.field(FieldDef::new(name, FieldKind::NestedMany(schema.into())))
    }

    /// A template field written in engine syntax.
    pub fn template(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.field(FieldDef::new(
            name,
            FieldKind::Template {
                text: text.into(),
                uses_tag_syntax: false,
            },
        ))
    }

    /// A template field written in `{tag}` syntax.
    pub fn tag_template(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.field(FieldDef::new(
            name,
            FieldKind::Template {
                text: text.into(),
                uses_tag_syntax: true,
            },
        ))
    }

    /// Declare the well-known default-display field with an engine-syntax template.
    pub fn default_template(self, text: impl Into<String>) -> Self {
        self.template(DEFAULT_DISPLAY_FIELD, text)
            .display_field(DEFAULT_DISPLAY_FIELD)
    }

    /// Declare the well-known default-display field with a `{tag}` template.
    pub fn default_tag_template(self, text: impl Into<String>) -> Self {
        self.tag_template(DEFAULT_DISPLAY_FIELD, text)
            .display_field(DEFAULT_DISPLAY_FIELD)
    }

    /// Designate an already declared field as the default display.
    pub fn display_field(mut self, name: impl Into<String>) -> Self {
        self.default_display = Some(name.into());
        self
    }

    pub fn build(self) -> Result<SchemaDescriptor> {
        if !is_tag_name(&self.name) {
            return Err(SchemaError::InvalidName { name: self.name });
        }

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for def in self.fields {
            if !is_tag_name(&def.name) {
                return Err(SchemaError::InvalidName { name: def.name });
            }
            let key = def.key();
            if fields.contains_key(&key) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name,
                    field: def.name,
                });
            }
            fields.insert(key, def);
        }

        let default_display = match self.default_display {
            Some(display) => {
                let key = display.to_ascii_lowercase();
                if !fields.contains_key(&key) {
                    return Err(SchemaError::UnknownDisplayField {
                        schema: self.name,
                        field: display,
                    });
                }
                Some(key)
            }
            // The well-known field is the display even when not designated.
            None => fields
                .contains_key(DEFAULT_DISPLAY_FIELD)
                .then(|| DEFAULT_DISPLAY_FIELD.to_string()),
        };

        Ok(SchemaDescriptor {
            name: self.name,
            fields,
            default_display,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinates() -> Arc<SchemaDescriptor> {
        Arc::new(
            SchemaDescriptor::builder("Coordinates")
                .scalars(["lat", "lng"])
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn fields_keep_declaration_order() {
        let schema = SchemaDescriptor::builder("Address")
            .scalars(["street", "suite", "city"])
            .nested("geo", coordinates())
            .build()
            .unwrap();
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["street", "suite", "city", "geo"]);
    }

    #[test]
    fn field_lookup_is_case_insensitive() {
        let schema = SchemaDescriptor::builder("Company")
            .scalar("catchPhrase")
            .build()
            .unwrap();
        assert_eq!(schema.field("catchphrase").unwrap().name, "catchPhrase");
        assert_eq!(schema.field("CATCHPHRASE").unwrap().name, "catchPhrase");
        assert_eq!(schema.field_names().next(), Some("catchphrase"));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = SchemaDescriptor::builder("User")
            .scalar("name")
            .scalar("Name")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn names_must_be_addressable() {
        let err = SchemaDescriptor::builder("User")
            .scalar("first-name")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidName { name } if name == "first-name"));

        assert!(SchemaDescriptor::builder("").build().is_err());
    }

    #[test]
    fn default_template_designates_display_field() {
        let schema = SchemaDescriptor::builder("User")
            .scalars(["name", "email"])
            .default_template("{{name}}---{{email}}")
            .build()
            .unwrap();
        assert_eq!(schema.default_display(), Some(DEFAULT_DISPLAY_FIELD));
        assert!(schema.field(DEFAULT_DISPLAY_FIELD).unwrap().kind.is_template());
    }

    #[test]
    fn display_field_must_exist() {
        let err = SchemaDescriptor::builder("User")
            .scalar("name")
            .display_field("label")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownDisplayField { .. }));
    }

    #[test]
    fn schema_refs_compare_by_identity() {
        let a = coordinates();
        let b = coordinates();
        assert_eq!(SchemaRef::from(&a), SchemaRef::from(&a));
        assert_ne!(SchemaRef::from(&a), SchemaRef::from(&b));
        assert_eq!(SchemaRef::named("Dog"), SchemaRef::named("dog"));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(FieldKind::Scalar.label(), "scalar");
        assert_eq!(
            FieldKind::NestedMany(SchemaRef::named("Dog")).label(),
            "nested-many(Dog)"
        );
        assert_eq!(FieldKind::NestedOne(SchemaRef::SelfRef).label(), "nested(self)");
        assert!(FieldKind::Scalar.is_terminal());
        assert!(!FieldKind::NestedOne(SchemaRef::SelfRef).is_terminal());
    }
}
