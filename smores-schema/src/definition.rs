//! Serializable schema definitions.
//!
//! Schemas stored on disk are YAML documents. Nested fields refer to other
//! schemas by name (or `self`), which the registry resolves when a path is walked.
//!
//! ```yaml
//! name: Dog
//! default_display: _default_template
//! fields:
//!   - name: name
//!     type: { kind: scalar }
//!   - name: dog
//!     type: { kind: nested, schema: self }
//!   - name: _default_template
//!     type: { kind: template, text: "Name: {{name}}" }
//! ```

use crate::error::{Result, SchemaError};
use crate::types::{FieldDef, FieldKind, SchemaDescriptor, SchemaRef};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Marker used in `schema:` for a self-reference.
pub const SELF_REFERENCE: &str = "self";

/// A schema as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_display: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// A field as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: FieldTypeDefinition,
}

/// The kind of a field as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldTypeDefinition {
    Scalar,
    Nested {
        schema: String,
        #[serde(default)]
        many: bool,
    },
    /// Template text given inline or read from a file next to the definition.
    Template {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<PathBuf>,
        #[serde(default)]
        tags: bool,
    },
}

impl SchemaDefinition {
    /// Parse one definition from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Build the descriptor. Relative template files are read from `base_dir`.
    pub fn into_descriptor(self, base_dir: &Path) -> Result<SchemaDescriptor> {
        let mut builder = SchemaDescriptor::builder(&self.name);
        for field in self.fields {
            let kind = match field.type_ {
                FieldTypeDefinition::Scalar => FieldKind::Scalar,
                FieldTypeDefinition::Nested { schema, many } => {
                    let target = if schema.eq_ignore_ascii_case(SELF_REFERENCE) {
                        SchemaRef::SelfRef
                    } else {
                        SchemaRef::Named(schema)
                    };
                    if many {
                        FieldKind::NestedMany(target)
                    } else {
                        FieldKind::NestedOne(target)
                    }
                }
                FieldTypeDefinition::Template { text, file, tags } => {
                    let text = match (text, file) {
                        (Some(text), _) => text,
                        (None, Some(file)) => std::fs::read_to_string(base_dir.join(file))?,
                        (None, None) => {
                            return Err(SchemaError::MissingTemplate {
                                schema: self.name,
                                field: field.name,
                            })
                        }
                    };
                    FieldKind::Template {
                        text,
                        uses_tag_syntax: tags,
                    }
                }
            };
            builder = builder.field(FieldDef::new(field.name, kind));
        }
        if let Some(display) = self.default_display {
            builder = builder.display_field(display);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_DISPLAY_FIELD;

    const DOG_YAML: &str = r#"
name: Dog
default_display: _default_template
fields:
  - name: name
    type:
      kind: scalar
  - name: dog
    type:
      kind: nested
      schema: self
  - name: _default_template
    type:
      kind: template
      text: "Name: {{name}}"
  - name: with_greeting
    type:
      kind: template
      text: "Hi, this is my dog {name}"
      tags: true
"#;

    #[test]
    fn parses_yaml_definition() {
        let def = SchemaDefinition::from_yaml(DOG_YAML).unwrap();
        assert_eq!(def.name, "Dog");
        assert_eq!(def.fields.len(), 4);
        assert_eq!(
            def.fields[1].type_,
            FieldTypeDefinition::Nested {
                schema: "self".into(),
                many: false
            }
        );
    }

    #[test]
    fn builds_descriptor_with_self_reference() {
        let schema = SchemaDefinition::from_yaml(DOG_YAML)
            .unwrap()
            .into_descriptor(Path::new("."))
            .unwrap();
        assert_eq!(schema.default_display(), Some(DEFAULT_DISPLAY_FIELD));
        assert_eq!(
            schema.field("dog").unwrap().kind,
            FieldKind::NestedOne(SchemaRef::SelfRef)
        );
        assert_eq!(
            schema.field("with_greeting").unwrap().kind,
            FieldKind::Template {
                text: "Hi, this is my dog {name}".into(),
                uses_tag_syntax: true
            }
        );
    }

    #[test]
    fn nested_many_by_name() {
        let yaml = r#"
name: User
fields:
  - name: dogs
    type: { kind: nested, schema: Dog, many: true }
"#;
        let schema = SchemaDefinition::from_yaml(yaml)
            .unwrap()
            .into_descriptor(Path::new("."))
            .unwrap();
        assert_eq!(
            schema.field("dogs").unwrap().kind,
            FieldKind::NestedMany(SchemaRef::named("Dog"))
        );
        assert!(!schema.has_default_display());
    }

    #[test]
    fn template_without_source_is_rejected() {
        let yaml = r#"
name: User
fields:
  - name: basic
    type: { kind: template }
"#;
        let err = SchemaDefinition::from_yaml(yaml)
            .unwrap()
            .into_descriptor(Path::new("."))
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingTemplate { field, .. } if field == "basic"));
    }

    #[test]
    fn yaml_round_trip() {
        let def = SchemaDefinition::from_yaml(DOG_YAML).unwrap();
        let yaml = def.to_yaml().unwrap();
        assert_eq!(SchemaDefinition::from_yaml(&yaml).unwrap(), def);
    }
}
