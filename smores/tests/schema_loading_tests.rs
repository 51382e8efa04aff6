//! Schemas defined in YAML and instances built from configuration

use serde_json::json;
use serial_test::serial;
use smores::{Smores, SmoresConfig, Status};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DOG_YAML: &str = r#"
name: Dog
fields:
  - name: name
    type: { kind: scalar }
  - name: dog
    type: { kind: nested, schema: self }
  - name: _default_template
    type: { kind: template, file: dog.liquid }
  - name: with_greeting
    type: { kind: template, text: "Hi, this is {name}", tags: true }
"#;

const USER_YAML: &str = r#"
name: User
fields:
  - name: name
    type: { kind: scalar }
  - name: dogs
    type: { kind: nested, schema: Dog, many: true }
  - name: label
    type: { kind: template, text: "<{{name}}>" }
default_display: label
"#;

fn write_schemas(dir: &Path) {
    fs::write(dir.join("dog.yaml"), DOG_YAML).unwrap();
    fs::write(dir.join("dog.liquid"), "Name: {{ name }}").unwrap();
    fs::write(dir.join("user.yml"), USER_YAML).unwrap();
    fs::write(dir.join("notes.txt"), "not a schema").unwrap();
}

fn data() -> serde_json::Value {
    json!({"user": {"name": "Leanne", "dogs": [{"name": "Rufus"}, {"name": "Spot"}]}})
}

#[test_log::test]
fn test_load_schema_dir() {
    let temp_dir = TempDir::new().unwrap();
    write_schemas(temp_dir.path());

    let mut smores = Smores::new().unwrap();
    let registered = smores.load_schema_dir(temp_dir.path()).unwrap();
    assert_eq!(registered.len(), 2);
    assert_eq!(smores.registry().names(), vec!["dog", "user"]);

    let out = smores
        .render(&data(), "{user} {user.dogs:1} {user.dogs:2.with_greeting}")
        .unwrap();
    assert_eq!(out, "<Leanne> Name: Rufus Hi, this is Spot");
}

#[test]
fn test_loaded_default_template_is_display() {
    let temp_dir = TempDir::new().unwrap();
    write_schemas(temp_dir.path());

    let mut smores = Smores::new().unwrap();
    smores.load_schema_dir(temp_dir.path()).unwrap();
    let state = smores.autocomplete("user.dogs:1");
    assert_eq!(state.status, Status::Valid);
    assert_eq!(
        state.options,
        vec!["_default_template", "dog", "name", "with_greeting"]
    );
}

#[test_log::test]
fn test_invalid_definitions_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    write_schemas(temp_dir.path());
    fs::write(temp_dir.path().join("broken.yaml"), "name: [unclosed").unwrap();

    let mut smores = Smores::new().unwrap();
    let registered = smores.load_schema_dir(temp_dir.path()).unwrap();
    assert_eq!(registered.len(), 2);
}

#[test]
#[serial]
fn test_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let schema_dir = temp_dir.path().join("schemas");
    fs::create_dir(&schema_dir).unwrap();
    write_schemas(&schema_dir);
    fs::write(
        temp_dir.path().join("smores.toml"),
        format!(
            "fallback = \"N/A\"\nschema_dirs = [{:?}]\n",
            schema_dir.display().to_string()
        ),
    )
    .unwrap();

    let config = SmoresConfig::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(config.fallback, "N/A");

    let smores = Smores::from_config(&config).unwrap();
    let out = smores.render(&data(), "{user.name}: {user.cats}").unwrap();
    assert_eq!(out, "Leanne: N/A");
}
