//! Integration test: load a declaration directory from disk and validate
//! payloads against it, including references across files.

use std::fs;
use std::path::Path;

use dj_core::{DjError, SchemaError, ValidationErrorKind};
use dj_schema::{load_dir, load_document, validate_document, Instance, SchemaRegistry};
use serde_json::json;
use tempfile::TempDir;

const CATALOG_YAML: &str = r#"
name: Catalog
required: [name]
additionalProperties: false
properties:
  name: { type: string, minLength: 1 }
  engines:
    type: array
    items: { $ref: Engine }
"#;

const ENGINE_JSON: &str = r#"{
  "name": "Engine",
  "required": ["name", "version"],
  "properties": {
    "name": {"type": "string"},
    "version": {"anyOf": [{"type": "string"}, {"type": "integer"}]},
    "uri": {"type": ["string", "null"]},
    "dialect": {"type": "string", "enum": ["spark", "trino", "druid"]}
  }
}"#;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn schema_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    // Catalog sorts first and references Engine, declared in a later file.
    write(dir.path(), "catalog.schema.yaml", CATALOG_YAML);
    write(dir.path(), "engine.schema.json", ENGINE_JSON);
    write(dir.path(), "README.md", "not a declaration");
    write(dir.path(), "payload.json", "{}");
    dir
}

#[test]
fn test_load_dir_registers_declarations_and_skips_other_files() {
    let dir = schema_dir();
    let mut registry = SchemaRegistry::new();
    let count = load_dir(&mut registry, dir.path()).unwrap();
    assert_eq!(count, 2);
    let names: Vec<&str> = registry.names().map(|n| n.as_str()).collect();
    assert_eq!(names, vec!["Catalog", "Engine"]);
    assert!(registry.unresolved_references().is_empty());
}

#[test]
fn test_cross_file_reference_validates() {
    let dir = schema_dir();
    let mut registry = SchemaRegistry::new();
    load_dir(&mut registry, dir.path()).unwrap();

    let catalog = registry
        .validator()
        .validate_object(
            "Catalog",
            &json!({"name": "default", "engines": [{"name": "spark", "version": "3.1.1", "dialect": "spark"}]}),
        )
        .unwrap();
    let engines = catalog.get("engines").unwrap().as_list().unwrap();
    let engine = engines[0].as_object().unwrap();
    assert_eq!(engine.get("version").unwrap(), &Instance::String("3.1.1".into()));
    assert!(engine.field("uri").is_unset());
}

#[test]
fn test_loaded_constraints_and_nullability() {
    let dir = schema_dir();
    let mut registry = SchemaRegistry::new();
    load_dir(&mut registry, dir.path()).unwrap();
    let v = registry.validator();

    let engine = v
        .validate_object("Engine", &json!({"name": "druid", "version": 26, "uri": null}))
        .unwrap();
    assert!(engine.field("uri").is_null());
    assert_eq!(engine.get("version").unwrap(), &Instance::Int(26));

    let err = v
        .validate_object("Engine", &json!({"name": "pg", "version": "15", "dialect": "postgres"}))
        .unwrap_err();
    assert_eq!(err.path.to_string(), "dialect");
    assert!(matches!(err.kind, ValidationErrorKind::ConstraintViolation { .. }));

    let err = v.validate_object("Catalog", &json!({"name": ""})).unwrap_err();
    assert_eq!(err.path.to_string(), "name");

    let err = v
        .validate_object("Catalog", &json!({"name": "default", "owner": "me"}))
        .unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::UnexpectedField { field: "owner".into() });
}

#[test]
fn test_duplicate_declaration_across_files_rejected() {
    let dir = schema_dir();
    write(dir.path(), "engine-copy.schema.json", ENGINE_JSON);
    let mut registry = SchemaRegistry::new();
    let err = load_dir(&mut registry, dir.path()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateSchema(ref name) if name == "Engine"));
}

#[test]
fn test_broken_file_reports_source() {
    let dir = schema_dir();
    write(dir.path(), "broken.schema.json", "{ not json");
    let mut registry = SchemaRegistry::new();
    let err = load_dir(&mut registry, dir.path()).unwrap_err();
    let source_name = match err {
        SchemaError::Load { source_name, .. } => source_name,
        other => panic!("expected a load error, got {other:?}"),
    };
    assert!(source_name.ends_with("broken.schema.json"));
}

#[test]
fn test_payloads_load_from_yaml_and_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "engine.yaml", "name: spark\nversion: 3.1.1\n");
    write(dir.path(), "engine.json", r#"{"name": "spark", "version": "3.1.1"}"#);
    let yaml = load_document(&dir.path().join("engine.yaml")).unwrap();
    let json = load_document(&dir.path().join("engine.json")).unwrap();
    assert_eq!(yaml, json);
}

#[test]
fn test_missing_directory() {
    let mut registry = SchemaRegistry::new();
    let err = load_dir(&mut registry, Path::new("/nonexistent/schemas")).unwrap_err();
    assert!(matches!(err, SchemaError::Load { .. }));
}

#[test]
fn test_validate_document_separates_lookup_load_and_validation_failures() {
    let dir = schema_dir();
    let mut registry = SchemaRegistry::new();
    load_dir(&mut registry, dir.path()).unwrap();
    write(dir.path(), "engine.yaml", "name: druid\nversion: 26\n");
    write(dir.path(), "bad_engine.json", r#"{"name": "druid"}"#);

    let engine = validate_document(&registry, "Engine", &dir.path().join("engine.yaml")).unwrap();
    assert_eq!(engine.as_object().unwrap().get("version").unwrap(), &Instance::Int(26));

    match validate_document(&registry, "Engine", &dir.path().join("bad_engine.json")) {
        Err(DjError::Validation(err)) => {
            assert_eq!(err.kind, ValidationErrorKind::MissingRequiredField { field: "version".into() });
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    match validate_document(&registry, "Cube", &dir.path().join("engine.yaml")) {
        Err(DjError::Schema(SchemaError::UnknownSchema(name))) => assert_eq!(name, "Cube"),
        other => panic!("expected an unknown schema, got {other:?}"),
    }
    match validate_document(&registry, "Engine", &dir.path().join("missing.json")) {
        Err(DjError::Schema(SchemaError::Load { .. })) => {}
        other => panic!("expected a load error, got {other:?}"),
    }
}
