//! # dj-cli: DataJunction Schema Command-Line Interface
//!
//! The `djs` binary. Validates payload documents against the registered
//! DataJunction models and inspects the declarations themselves.
//!
//! ## Subcommands
//!
//! - `validate`: Validate a JSON/YAML payload against a named model
//! - `list`: List registered schema names
//! - `show`: Print a declaration summary
//! - `codegen`: Emit typed-wrapper Rust source for a composite
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `dj-schema` and `dj-models` and write to
//!   a caller-supplied writer, so they are testable without a process.

pub mod inspect;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use dj_core::SchemaError;
use dj_schema::{loader, SchemaRegistry};

/// Build the registry for a CLI invocation: the built-in model declarations,
/// plus every declaration file under `schemas` when given.
///
/// # Errors
///
/// Fails if a declaration file is malformed or redeclares a built-in name.
pub fn load_registry(schemas: Option<&Path>) -> anyhow::Result<SchemaRegistry> {
    let mut registry = dj_models::build_registry().context("building model declarations")?;
    if let Some(dir) = schemas {
        let added = loader::load_dir(&mut registry, dir)
            .with_context(|| format!("loading declarations from {}", dir.display()))?;
        tracing::info!(dir = %dir.display(), added, "merged declaration directory");
    }
    let unresolved = registry.unresolved_references();
    for missing in &unresolved {
        tracing::warn!(referrer = %missing.referrer, target = %missing.target, "unresolved schema reference");
    }
    Ok(registry)
}

/// Attach close registered names to a failed lookup of `name`.
pub(crate) fn with_suggestions(registry: &SchemaRegistry, name: &str, err: SchemaError) -> anyhow::Error {
    let lowered = name.to_ascii_lowercase();
    let similar: Vec<&str> = registry
        .names()
        .map(|n| n.as_str())
        .filter(|n| n.to_ascii_lowercase().contains(&lowered))
        .collect();
    let hint = if similar.is_empty() {
        "see `djs list` for registered names".to_string()
    } else {
        format!("did you mean {}?", similar.join(", "))
    };
    anyhow::Error::new(err).context(format!("cannot use schema '{name}' ({hint})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_loads() {
        let registry = load_registry(None).unwrap();
        assert!(registry.composite("Column").is_some());
    }

    #[test]
    fn test_extra_declarations_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tag.schema.json"),
            r#"{"name": "Tag", "required": ["label"], "properties": {"label": {"type": "string"}, "column": {"$ref": "Column"}}}"#,
        )
        .unwrap();
        let registry = load_registry(Some(dir.path())).unwrap();
        assert!(registry.composite("Tag").is_some());
        assert!(registry.unresolved_references().is_empty());
    }

    #[test]
    fn test_redeclaring_a_builtin_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("column.schema.json"),
            r#"{"name": "Column", "properties": {"name": {"type": "string"}}}"#,
        )
        .unwrap();
        assert!(load_registry(Some(dir.path())).is_err());
    }

    #[test]
    fn test_unknown_schema_suggests_names() {
        let registry = load_registry(None).unwrap();
        let err = registry.require("column").unwrap_err();
        let err = with_suggestions(&registry, "column", err);
        assert!(err.to_string().contains("did you mean"));
        assert!(err.to_string().contains("Column"));
        let source = err.downcast_ref::<SchemaError>().unwrap();
        assert!(matches!(source, SchemaError::UnknownSchema(name) if name == "column"));
    }
}
