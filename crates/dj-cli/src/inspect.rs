//! # Inspection Subcommands
//!
//! `list`, `show` and `codegen`: read-only views of the registry.

use std::io::Write;

use clap::Args;
use dj_schema::{codegen, SchemaRegistry};

/// Arguments naming one registered schema.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Registered schema name.
    pub model: String,
}

/// Print every registered name with its kind, one per line.
///
/// # Errors
///
/// Fails only if writing to `out` fails.
pub fn list(registry: &SchemaRegistry, out: &mut dyn Write) -> anyhow::Result<()> {
    let width = registry.names().map(|n| n.as_str().len()).max().unwrap_or(0);
    for (name, schema) in registry.iter() {
        writeln!(out, "{:<width$}  {}", name.as_str(), schema.type_name())?;
    }
    Ok(())
}

/// Print the declaration summary of a schema.
///
/// # Errors
///
/// Fails if the name is not registered.
pub fn show(args: &ModelArgs, registry: &SchemaRegistry, out: &mut dyn Write) -> anyhow::Result<()> {
    let schema = registry
        .require(&args.model)
        .map_err(|e| crate::with_suggestions(registry, &args.model, e))?;
    match registry.composite(&args.model) {
        Some(composite) => write!(out, "{}", codegen::render_summary(composite))?,
        None => writeln!(out, "{} = {}", args.model, schema.type_name())?,
    }
    Ok(())
}

/// Print typed-wrapper source for a composite.
///
/// # Errors
///
/// Fails if the name is not a registered composite.
pub fn codegen(args: &ModelArgs, registry: &SchemaRegistry, out: &mut dyn Write) -> anyhow::Result<()> {
    let composite = registry
        .require_composite(&args.model)
        .map_err(|e| crate::with_suggestions(registry, &args.model, e))?;
    write!(out, "{}", codegen::render_wrapper(composite))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SchemaRegistry {
        crate::load_registry(None).unwrap()
    }

    fn capture(f: impl FnOnce(&mut dyn Write) -> anyhow::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = registry();
        let out = capture(|w| list(&registry, w));
        let names: Vec<&str> = out.lines().filter_map(|l| l.split_whitespace().next()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"Column"));
    }

    #[test]
    fn test_show_composite_and_alias() {
        let registry = registry();
        let column = capture(|w| show(&ModelArgs { model: "Column".into() }, &registry, w));
        assert!(column.contains("dimension_column"));
        let mode = capture(|w| show(&ModelArgs { model: "NodeMode".into() }, &registry, w));
        assert!(mode.starts_with("NodeMode = "));
    }

    #[test]
    fn test_codegen_column() {
        let registry = registry();
        let source = capture(|w| codegen(&ModelArgs { model: "Column".into() }, &registry, w));
        assert!(source.contains("pub struct Column"));
        assert!(source.contains("pub r#type: String"));
    }

    #[test]
    fn test_codegen_requires_composite() {
        let registry = registry();
        let mut out = Vec::new();
        let err = codegen(&ModelArgs { model: "Dialect".into() }, &registry, &mut out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<dj_core::SchemaError>(),
            Some(dj_core::SchemaError::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn test_show_unknown_name_is_an_error() {
        let registry = registry();
        let err = show(&ModelArgs { model: "Colum".into() }, &registry, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("did you mean Column"));
    }
}
