//! # Validate Subcommand
//!
//! Validates one payload document against a named schema and prints either
//! the re-encoded instance or the structured error.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use dj_core::{DjError, SchemaError, ValidationError};
use dj_schema::{loader, SchemaRegistry};
use serde_json::json;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Registered schema name, e.g. `Column` or `SourceNodeInput`.
    pub model: String,

    /// Payload document (`.json`, `.yaml` or `.yml`).
    pub file: PathBuf,

    /// Print the error report as JSON instead of a single line.
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable form of a validation failure.
pub fn error_report(model: &str, err: &ValidationError) -> serde_json::Value {
    json!({
        "model": model,
        "valid": false,
        "path": err.path.to_string(),
        "error": err.kind.to_string(),
    })
}

/// Run the subcommand. Returns `Ok(false)` when the payload is invalid.
///
/// # Errors
///
/// Fails if the schema is unknown or the payload file cannot be read.
pub fn run(args: &ValidateArgs, registry: &SchemaRegistry, out: &mut dyn Write) -> anyhow::Result<bool> {
    match loader::validate_document(registry, &args.model, &args.file) {
        Ok(instance) => {
            let encoded = serde_json::to_string_pretty(&instance)?;
            writeln!(out, "{encoded}")?;
            Ok(true)
        }
        Err(DjError::Validation(err)) => {
            tracing::debug!(model = %args.model, path = %err.path, "payload rejected");
            if args.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&error_report(&args.model, &err))?)?;
            } else {
                writeln!(out, "invalid {}: {err}", args.model)?;
            }
            Ok(false)
        }
        Err(DjError::Schema(err @ SchemaError::UnknownSchema(_))) => {
            Err(crate::with_suggestions(registry, &args.model, err))
        }
        Err(err) => Err(anyhow::Error::new(err).context(format!("validating {}", args.file.display()))),
    }
}
