//! # Typed-Wrapper Code Generation
//!
//! Renders Rust source for thin typed wrappers over validated composites.
//! The generic engine stays the single validation path; a wrapper only
//! reads fields out of an [`ObjectInstance`](crate::ObjectInstance) into
//! native types.
//!
//! | field declaration | wrapper field |
//! |---|---|
//! | required | `T` |
//! | required, nullable | `Option<T>` |
//! | optional | `Presence<T>` |
//!
//! Referenced composites render as their own wrapper type, so generating
//! wrappers for every registered composite yields a self-contained module.
//! Inline composites render as `ObjectInstance` and unions as `Instance`.

use crate::composite::{AdditionalFields, CompositeSchema, FieldDef};
use crate::schema::{PrimitiveKind, Schema};

const STRICT_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
    "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try", "typeof",
    "unsized", "virtual", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Rust type name for a schema name: last dotted segment, PascalCase.
pub fn type_ident(schema_name: &str) -> String {
    let last = schema_name.rsplit('.').next().unwrap_or(schema_name);
    let mut out = String::with_capacity(last.len());
    let mut upper = true;
    for c in last.chars() {
        if c == '_' || c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'T');
    }
    out
}

/// Rust field identifier for a payload field name.
pub fn field_ident(field: &str) -> String {
    let mut ident: String = field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    } else if STRICT_KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

fn rust_type(schema: &Schema) -> String {
    match schema {
        Schema::Primitive(p) => match p.kind() {
            PrimitiveKind::String => "String".into(),
            PrimitiveKind::Integer => "i64".into(),
            PrimitiveKind::Float => "f64".into(),
            PrimitiveKind::Decimal => "rust_decimal::Decimal".into(),
            PrimitiveKind::Boolean => "bool".into(),
            PrimitiveKind::Bytes => "Vec<u8>".into(),
            PrimitiveKind::Date => "chrono::NaiveDate".into(),
            PrimitiveKind::DateTime => "chrono::DateTime<chrono::FixedOffset>".into(),
            PrimitiveKind::Uuid => "uuid::Uuid".into(),
            PrimitiveKind::Any | PrimitiveKind::Null => "serde_json::Value".into(),
        },
        Schema::List(list) => format!("Vec<{}>", rust_type(&list.items)),
        Schema::Dict(dict) => format!("std::collections::BTreeMap<String, {}>", rust_type(&dict.values)),
        Schema::Object(_) => "ObjectInstance".into(),
        Schema::Ref(name) => type_ident(name.as_str()),
        Schema::Union(_) => "Instance".into(),
    }
}

fn wrapper_type(field: &FieldDef) -> String {
    let inner = rust_type(field.schema());
    match (field.is_required(), field.is_nullable()) {
        (true, false) => inner,
        (true, true) => format!("Option<{inner}>"),
        (false, _) => format!("Presence<{inner}>"),
    }
}

fn accessor(field: &FieldDef) -> &'static str {
    match (field.is_required(), field.is_nullable()) {
        (true, false) => "required",
        (true, true) => "nullable",
        (false, _) => "optional",
    }
}

/// Render a wrapper struct and its `FromInstance` impl.
pub fn render_wrapper(schema: &CompositeSchema) -> String {
    let ty = type_ident(schema.name().as_str());
    let mut out = String::new();

    out.push_str(&format!(
        "// Generated by `djs codegen` from schema `{}`.\n\n",
        schema.name()
    ));
    out.push_str("use dj_core::Presence;\n");
    out.push_str("use dj_schema::{AccessError, FromInstance, Instance, ObjectInstance};\n\n");

    match schema.description() {
        Some(description) => {
            for line in description.lines() {
                out.push_str(&format!("/// {line}\n"));
            }
        }
        None => out.push_str(&format!("/// Typed view of a validated `{}`.\n", schema.name())),
    }
    out.push_str("#[derive(Debug, Clone, PartialEq)]\n");
    out.push_str(&format!("pub struct {ty} {{\n"));
    for field in schema.fields() {
        if let Some(description) = field.description() {
            out.push_str(&format!("    /// {description}\n"));
        }
        out.push_str(&format!(
            "    pub {}: {},\n",
            field_ident(field.name()),
            wrapper_type(field)
        ));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl {ty} {{\n"));
    out.push_str(&format!(
        "    pub const SCHEMA_NAME: &'static str = {:?};\n",
        schema.name().as_str()
    ));
    out.push_str("}\n\n");

    out.push_str(&format!("impl FromInstance for {ty} {{\n"));
    out.push_str("    fn from_instance(instance: &Instance) -> Result<Self, AccessError> {\n");
    out.push_str("        let obj = ObjectInstance::from_instance(instance)?;\n");
    out.push_str("        Ok(Self {\n");
    for field in schema.fields() {
        out.push_str(&format!(
            "            {}: obj.{}({:?})?,\n",
            field_ident(field.name()),
            accessor(field),
            field.name()
        ));
    }
    out.push_str("        })\n");
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}

/// Human-readable declaration summary: policy, then one line per field.
pub fn render_summary(schema: &CompositeSchema) -> String {
    let policy = match schema.additional_fields_policy() {
        AdditionalFields::Forbidden => "forbidden".to_string(),
        AdditionalFields::Any => "any".to_string(),
        AdditionalFields::TypedAs(s) => s.type_name(),
    };
    let mut out = format!("{} (additional fields: {policy})\n", schema.name());
    if let Some(description) = schema.description() {
        out.push_str(&format!("  {description}\n"));
    }
    let width = schema.fields().iter().map(|f| f.name().len()).max().unwrap_or(0);
    for field in schema.fields() {
        let mut flags = Vec::new();
        if field.is_required() {
            flags.push("required");
        }
        if field.is_nullable() {
            flags.push("nullable");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", flags.join(", "))
        };
        out.push_str(&format!(
            "  {:<width$}  {}{flags}\n",
            field.name(),
            field.schema().type_name()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> CompositeSchema {
        CompositeSchema::builder("Column")
            .description("A column on a node.")
            .required("name", Schema::string())
            .required("type", Schema::string())
            .optional("id", Schema::integer())
            .optional("dimension_id", Schema::integer())
            .optional("attributes", Schema::list(Schema::named("ColumnAttribute").unwrap()))
            .required_nullable("display_name", Schema::string())
            .forbid_additional()
            .build()
            .unwrap()
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(type_ident("Column"), "Column");
        assert_eq!(type_ident("node_namespace"), "NodeNamespace");
        assert_eq!(type_ident("Engine.owner"), "Owner");
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("self"), "self_");
        assert_eq!(field_ident("display-name"), "display_name");
        assert_eq!(field_ident("2fa"), "_2fa");
    }

    #[test]
    fn test_render_wrapper_fields() {
        let source = render_wrapper(&column());
        assert!(source.contains("pub struct Column {"));
        assert!(source.contains("/// A column on a node."));
        assert!(source.contains("    pub name: String,\n"));
        assert!(source.contains("    pub r#type: String,\n"));
        assert!(source.contains("    pub id: Presence<i64>,\n"));
        assert!(source.contains("    pub attributes: Presence<Vec<ColumnAttribute>>,\n"));
        assert!(source.contains("    pub display_name: Option<String>,\n"));
        assert!(source.contains("pub const SCHEMA_NAME: &'static str = \"Column\";"));
    }

    #[test]
    fn test_render_wrapper_accessors() {
        let source = render_wrapper(&column());
        assert!(source.contains("r#type: obj.required(\"type\")?,"));
        assert!(source.contains("id: obj.optional(\"id\")?,"));
        assert!(source.contains("display_name: obj.nullable(\"display_name\")?,"));
    }

    #[test]
    fn test_render_summary() {
        let summary = render_summary(&column());
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "Column (additional fields: forbidden)");
        assert!(lines.iter().any(|l| l.trim_start().starts_with("name") && l.ends_with("string  [required]")));
        assert!(lines.iter().any(|l| l.contains("list<ColumnAttribute>")));
        assert!(lines.iter().any(|l| l.ends_with("[required, nullable]")));
    }
}
