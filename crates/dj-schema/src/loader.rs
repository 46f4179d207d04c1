//! # Declaration Loader
//!
//! Reads schema declarations from JSON or YAML documents and registers them.
//! The vocabulary is a JSON Schema subset, so existing model descriptions
//! can be reused:
//!
//! ```yaml
//! name: Column
//! required: [name, type]
//! additionalProperties: false
//! properties:
//!   name: { type: string }
//!   type: { type: string }
//!   id: { type: integer }
//!   attributes:
//!     type: array
//!     items: { $ref: ColumnAttribute }
//! ```
//!
//! A document holds one declaration or a list of them. Property order in
//! the document is the field declaration order. `$ref` targets are stored by
//! name and resolved at validation time, so they may name schemas declared
//! in other files or not yet loaded.
//!
//! ## Type Mapping
//!
//! | `type` | `format` | schema |
//! |---|---|---|
//! | `string` | none / `date` / `date-time` / `uuid` / `decimal` / `byte` | string / date / date-time / uuid / decimal / bytes |
//! | `integer` | | integer |
//! | `number` | none / `decimal` | float / decimal |
//! | `boolean`, `null` | | boolean, null |
//! | `array` | | list of `items` (default any) |
//! | `object` with `properties` | | inline composite named `Parent.field` |
//! | `object` without `properties` | | dict of `additionalProperties` (default any) |
//! | absent | | any, unless `$ref` / `anyOf` / `properties` is given |
//!
//! `type` may also be a list (`[string, "null"]`); `null` in the list marks a
//! property nullable and the remaining types form a union.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use dj_core::{DjError, FieldPath, PathSegment, SchemaError, SchemaName};
use rust_decimal::Decimal;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::composite::{AdditionalFields, CompositeSchema, FieldDef};
use crate::instance::Instance;
use crate::registry::SchemaRegistry;
use crate::schema::{Constraints, Pattern, PrimitiveKind, PrimitiveSchema, Schema};

/// File suffixes picked up by [`load_dir`].
pub const DECLARATION_SUFFIXES: [&str; 3] = [".schema.json", ".schema.yaml", ".schema.yml"];

/// One declaration, or a nested type inside one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDecl {
    /// Registry name; required at the top level only.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: Option<TypeField>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
    #[serde(default, alias = "oneOf")]
    pub any_of: Option<Vec<TypeDecl>>,
    #[serde(default)]
    pub items: Option<Box<TypeDecl>>,
    #[serde(default, deserialize_with = "ordered_properties")]
    pub properties: Option<Vec<(String, TypeDecl)>>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub additional_properties: Option<AdditionalDecl>,
    #[serde(rename = "enum", default)]
    pub allowed: Option<Vec<Value>>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub minimum: Option<Number>,
    #[serde(default)]
    pub maximum: Option<Number>,
    #[serde(default)]
    pub exclusive_minimum: Option<Number>,
    #[serde(default)]
    pub exclusive_maximum: Option<Number>,
    #[serde(default)]
    pub min_items: Option<usize>,
    #[serde(default)]
    pub max_items: Option<usize>,
}

/// `type: string` or `type: [string, "null"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeField {
    One(String),
    Many(Vec<String>),
}

/// `additionalProperties: false` or `additionalProperties: { type: ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalDecl {
    Flag(bool),
    Schema(Box<TypeDecl>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Many(Vec<TypeDecl>),
    One(Box<TypeDecl>),
}

/// Deserialize `properties` keeping document order.
fn ordered_properties<'de, D>(deserializer: D) -> Result<Option<Vec<(String, TypeDecl)>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PropertiesVisitor;

    impl<'de> Visitor<'de> for PropertiesVisitor {
        type Value = Vec<(String, TypeDecl)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of field names to type declarations")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, TypeDecl>()? {
                out.push(entry);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(PropertiesVisitor).map(Some)
}

impl TypeDecl {
    fn type_names(&self) -> Vec<&str> {
        match &self.type_ {
            None => Vec::new(),
            Some(TypeField::One(t)) => vec![t.as_str()],
            Some(TypeField::Many(ts)) => ts.iter().map(String::as_str).collect(),
        }
    }

    /// Nullable flag, or `null` listed among several types.
    fn is_nullable(&self) -> bool {
        self.nullable || matches!(&self.type_, Some(TypeField::Many(ts)) if ts.iter().any(|t| t == "null"))
    }

    fn is_composite(&self) -> bool {
        self.properties.is_some()
            || (!self.required.is_empty() && self.reference.is_none() && self.any_of.is_none())
            || (self.type_names() == ["object"]
                && matches!(self.additional_properties, Some(AdditionalDecl::Flag(false))))
    }

    fn constraints(&self, owner: &SchemaName) -> Result<Constraints, SchemaError> {
        let bound = |n: &Option<Number>| -> Result<Option<Decimal>, SchemaError> {
            n.as_ref()
                .map(|n| {
                    let text = n.to_string();
                    Decimal::from_str(&text)
                        .or_else(|_| Decimal::from_scientific(&text))
                        .map_err(|e| invalid(owner, format!("bound {text} is not a decimal: {e}")))
                })
                .transpose()
        };
        Ok(Constraints {
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern.as_deref().map(Pattern::new).transpose()?,
            allowed: self.allowed.clone(),
            minimum: bound(&self.minimum)?,
            maximum: bound(&self.maximum)?,
            exclusive_minimum: bound(&self.exclusive_minimum)?,
            exclusive_maximum: bound(&self.exclusive_maximum)?,
        })
    }
}

fn invalid(owner: &SchemaName, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidDeclaration {
        schema: owner.to_string(),
        reason: reason.into(),
    }
}

/// Reference targets may be bare names, `#/definitions/<name>`, `#/$defs/<name>`
/// or file names such as `engine.schema.json`.
fn reference_name(target: &str) -> Result<SchemaName, SchemaError> {
    let last = target.rsplit('/').next().unwrap_or(target);
    let bare = DECLARATION_SUFFIXES
        .iter()
        .find_map(|suffix| last.strip_suffix(suffix))
        .unwrap_or(last);
    SchemaName::new(bare)
}

fn primitive_kind(type_name: &str, format: Option<&str>) -> Option<PrimitiveKind> {
    let kind = match (type_name, format) {
        ("string", Some("date")) | ("date", _) => PrimitiveKind::Date,
        ("string", Some("date-time")) | ("date-time" | "datetime", _) => PrimitiveKind::DateTime,
        ("string", Some("uuid")) | ("uuid", _) => PrimitiveKind::Uuid,
        ("string", Some("decimal")) | ("number", Some("decimal")) | ("decimal", _) => {
            PrimitiveKind::Decimal
        }
        ("string", Some("byte" | "binary")) | ("bytes", _) => PrimitiveKind::Bytes,
        ("string", _) => PrimitiveKind::String,
        ("integer", _) => PrimitiveKind::Integer,
        ("number" | "float", _) => PrimitiveKind::Float,
        ("boolean", _) => PrimitiveKind::Boolean,
        ("null", _) => PrimitiveKind::Null,
        ("any", _) => PrimitiveKind::Any,
        _ => return None,
    };
    Some(kind)
}

/// Convert a nested declaration. `hint` names inline composites.
fn to_schema(decl: &TypeDecl, hint: &SchemaName) -> Result<Schema, SchemaError> {
    if let Some(target) = &decl.reference {
        return Ok(Schema::Ref(reference_name(target)?));
    }
    if let Some(candidates) = &decl.any_of {
        let schemas = candidates
            .iter()
            .map(|c| to_schema(c, hint))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Schema::union(schemas));
    }
    if decl.is_composite() {
        return Ok(Schema::object(to_composite(decl, hint.clone())?));
    }

    let names: Vec<&str> = decl.type_names();
    let non_null: Vec<&str> = names.iter().copied().filter(|t| *t != "null").collect();
    match non_null.as_slice() {
        [] if names.is_empty() => Ok(Schema::any()),
        [] => Ok(Schema::null()),
        [single] => single_type(decl, single, hint),
        several => {
            let schemas = several
                .iter()
                .map(|t| single_type(decl, t, hint))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Schema::union(schemas))
        }
    }
}

fn single_type(decl: &TypeDecl, type_name: &str, hint: &SchemaName) -> Result<Schema, SchemaError> {
    match type_name {
        "array" | "list" => {
            let items = match &decl.items {
                Some(items) => to_schema(items, hint)?,
                None => Schema::any(),
            };
            Ok(Schema::list_bounded(items, decl.min_items, decl.max_items))
        }
        "object" | "dict" => {
            let values = match &decl.additional_properties {
                Some(AdditionalDecl::Schema(values)) => to_schema(values, hint)?,
                _ => Schema::any(),
            };
            Ok(Schema::dict(values))
        }
        other => {
            let kind = primitive_kind(other, decl.format.as_deref())
                .ok_or_else(|| invalid(hint, format!("unknown type '{other}'")))?;
            let primitive = PrimitiveSchema::new(kind).with_constraints(decl.constraints(hint)?);
            Ok(Schema::Primitive(primitive))
        }
    }
}

fn to_composite(decl: &TypeDecl, name: SchemaName) -> Result<CompositeSchema, SchemaError> {
    let properties = decl.properties.as_deref().unwrap_or_default();
    for required in &decl.required {
        if !properties.iter().any(|(field, _)| field == required) {
            return Err(invalid(&name, format!("required field '{required}' is not declared")));
        }
    }

    let mut builder = CompositeSchema::builder(name.as_str());
    if let Some(description) = &decl.description {
        builder = builder.description(description.clone());
    }
    for (field, field_decl) in properties {
        let hint = name.nested(field).unwrap_or_else(|_| name.clone());
        let mut def = FieldDef::new(field.clone(), to_schema(field_decl, &hint)?)
            .required(decl.required.contains(field))
            .nullable(field_decl.is_nullable());
        if let Some(description) = &field_decl.description {
            def = def.describe(description.clone());
        }
        builder = builder.field(def);
    }
    let policy = match &decl.additional_properties {
        None | Some(AdditionalDecl::Flag(true)) => AdditionalFields::Any,
        Some(AdditionalDecl::Flag(false)) => AdditionalFields::Forbidden,
        Some(AdditionalDecl::Schema(values)) => {
            let hint = name.nested("additional").unwrap_or_else(|_| name.clone());
            AdditionalFields::TypedAs(to_schema(values, &hint)?)
        }
    };
    builder.additional_fields(policy).build()
}

/// Convert a top-level declaration into its registry entry.
///
/// # Errors
///
/// Returns `SchemaError::InvalidDeclaration` for a missing `name`, an unknown
/// type, a required field that is not declared, or a malformed constraint.
pub fn declaration_to_schema(decl: &TypeDecl) -> Result<(SchemaName, Schema), SchemaError> {
    let raw_name = decl.name.as_deref().ok_or_else(|| SchemaError::InvalidDeclaration {
        schema: "(unnamed)".to_string(),
        reason: "top-level declarations need a 'name'".to_string(),
    })?;
    let name = SchemaName::new(raw_name)?;
    let schema = if decl.is_composite() {
        Schema::object(to_composite(decl, name.clone())?)
    } else {
        to_schema(decl, &name)?
    };
    Ok((name, schema))
}

/// Parse the declarations held by a document value.
///
/// # Errors
///
/// Returns `SchemaError::Load` if the value is not a declaration or a list
/// of them, or the first conversion error.
pub fn parse_declarations(document: Value, source: &str) -> Result<Vec<(SchemaName, Schema)>, SchemaError> {
    let parsed: Document = serde_json::from_value(document).map_err(|e| SchemaError::Load {
        source_name: source.to_string(),
        reason: format!("not a schema declaration: {e}"),
    })?;
    let decls = match parsed {
        Document::Many(decls) => decls,
        Document::One(decl) => vec![*decl],
    };
    decls.iter().map(declaration_to_schema).collect()
}

/// Register every declaration in a document value.
///
/// # Errors
///
/// Returns parse and conversion errors, or `SchemaError::DuplicateSchema`.
pub fn register_declarations(
    registry: &mut SchemaRegistry,
    document: Value,
    source: &str,
) -> Result<usize, SchemaError> {
    let entries = parse_declarations(document, source)?;
    let count = entries.len();
    for (name, schema) in entries {
        registry.register(name, schema)?;
    }
    tracing::info!(source, count, "registered schema declarations");
    Ok(count)
}

/// Load a JSON or YAML document; the format is chosen by extension
/// (`.yaml`/`.yml` for YAML, anything else JSON).
///
/// # Errors
///
/// Returns `SchemaError::Load` if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let load_err = |reason: String| SchemaError::Load {
        source_name: path.display().to_string(),
        reason,
    };
    let content =
        std::fs::read_to_string(path).map_err(|e| load_err(format!("cannot read file: {e}")))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| load_err(format!("invalid YAML: {e}")))?;
            yaml_to_json(&yaml, &path.display().to_string())
        }
        _ => serde_json::from_str(&content).map_err(|e| load_err(format!("invalid JSON: {e}"))),
    }
}

/// Read a payload document and validate it against the schema registered
/// under `name`.
///
/// # Errors
///
/// `DjError::Schema` if the name is not registered or the document cannot be
/// read; `DjError::Validation` if the payload does not conform.
pub fn validate_document(registry: &SchemaRegistry, name: &str, path: &Path) -> Result<Instance, DjError> {
    registry.require(name)?;
    let payload = load_document(path)?;
    let instance = registry.validate(name, &payload)?;
    tracing::debug!(schema = name, path = %path.display(), "validated payload document");
    Ok(instance)
}

/// Register the declarations of one file.
///
/// # Errors
///
/// Returns load, parse and conversion errors, or `SchemaError::DuplicateSchema`.
pub fn load_file(registry: &mut SchemaRegistry, path: &Path) -> Result<usize, SchemaError> {
    let document = load_document(path)?;
    register_declarations(registry, document, &path.display().to_string())
}

fn is_declaration_file(name: &str) -> bool {
    DECLARATION_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Register every `*.schema.{json,yaml,yml}` file in a directory (not
/// recursive), in file-name order. Other files are skipped.
///
/// # Errors
///
/// Returns `SchemaError::Load` if the directory cannot be read, or the first
/// error from a declaration file.
pub fn load_dir(registry: &mut SchemaRegistry, dir: &Path) -> Result<usize, SchemaError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::Load {
        source_name: dir.display().to_string(),
        reason: format!("cannot read schema directory: {e}"),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if path.is_file() && is_declaration_file(name) => paths.push(path),
            _ => tracing::debug!(path = %path.display(), "skipping non-declaration file"),
        }
    }
    paths.sort();

    let mut total = 0;
    for path in &paths {
        total += load_file(registry, path)?;
    }
    tracing::info!(dir = %dir.display(), files = paths.len(), schemas = total, "loaded schema directory");
    Ok(total)
}

/// Convert a parsed YAML document into the JSON value tree the loader and
/// the engine consume.
///
/// Only the JSON-compatible subset of YAML is accepted. Tags are dropped,
/// numbers keep their literal digits, scalar keys are rendered as text.
///
/// # Errors
///
/// Returns `SchemaError::Load` naming the document location of the first
/// node with no JSON form (non-finite numbers, sequence or mapping keys).
pub fn yaml_to_json(yaml: &serde_yaml::Value, source: &str) -> Result<Value, SchemaError> {
    let mut at = Vec::new();
    yaml_node(yaml, &mut at).map_err(|reason| SchemaError::Load {
        source_name: source.to_string(),
        reason: format!("{}: {reason}", FieldPath::from(at)),
    })
}

fn yaml_node(node: &serde_yaml::Value, at: &mut Vec<PathSegment>) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    let value = match node {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => serde_json::from_str::<Number>(&n.to_string())
            .map(Value::Number)
            .map_err(|_| format!("number {n} has no JSON form"))?,
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Tagged(tagged) => return yaml_node(&tagged.value, at),
        Yaml::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                at.push(PathSegment::Index(i));
                out.push(yaml_node(item, at)?);
                at.pop();
            }
            Value::Array(out)
        }
        Yaml::Mapping(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                let key = match key {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Null => "null".to_string(),
                    _ => return Err("mapping keys must be scalars".to_string()),
                };
                at.push(PathSegment::Key(key.clone()));
                let converted = yaml_node(item, at)?;
                at.pop();
                out.insert(key, converted);
            }
            Value::Object(out)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_one(value: Value) -> (SchemaName, Schema) {
        let mut entries = parse_declarations(value, "test").unwrap();
        assert_eq!(entries.len(), 1);
        entries.remove(0)
    }

    fn column_decl() -> Value {
        json!({
            "name": "Column",
            "description": "A column on a node",
            "required": ["name", "type"],
            "additionalProperties": false,
            "properties": {
                "name": {"type": "string"},
                "type": {"type": "string"},
                "id": {"type": "integer"},
                "dimension_id": {"type": "integer"},
                "dimension_column": {"type": ["string", "null"]},
                "attributes": {"type": "array", "items": {"$ref": "#/definitions/ColumnAttribute"}}
            }
        })
    }

    #[test]
    fn test_composite_declaration() {
        let (name, schema) = parse_one(column_decl());
        assert_eq!(name.as_str(), "Column");
        let Schema::Object(column) = schema else {
            panic!("expected a composite");
        };
        let fields: Vec<&str> = column.fields().iter().map(FieldDef::name).collect();
        assert_eq!(fields, vec!["name", "type", "id", "dimension_id", "dimension_column", "attributes"]);
        assert_eq!(column.additional_fields_policy(), &AdditionalFields::Forbidden);
        assert!(column.field("name").unwrap().is_required());
        assert!(column.field("dimension_column").unwrap().is_nullable());
        assert_eq!(column.field_schema("dimension_column"), Some(&Schema::string()));
        assert_eq!(
            column.field_schema("attributes"),
            Some(&Schema::list(Schema::named("ColumnAttribute").unwrap()))
        );
        assert_eq!(column.description(), Some("A column on a node"));
    }

    #[test]
    fn test_formats_and_constraints() {
        let (_, schema) = parse_one(json!({
            "name": "Metric",
            "properties": {
                "created_at": {"type": "string", "format": "date-time"},
                "day": {"type": "string", "format": "date"},
                "ratio": {"type": "number", "format": "decimal", "minimum": 0, "maximum": 1.5},
                "score": {"type": "number"},
                "payload": {"type": "string", "format": "byte"},
                "id": {"type": "string", "format": "uuid"},
                "mode": {"type": "string", "enum": ["published", "draft"]},
                "slug": {"type": "string", "pattern": "^[a-z_]+$", "maxLength": 64}
            }
        }));
        let Schema::Object(metric) = schema else { panic!("expected a composite") };
        let kind = |f: &str| match metric.field_schema(f) {
            Some(Schema::Primitive(p)) => p.kind(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(kind("created_at"), PrimitiveKind::DateTime);
        assert_eq!(kind("day"), PrimitiveKind::Date);
        assert_eq!(kind("ratio"), PrimitiveKind::Decimal);
        assert_eq!(kind("score"), PrimitiveKind::Float);
        assert_eq!(kind("payload"), PrimitiveKind::Bytes);
        assert_eq!(kind("id"), PrimitiveKind::Uuid);
        let Some(Schema::Primitive(ratio)) = metric.field_schema("ratio") else { unreachable!() };
        assert_eq!(ratio.constraints().maximum, Some(Decimal::new(15, 1)));
        let Some(Schema::Primitive(slug)) = metric.field_schema("slug") else { unreachable!() };
        assert_eq!(slug.constraints().max_length, Some(64));
        assert!(slug.constraints().pattern.is_some());
        let Some(Schema::Primitive(mode)) = metric.field_schema("mode") else { unreachable!() };
        assert_eq!(mode.constraints().allowed, Some(vec![json!("published"), json!("draft")]));
    }

    #[test]
    fn test_inline_objects_dicts_and_unions() {
        let (_, schema) = parse_one(json!({
            "name": "Engine",
            "properties": {
                "version": {"anyOf": [{"type": "string"}, {"type": "integer"}]},
                "options": {"type": "object", "additionalProperties": {"type": "string"}},
                "extra": {"type": "object"},
                "owner": {"properties": {"email": {"type": "string"}}, "required": ["email"]}
            }
        }));
        let Schema::Object(engine) = schema else { panic!("expected a composite") };
        assert_eq!(
            engine.field_schema("version"),
            Some(&Schema::union(vec![Schema::string(), Schema::integer()]))
        );
        assert_eq!(engine.field_schema("options"), Some(&Schema::dict(Schema::string())));
        assert_eq!(engine.field_schema("extra"), Some(&Schema::dict(Schema::any())));
        let Some(Schema::Object(owner)) = engine.field_schema("owner") else { panic!("inline composite") };
        assert_eq!(owner.name().as_str(), "Engine.owner");
        assert_eq!(engine.additional_fields_policy(), &AdditionalFields::Any);
    }

    #[test]
    fn test_list_document_and_alias() {
        let entries = parse_declarations(
            json!([
                {"name": "EngineName", "type": "string", "minLength": 1},
                {"name": "QueryEngine", "$ref": "engine.schema.json"}
            ]),
            "test",
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].1, Schema::named("engine").unwrap());
    }

    #[test]
    fn test_rejections() {
        let missing_name = parse_declarations(json!({"type": "string"}), "t").unwrap_err();
        assert!(matches!(missing_name, SchemaError::InvalidDeclaration { .. }));

        let undeclared_required =
            parse_declarations(json!({"name": "X", "required": ["a"], "properties": {}}), "t").unwrap_err();
        assert!(undeclared_required.to_string().contains("'a' is not declared"));

        let unknown_type =
            parse_declarations(json!({"name": "X", "properties": {"a": {"type": "tuple"}}}), "t").unwrap_err();
        assert!(unknown_type.to_string().contains("unknown type 'tuple'"));

        let bad_pattern = parse_declarations(json!({"name": "X", "type": "string", "pattern": "(["}), "t");
        assert!(bad_pattern.is_err());

        let not_a_decl = parse_declarations(json!(42), "t").unwrap_err();
        assert!(matches!(not_a_decl, SchemaError::Load { .. }));
    }

    #[test]
    fn test_yaml_to_json_conversion() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "name: Column\nrequired: [name]\nproperties:\n  name: {type: string}\n  id: {type: integer}\n",
        )
        .unwrap();
        let json = yaml_to_json(&yaml, "column.schema.yaml").unwrap();
        assert_eq!(json["required"], json!(["name"]));
        let (_, schema) = parse_one(json);
        let Schema::Object(column) = schema else { panic!("expected a composite") };
        let fields: Vec<&str> = column.fields().iter().map(FieldDef::name).collect();
        assert_eq!(fields, vec!["name", "id"]);
    }

    #[test]
    fn test_yaml_without_json_form_names_the_location() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("properties:\n  ratio:\n    maximum: .inf\n").unwrap();
        let err = yaml_to_json(&yaml, "ratio.schema.yaml").unwrap_err();
        let SchemaError::Load { source_name, reason } = err else {
            panic!("expected a load error");
        };
        assert_eq!(source_name, "ratio.schema.yaml");
        assert!(reason.starts_with("properties.ratio.maximum:"), "{reason}");

    }

    #[test]
    fn test_yaml_numbers_keep_their_digits() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("limit: 100\nratio: 0.25\n").unwrap();
        let json = yaml_to_json(&yaml, "payload.yaml").unwrap();
        assert_eq!(json, json!({"limit": 100, "ratio": 0.25}));
    }

    #[test]
    fn test_declaration_file_suffixes() {
        assert!(is_declaration_file("column.schema.json"));
        assert!(is_declaration_file("column.schema.yml"));
        assert!(!is_declaration_file("column.json"));
        assert!(!is_declaration_file("README.md"));
    }
}
