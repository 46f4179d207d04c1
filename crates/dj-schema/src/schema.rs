//! # Schema Values
//!
//! A [`Schema`] is an immutable descriptor of an expected payload shape. It
//! is data, not a type: the engine in [`crate::engine`] is parameterized over
//! a schema value, and no per-shape code exists.
//!
//! ## Kinds
//!
//! - **Primitive**: a leaf kind (`string`, `integer`, `decimal`, …) plus
//!   optional constraints.
//! - **List / Dict**: containers carrying one item schema.
//! - **Object**: an inline [`CompositeSchema`].
//! - **Ref**: a composite referenced by name. Resolved against the registry
//!   when validation reaches it, never at declaration time, so declarations
//!   may reference schemas defined later and may form cycles.
//! - **Union**: ordered alternatives; see [`crate::union`].

use std::fmt;
use std::sync::Arc;

use dj_core::{SchemaError, SchemaName};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::composite::CompositeSchema;

/// Leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// UTF-8 text.
    String,
    /// 64-bit signed whole number.
    Integer,
    /// 64-bit floating point.
    Float,
    /// Exact decimal, written as a number with its exact digits on the wire.
    Decimal,
    /// `true` / `false`.
    Boolean,
    /// Byte sequence, base64 text on the wire.
    Bytes,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// RFC 3339 timestamp.
    DateTime,
    /// Hyphenated UUID text.
    Uuid,
    /// Any JSON value, passed through unchanged.
    Any,
    /// Only an explicit null.
    Null,
}

impl PrimitiveKind {
    /// Returns the type name used in error messages and declarations.
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::Date => "date",
            PrimitiveKind::DateTime => "date-time",
            PrimitiveKind::Uuid => "uuid",
            PrimitiveKind::Any => "any",
            PrimitiveKind::Null => "null",
        }
    }

    /// Returns true for kinds that range constraints apply to.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Integer | PrimitiveKind::Float | PrimitiveKind::Decimal
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A compiled `pattern` constraint. Compares by source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidDeclaration` if the regex does not compile.
    pub fn new(source: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(source).map_err(|e| SchemaError::InvalidDeclaration {
            schema: format!("pattern {source:?}"),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored search, as JSON Schema `pattern` is.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Optional constraints checked after a leaf value has been coerced.
///
/// Length and pattern constraints apply to `string` (lengths in chars) and
/// `bytes` (lengths in bytes); range constraints apply to numeric kinds;
/// `allowed` applies to any kind and compares wire encodings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub allowed: Option<Vec<Value>>,
    pub minimum: Option<Decimal>,
    pub maximum: Option<Decimal>,
    pub exclusive_minimum: Option<Decimal>,
    pub exclusive_maximum: Option<Decimal>,
}

impl Constraints {
    /// Returns true if no constraint is declared.
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// A leaf schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    kind: PrimitiveKind,
    constraints: Constraints,
}

impl PrimitiveSchema {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            constraints: Constraints::default(),
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.constraints.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.constraints.max_length = Some(n);
        self
    }

    /// Add a `pattern` constraint.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidDeclaration` if the regex does not compile.
    pub fn pattern(mut self, source: &str) -> Result<Self, SchemaError> {
        self.constraints.pattern = Some(Pattern::new(source)?);
        Ok(self)
    }

    /// Restrict to an enumeration of wire values.
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraints.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn minimum(mut self, bound: impl Into<Decimal>) -> Self {
        self.constraints.minimum = Some(bound.into());
        self
    }

    pub fn maximum(mut self, bound: impl Into<Decimal>) -> Self {
        self.constraints.maximum = Some(bound.into());
        self
    }

    pub fn exclusive_minimum(mut self, bound: impl Into<Decimal>) -> Self {
        self.constraints.exclusive_minimum = Some(bound.into());
        self
    }

    pub fn exclusive_maximum(mut self, bound: impl Into<Decimal>) -> Self {
        self.constraints.exclusive_maximum = Some(bound.into());
        self
    }

    /// Replace all constraints at once.
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// List-of-T.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSchema {
    pub items: Schema,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Dict-of-V. Keys pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct DictSchema {
    pub values: Schema,
}

/// Ordered alternatives. The first candidate whose raw-shape check succeeds wins.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    pub candidates: Vec<Schema>,
}

/// An immutable schema descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Primitive(PrimitiveSchema),
    List(Box<ListSchema>),
    Dict(Box<DictSchema>),
    Object(Arc<CompositeSchema>),
    Ref(SchemaName),
    Union(UnionSchema),
}

impl Schema {
    pub fn string() -> Self {
        Self::primitive(PrimitiveKind::String)
    }

    pub fn integer() -> Self {
        Self::primitive(PrimitiveKind::Integer)
    }

    pub fn float() -> Self {
        Self::primitive(PrimitiveKind::Float)
    }

    pub fn decimal() -> Self {
        Self::primitive(PrimitiveKind::Decimal)
    }

    pub fn boolean() -> Self {
        Self::primitive(PrimitiveKind::Boolean)
    }

    pub fn bytes() -> Self {
        Self::primitive(PrimitiveKind::Bytes)
    }

    pub fn date() -> Self {
        Self::primitive(PrimitiveKind::Date)
    }

    pub fn date_time() -> Self {
        Self::primitive(PrimitiveKind::DateTime)
    }

    pub fn uuid() -> Self {
        Self::primitive(PrimitiveKind::Uuid)
    }

    pub fn any() -> Self {
        Self::primitive(PrimitiveKind::Any)
    }

    pub fn null() -> Self {
        Self::primitive(PrimitiveKind::Null)
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Schema::Primitive(PrimitiveSchema::new(kind))
    }

    pub fn list(items: Schema) -> Self {
        Schema::List(Box::new(ListSchema {
            items,
            min_items: None,
            max_items: None,
        }))
    }

    /// A list with item-count bounds.
    pub fn list_bounded(items: Schema, min_items: Option<usize>, max_items: Option<usize>) -> Self {
        Schema::List(Box::new(ListSchema {
            items,
            min_items,
            max_items,
        }))
    }

    pub fn dict(values: Schema) -> Self {
        Schema::Dict(Box::new(DictSchema { values }))
    }

    pub fn object(composite: CompositeSchema) -> Self {
        Schema::Object(Arc::new(composite))
    }

    pub fn reference(name: SchemaName) -> Self {
        Schema::Ref(name)
    }

    /// Reference a schema by name, validating the name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidName` for a malformed name.
    pub fn named(name: &str) -> Result<Self, SchemaError> {
        Ok(Schema::Ref(SchemaName::new(name)?))
    }

    pub fn union(candidates: Vec<Schema>) -> Self {
        Schema::Union(UnionSchema { candidates })
    }

    /// Short human-readable type name, used for error messages.
    pub fn type_name(&self) -> String {
        match self {
            Schema::Primitive(p) => p.kind().type_name().to_string(),
            Schema::List(l) => format!("list<{}>", l.items.type_name()),
            Schema::Dict(d) => format!("dict<{}>", d.values.type_name()),
            Schema::Object(c) => c.name().to_string(),
            Schema::Ref(name) => name.to_string(),
            Schema::Union(u) => u
                .candidates
                .iter()
                .map(Schema::type_name)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    /// Every name this schema references, directly or through nested schemas.
    ///
    /// Does not follow references into the registry.
    pub fn references(&self) -> Vec<&SchemaName> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    pub(crate) fn collect_references<'a>(&'a self, out: &mut Vec<&'a SchemaName>) {
        match self {
            Schema::Primitive(_) => {}
            Schema::List(l) => l.items.collect_references(out),
            Schema::Dict(d) => d.values.collect_references(out),
            Schema::Object(c) => c.collect_references(out),
            Schema::Ref(name) => out.push(name),
            Schema::Union(u) => u.candidates.iter().for_each(|c| c.collect_references(out)),
        }
    }
}

impl From<PrimitiveSchema> for Schema {
    fn from(p: PrimitiveSchema) -> Self {
        Schema::Primitive(p)
    }
}

impl From<CompositeSchema> for Schema {
    fn from(c: CompositeSchema) -> Self {
        Schema::Object(Arc::new(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Schema::string().type_name(), "string");
        assert_eq!(Schema::date_time().type_name(), "date-time");
        assert_eq!(Schema::list(Schema::integer()).type_name(), "list<integer>");
        assert_eq!(Schema::dict(Schema::any()).type_name(), "dict<any>");
        assert_eq!(
            Schema::union(vec![Schema::integer(), Schema::string()]).type_name(),
            "integer | string"
        );
        assert_eq!(Schema::named("Engine").unwrap().type_name(), "Engine");
    }

    #[test]
    fn test_named_rejects_bad_name() {
        assert!(Schema::named("not a name").is_err());
    }

    #[test]
    fn test_pattern_compiles_and_compares_by_source() {
        let a = Pattern::new("^[a-z_]+$").unwrap();
        let b = Pattern::new("^[a-z_]+$").unwrap();
        assert_eq!(a, b);
        assert!(a.is_match("dimension_id"));
        assert!(!a.is_match("Dimension"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = PrimitiveSchema::new(PrimitiveKind::String)
            .pattern("([unclosed")
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_constraint_builders() {
        let p = PrimitiveSchema::new(PrimitiveKind::Integer).minimum(1).maximum(10);
        assert_eq!(p.constraints().minimum, Some(Decimal::from(1)));
        assert_eq!(p.constraints().maximum, Some(Decimal::from(10)));
        assert!(!p.constraints().is_empty());
        assert!(PrimitiveSchema::new(PrimitiveKind::String).constraints().is_empty());
    }

    #[test]
    fn test_references_walk_nested_schemas() {
        let schema = Schema::union(vec![
            Schema::list(Schema::named("Engine").unwrap()),
            Schema::dict(Schema::named("Catalog").unwrap()),
            Schema::string(),
        ]);
        let names: Vec<&str> = schema.references().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["Engine", "Catalog"]);
    }
}
