//! # Validated Instances
//!
//! An [`Instance`] is the immutable result of applying a schema to raw input.
//! Composite results are [`ObjectInstance`]s: ordered, dictionary-like views
//! over declared fields (in declaration order) followed by accepted
//! additional fields (in input order), each carrying a [`Presence`].
//!
//! ## Wire Encoding
//!
//! [`Instance::encode`] turns an instance back into the mapping/sequence/scalar
//! tree it was validated from. `Unset` fields are omitted, `Null` fields are
//! written as `null`. Decoding the encoding with the same schema yields an
//! equal instance:
//!
//! | kind | wire form |
//! |---|---|
//! | decimal | number, digits and scale preserved (`12.50`) |
//! | bytes | standard base64 text |
//! | date | `YYYY-MM-DD` |
//! | date-time | RFC 3339, original offset |
//! | uuid | hyphenated text |
//!
//! Instances own their nested instances exclusively and expose no mutation.
//! Updates go through [`crate::engine::Validator::with_field`] and produce a
//! new instance.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveDate};
use dj_core::temporal::{format_date, format_datetime};
use dj_core::{Presence, PresenceError, SchemaName};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::composite::CompositeSchema;

/// A validated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    /// An explicit null accepted by a `null` schema.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Uuid(Uuid),
    /// A value accepted unchanged by an `any` schema.
    Any(Value),
    List(Vec<Instance>),
    Dict(BTreeMap<String, Instance>),
    Object(ObjectInstance),
}

impl Instance {
    /// Returns the kind name of this instance.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instance::Null => "null",
            Instance::Bool(_) => "boolean",
            Instance::Int(_) => "integer",
            Instance::Float(_) => "float",
            Instance::Decimal(_) => "decimal",
            Instance::String(_) => "string",
            Instance::Bytes(_) => "bytes",
            Instance::Date(_) => "date",
            Instance::DateTime(_) => "date-time",
            Instance::Uuid(_) => "uuid",
            Instance::Any(_) => "any",
            Instance::List(_) => "list",
            Instance::Dict(_) => "dict",
            Instance::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Instance::Null | Instance::Any(Value::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Instance::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Instance::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Instance::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Instance::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Instance::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Instance::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&NaiveDate> {
        match self {
            Instance::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Instance::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Instance::Uuid(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_any(&self) -> Option<&Value> {
        match self {
            Instance::Any(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Instance]> {
        match self {
            Instance::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, Instance>> {
        match self {
            Instance::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectInstance> {
        match self {
            Instance::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Re-encode to the wire-shaped value tree.
    pub fn encode(&self) -> Value {
        match self {
            Instance::Null => Value::Null,
            Instance::Bool(b) => Value::Bool(*b),
            Instance::Int(i) => Value::Number((*i).into()),
            // Coercion rejects non-finite floats, so from_f64 always succeeds.
            Instance::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Instance::Decimal(d) => encode_decimal(d),
            Instance::String(s) => Value::String(s.clone()),
            Instance::Bytes(b) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            Instance::Date(d) => Value::String(format_date(d)),
            Instance::DateTime(dt) => Value::String(format_datetime(dt)),
            Instance::Uuid(u) => Value::String(u.hyphenated().to_string()),
            Instance::Any(v) => v.clone(),
            Instance::List(items) => Value::Array(items.iter().map(Instance::encode).collect()),
            Instance::Dict(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.encode()))
                    .collect(),
            ),
            Instance::Object(obj) => Value::Object(obj.encode_map()),
        }
    }
}

/// Decimals stay numbers on the wire so a re-decode picks the same union
/// candidate as the original number did. With `arbitrary_precision` the
/// number keeps the exact digits of the decimal.
fn encode_decimal(d: &Decimal) -> Value {
    let text = d.to_string();
    match serde_json::from_str::<Number>(&text) {
        Ok(n) => Value::Number(n),
        Err(_) => Value::String(text),
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

/// A validated composite: declared fields, then accepted additional fields.
#[derive(Clone)]
pub struct ObjectInstance {
    schema: Arc<CompositeSchema>,
    entries: Vec<(String, Presence<Instance>)>,
}

impl ObjectInstance {
    /// Assembled by the engine only. `entries` must hold every declared field
    /// in declaration order, followed by additional fields.
    pub(crate) fn new(schema: Arc<CompositeSchema>, entries: Vec<(String, Presence<Instance>)>) -> Self {
        debug_assert!(entries.len() >= schema.fields().len());
        Self { schema, entries }
    }

    /// The composite this instance was validated against.
    pub fn schema(&self) -> &Arc<CompositeSchema> {
        &self.schema
    }

    pub fn schema_name(&self) -> &SchemaName {
        self.schema.name()
    }

    fn entry(&self, name: &str) -> Option<&Presence<Instance>> {
        match self.schema.position(name) {
            Some(i) => self.entries.get(i).map(|(_, p)| p),
            None => self.additional_entries().find(|(k, _)| k == name).map(|(_, p)| p),
        }
    }

    fn additional_entries(&self) -> impl Iterator<Item = &(String, Presence<Instance>)> {
        self.entries.iter().skip(self.schema.fields().len())
    }

    /// Total access: the coerced value of a field.
    ///
    /// # Errors
    ///
    /// Returns `PresenceError::Unset` or `PresenceError::Null` naming the
    /// field when it carries no value, and `PresenceError::Undeclared` when
    /// the name is neither declared nor an accepted additional field.
    pub fn get(&self, name: &str) -> Result<&Instance, PresenceError> {
        match self.entry(name) {
            Some(presence) => presence.get().map_err(|e| e.for_field(name)),
            None => Err(PresenceError::Undeclared {
                field: name.to_string(),
            }),
        }
    }

    /// Partial access: the presence state of a field. Never fails; unknown
    /// names report `Unset`.
    pub fn field(&self, name: &str) -> Presence<&Instance> {
        self.entry(name).map_or(Presence::Unset, Presence::as_ref)
    }

    /// Returns true if the field is present (value or null).
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_set()
    }

    /// Present fields as `(name, presence)` pairs, declared then additional.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Presence<&Instance>)> {
        self.entries
            .iter()
            .filter(|(_, p)| p.is_set())
            .map(|(k, p)| (k.as_str(), p.as_ref()))
    }

    /// Every declared field, including unset ones, then additional fields.
    pub fn iter_all(&self) -> impl Iterator<Item = (&str, Presence<&Instance>)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p.as_ref()))
    }

    /// Ordinal access over present fields.
    pub fn get_index(&self, index: usize) -> Option<(&str, Presence<&Instance>)> {
        self.iter().nth(index)
    }

    /// Names of accepted additional fields, in input order.
    pub fn additional_names(&self) -> impl Iterator<Item = &str> {
        self.additional_entries().map(|(k, _)| k.as_str())
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|(_, p)| p.is_set()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode present fields; `Unset` fields are omitted.
    pub fn encode_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (name, presence) in &self.entries {
            match presence {
                Presence::Unset => {}
                Presence::Null => {
                    map.insert(name.clone(), Value::Null);
                }
                Presence::Value(v) => {
                    map.insert(name.clone(), v.encode());
                }
            }
        }
        map
    }

    pub fn encode(&self) -> Value {
        Value::Object(self.encode_map())
    }
}

impl PartialEq for ObjectInstance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.entries == other.entries
    }
}

impl fmt::Debug for ObjectInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectInstance")
            .field("schema", &self.schema.name().as_str())
            .field("entries", &self.entries)
            .finish()
    }
}

impl Serialize for ObjectInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn schema() -> Arc<CompositeSchema> {
        Arc::new(
            CompositeSchema::builder("Engine")
                .required("name", Schema::string())
                .optional("version", Schema::string())
                .optional("uri", Schema::string())
                .build()
                .unwrap(),
        )
    }

    fn engine() -> ObjectInstance {
        ObjectInstance::new(
            schema(),
            vec![
                ("name".into(), Presence::Value(Instance::String("spark".into()))),
                ("version".into(), Presence::Null),
                ("uri".into(), Presence::Unset),
                ("owner".into(), Presence::Value(Instance::Any(json!("data-eng")))),
            ],
        )
    }

    #[test]
    fn test_total_access() {
        let obj = engine();
        assert_eq!(obj.get("name").unwrap().as_str(), Some("spark"));
        assert_eq!(
            obj.get("uri").unwrap_err(),
            PresenceError::Unset { field: Some("uri".into()) }
        );
        assert_eq!(
            obj.get("version").unwrap_err(),
            PresenceError::Null { field: Some("version".into()) }
        );
        assert!(matches!(obj.get("nope"), Err(PresenceError::Undeclared { .. })));
    }

    #[test]
    fn test_partial_access_never_fails() {
        let obj = engine();
        assert!(obj.field("uri").is_unset());
        assert!(obj.field("version").is_null());
        assert!(obj.field("nope").is_unset());
        assert!(obj.field("owner").is_value());
    }

    #[test]
    fn test_iteration_order_declared_then_additional() {
        let obj = engine();
        let names: Vec<&str> = obj.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["name", "version", "owner"]);
        let all: Vec<&str> = obj.iter_all().map(|(k, _)| k).collect();
        assert_eq!(all, vec!["name", "version", "uri", "owner"]);
        assert_eq!(obj.len(), 3);
        assert_eq!(obj.get_index(2).map(|(k, _)| k), Some("owner"));
        assert_eq!(obj.additional_names().collect::<Vec<_>>(), vec!["owner"]);
    }

    #[test]
    fn test_encode_omits_unset_and_keeps_null() {
        let encoded = engine().encode();
        assert_eq!(
            encoded,
            json!({"name": "spark", "version": null, "owner": "data-eng"})
        );
        assert!(encoded.get("uri").is_none());
    }

    #[test]
    fn test_scalar_encodings() {
        let decimal = Instance::Decimal("12.50".parse().unwrap()).encode();
        assert!(decimal.is_number());
        assert_eq!(decimal.to_string(), "12.50");
        let precise = Instance::Decimal("79228162514264337593543950.335".parse().unwrap()).encode();
        assert_eq!(precise.to_string(), "79228162514264337593543950.335");
        assert_eq!(Instance::Bytes(b"dj".to_vec()).encode(), json!("ZGo="));
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Instance::Date(date).encode(), json!("2024-03-01"));
        assert_eq!(Instance::Float(1.5).encode(), json!(1.5));
        assert_eq!(
            Instance::List(vec![Instance::Int(1), Instance::Null]).encode(),
            json!([1, null])
        );
    }

    #[test]
    fn test_serialize_matches_encode() {
        let obj = engine();
        let via_serde = serde_json::to_value(&obj).unwrap();
        assert_eq!(via_serde, obj.encode());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(engine(), engine());
        let other = ObjectInstance::new(
            schema(),
            vec![
                ("name".into(), Presence::Value(Instance::String("trino".into()))),
                ("version".into(), Presence::Null),
                ("uri".into(), Presence::Unset),
            ],
        );
        assert_ne!(engine(), other);
    }
}
