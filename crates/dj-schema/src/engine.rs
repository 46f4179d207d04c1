//! # Instance Engine
//!
//! The single validation algorithm. [`Validator`] applies any [`Schema`] to a
//! raw value tree and returns an immutable [`Instance`], or the first
//! [`ValidationError`] encountered.
//!
//! ## Composite Algorithm
//!
//! 1. The raw value must be a mapping, otherwise `NotAnObject`.
//! 2. Required fields are checked in declaration order; the first absent one
//!    fails with `MissingRequiredField`.
//! 3. Each input key, in input order:
//!    - declared: coerced through the field schema; an explicit null becomes
//!      `Presence::Null` when the field accepts null, else `TypeMismatch`.
//!    - undeclared: handled by the additional-fields policy. A null is
//!      `Presence::Null` under `Any`; under `TypedAs(S)` it must pass `S`.
//! 4. Declared fields absent from the input are `Presence::Unset`.
//!
//! Errors on a nested value are wrapped with the enclosing field name, list
//! index or dict key as they propagate, so the reported path is always
//! relative to the instance root. No partial instance is ever returned.

use std::sync::Arc;

use dj_core::{PathSegment, Presence, ValidationError, ValidationErrorKind};
use serde_json::Value;

use crate::composite::{AdditionalFields, CompositeSchema, FieldDef};
use crate::instance::{Instance, ObjectInstance};
use crate::primitive::{self, raw_shape};
use crate::registry::SchemaRegistry;
use crate::schema::{DictSchema, ListSchema, Schema};

/// Nesting limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Deepest container nesting accepted before `DepthExceeded`.
    pub max_depth: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Applies schemas to raw values, resolving references through a registry.
///
/// Stateless apart from its borrowed registry; cheap to copy and safe to
/// share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
    options: ValidatorOptions,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_options(registry, ValidatorOptions::default())
    }

    pub fn with_options(registry: &'r SchemaRegistry, options: ValidatorOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Apply a schema to a raw value.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError`, with a root-relative path.
    pub fn validate(&self, schema: &Schema, raw: &Value) -> Result<Instance, ValidationError> {
        self.apply(schema, raw, 0).map_err(|e| {
            tracing::debug!(schema = %schema.type_name(), path = %e.path, kind = %e.kind, "validation failed");
            e
        })
    }

    /// Apply a registered schema to a raw value.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` if `name` is not registered, otherwise
    /// the first `ValidationError` from the payload.
    pub fn validate_named(&self, name: &str, raw: &Value) -> Result<Instance, ValidationError> {
        let schema = self.registry.get(name).ok_or_else(|| unresolved(name))?;
        tracing::debug!(schema = name, "validating payload");
        let instance = self.validate(schema, raw)?;
        tracing::debug!(schema = name, "payload valid");
        Ok(instance)
    }

    /// Validate a payload against a registered composite.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` if `name` does not name a registered
    /// composite, otherwise the first `ValidationError` from the payload.
    pub fn validate_object(&self, name: &str, raw: &Value) -> Result<ObjectInstance, ValidationError> {
        let composite = self.registry.composite(name).ok_or_else(|| unresolved(name))?;
        self.validate_composite(composite, raw)
    }

    /// Validate a payload against a composite descriptor.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError`, with a root-relative path.
    pub fn validate_composite(
        &self,
        composite: &Arc<CompositeSchema>,
        raw: &Value,
    ) -> Result<ObjectInstance, ValidationError> {
        let name = composite.name();
        tracing::debug!(schema = %name, "validating payload");
        match self.apply_composite(composite, raw, 0) {
            Ok(instance) => {
                tracing::debug!(schema = %name, fields = instance.len(), "payload valid");
                Ok(instance)
            }
            Err(e) => {
                tracing::debug!(schema = %name, path = %e.path, kind = %e.kind, "validation failed");
                Err(e)
            }
        }
    }

    /// A new instance with one field set to a raw value, re-validated in full.
    /// The original instance is untouched.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` of the changed payload.
    pub fn with_field(
        &self,
        instance: &ObjectInstance,
        field: &str,
        raw: Value,
    ) -> Result<ObjectInstance, ValidationError> {
        let mut map = instance.encode_map();
        map.insert(field.to_string(), raw);
        self.validate_composite(instance.schema(), &Value::Object(map))
    }

    /// A new instance with one field removed, leaving it `Unset`.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` when `field` is required.
    pub fn without_field(
        &self,
        instance: &ObjectInstance,
        field: &str,
    ) -> Result<ObjectInstance, ValidationError> {
        let mut map = instance.encode_map();
        map.remove(field);
        self.validate_composite(instance.schema(), &Value::Object(map))
    }

    pub(crate) fn apply(
        &self,
        schema: &Schema,
        raw: &Value,
        depth: usize,
    ) -> Result<Instance, ValidationError> {
        match schema {
            Schema::Primitive(p) => primitive::coerce(p, raw),
            Schema::List(list) => self.apply_list(list, raw, depth),
            Schema::Dict(dict) => self.apply_dict(dict, raw, depth),
            Schema::Object(composite) => self
                .apply_composite(composite, raw, depth)
                .map(Instance::Object),
            Schema::Ref(_) => {
                let target = self.registry.resolve(schema)?;
                self.apply(target, raw, depth)
            }
            Schema::Union(union) => self.apply_union(union, raw, depth),
        }
    }

    pub(crate) fn enter(&self, depth: usize) -> Result<(), ValidationError> {
        if depth >= self.options.max_depth {
            return Err(ValidationError::new(ValidationErrorKind::DepthExceeded {
                limit: self.options.max_depth,
            }));
        }
        Ok(())
    }

    fn apply_list(
        &self,
        list: &ListSchema,
        raw: &Value,
        depth: usize,
    ) -> Result<Instance, ValidationError> {
        let Value::Array(items) = raw else {
            return Err(ValidationError::type_mismatch(
                format!("list<{}>", list.items.type_name()),
                raw_shape(raw),
            ));
        };
        self.enter(depth)?;
        if let Some(min) = list.min_items {
            if items.len() < min {
                return Err(ValidationError::constraint(
                    "min_items",
                    format!("{} items, at least {min} required", items.len()),
                ));
            }
        }
        if let Some(max) = list.max_items {
            if items.len() > max {
                return Err(ValidationError::constraint(
                    "max_items",
                    format!("{} items, at most {max} allowed", items.len()),
                ));
            }
        }
        let coerced = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.apply(&list.items, item, depth + 1)
                    .map_err(|e| e.within(PathSegment::Index(i)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Instance::List(coerced))
    }

    fn apply_dict(
        &self,
        dict: &DictSchema,
        raw: &Value,
        depth: usize,
    ) -> Result<Instance, ValidationError> {
        let Value::Object(map) = raw else {
            return Err(ValidationError::type_mismatch(
                format!("dict<{}>", dict.values.type_name()),
                raw_shape(raw),
            ));
        };
        self.enter(depth)?;
        let coerced = map
            .iter()
            .map(|(key, value)| {
                self.apply(&dict.values, value, depth + 1)
                    .map(|v| (key.clone(), v))
                    .map_err(|e| e.within(PathSegment::Key(key.clone())))
            })
            .collect::<Result<_, _>>()?;
        Ok(Instance::Dict(coerced))
    }

    fn apply_composite(
        &self,
        composite: &Arc<CompositeSchema>,
        raw: &Value,
        depth: usize,
    ) -> Result<ObjectInstance, ValidationError> {
        let Value::Object(map) = raw else {
            return Err(ValidationError::new(ValidationErrorKind::NotAnObject {
                actual: raw_shape(raw).to_string(),
            }));
        };
        self.enter(depth)?;

        for field in composite.fields().iter().filter(|f| f.is_required()) {
            if !map.contains_key(field.name()) {
                return Err(ValidationError::new(ValidationErrorKind::MissingRequiredField {
                    field: field.name().to_string(),
                }));
            }
        }

        let mut declared: Vec<(String, Presence<Instance>)> = composite
            .fields()
            .iter()
            .map(|f| (f.name().to_string(), Presence::Unset))
            .collect();
        let mut additional = Vec::new();

        for (key, value) in map {
            match composite.position(key) {
                Some(i) => declared[i].1 = self.apply_declared(&composite.fields()[i], value, depth)?,
                None => additional.push((key.clone(), self.apply_additional(composite, key, value, depth)?)),
            }
        }

        for (name, presence) in &declared {
            tracing::trace!(schema = %composite.name(), field = %name, state = presence_label(presence), "field coerced");
        }

        declared.extend(additional);
        Ok(ObjectInstance::new(Arc::clone(composite), declared))
    }

    fn apply_declared(
        &self,
        field: &FieldDef,
        value: &Value,
        depth: usize,
    ) -> Result<Presence<Instance>, ValidationError> {
        if !value.is_null() {
            return self
                .apply_field(field.schema(), field.name(), value, depth)
                .map(Presence::Value);
        }
        if field.accepts_null() {
            Ok(Presence::Null)
        } else {
            Err(ValidationError::type_mismatch(field.schema().type_name(), "null")
                .within(PathSegment::Field(field.name().to_string())))
        }
    }

    fn apply_field(
        &self,
        schema: &Schema,
        key: &str,
        value: &Value,
        depth: usize,
    ) -> Result<Instance, ValidationError> {
        self.apply(schema, value, depth + 1)
            .map_err(|e| e.within(PathSegment::Field(key.to_string())))
    }

    fn apply_additional(
        &self,
        composite: &CompositeSchema,
        key: &str,
        value: &Value,
        depth: usize,
    ) -> Result<Presence<Instance>, ValidationError> {
        match composite.additional_fields_policy() {
            AdditionalFields::Forbidden => Err(ValidationError::new(
                ValidationErrorKind::UnexpectedField {
                    field: key.to_string(),
                },
            )),
            AdditionalFields::TypedAs(schema) => {
                let instance = self.apply_field(schema, key, value, depth)?;
                Ok(if value.is_null() { Presence::Null } else { Presence::Value(instance) })
            }
            AdditionalFields::Any if value.is_null() => Ok(Presence::Null),
            AdditionalFields::Any => Ok(Presence::Value(Instance::Any(value.clone()))),
        }
    }
}

fn unresolved(name: &str) -> ValidationError {
    ValidationError::new(ValidationErrorKind::UnresolvedReference {
        name: name.to_string(),
    })
}

fn presence_label(presence: &Presence<Instance>) -> &'static str {
    match presence {
        Presence::Unset => "unset",
        Presence::Null => "null",
        Presence::Value(_) => "value",
    }
}
