//! # Schema Registry
//!
//! Name-keyed store of schema declarations. References ([`Schema::Ref`]) are
//! resolved against this store when validation reaches them, so a schema may
//! reference another registered later, or itself.
//!
//! The registry is populated during startup and read-only afterwards; a
//! [`Validator`] borrows it immutably, so it can be shared across threads
//! behind an `Arc` without locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use dj_core::{SchemaError, SchemaName, ValidationError, ValidationErrorKind};
use serde_json::Value;

use crate::composite::CompositeSchema;
use crate::engine::Validator;
use crate::instance::Instance;
use crate::schema::Schema;

/// Longest chain of name-to-name aliases followed before giving up.
const MAX_ALIAS_HOPS: usize = 32;

/// A schema reference the registry cannot satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Schema whose declaration contains the reference.
    pub referrer: SchemaName,
    /// The missing name.
    pub target: SchemaName,
}

/// Registered schemas, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<SchemaName, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under a name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateSchema` if the name is already taken.
    pub fn register(&mut self, name: SchemaName, schema: Schema) -> Result<(), SchemaError> {
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateSchema(name.to_string()));
        }
        tracing::debug!(schema = %name, kind = %schema.type_name(), "registered schema");
        self.schemas.insert(name, schema);
        Ok(())
    }

    /// Register a composite under its own name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateSchema` if the name is already taken.
    pub fn register_composite(
        &mut self,
        composite: CompositeSchema,
    ) -> Result<Arc<CompositeSchema>, SchemaError> {
        let name = composite.name().clone();
        let shared = Arc::new(composite);
        self.register(name, Schema::Object(Arc::clone(&shared)))?;
        Ok(shared)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Look up a registered composite, following name aliases.
    pub fn composite(&self, name: &str) -> Option<&Arc<CompositeSchema>> {
        let mut current = self.get(name)?;
        for _ in 0..MAX_ALIAS_HOPS {
            match current {
                Schema::Object(c) => return Some(c),
                Schema::Ref(next) => current = self.get(next.as_str())?,
                _ => return None,
            }
        }
        None
    }

    /// Like [`get`](Self::get), for callers that treat a missing name as an error.
    ///
    /// # Errors
    ///
    /// `SchemaError::UnknownSchema` if nothing is registered under `name`.
    pub fn require(&self, name: &str) -> Result<&Schema, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    /// Like [`composite`](Self::composite), for callers that need an object schema.
    ///
    /// # Errors
    ///
    /// `SchemaError::UnknownSchema` if the name is missing, or
    /// `SchemaError::InvalidDeclaration` if it names a non-composite schema.
    pub fn require_composite(&self, name: &str) -> Result<&Arc<CompositeSchema>, SchemaError> {
        let schema = self.require(name)?;
        self.composite(name).ok_or_else(|| SchemaError::InvalidDeclaration {
            schema: name.to_string(),
            reason: format!("expected a composite, found {}", schema.type_name()),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &SchemaName> {
        self.schemas.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SchemaName, &Schema)> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Move every schema from `other` into this registry.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateSchema` on the first name present in
    /// both; schemas merged before the clash stay registered.
    pub fn merge(&mut self, other: SchemaRegistry) -> Result<(), SchemaError> {
        for (name, schema) in other.schemas {
            self.register(name, schema)?;
        }
        Ok(())
    }

    /// Follow a schema through references until a non-reference schema.
    ///
    /// Looked up at every use; nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedReference` naming the first missing schema, or the
    /// first schema of an alias cycle.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, ValidationError> {
        let mut current = schema;
        for _ in 0..MAX_ALIAS_HOPS {
            let Schema::Ref(name) = current else {
                return Ok(current);
            };
            current = self.get(name.as_str()).ok_or_else(|| {
                ValidationError::new(ValidationErrorKind::UnresolvedReference {
                    name: name.to_string(),
                })
            })?;
        }
        let name = match schema {
            Schema::Ref(name) => name.to_string(),
            other => other.type_name(),
        };
        Err(ValidationError::new(ValidationErrorKind::UnresolvedReference { name }))
    }

    /// Every reference, across all registered schemas, whose target is not
    /// registered. Ordered by referrer, then by position in the declaration.
    ///
    /// Never required before validating; an unresolved reference fails only
    /// when a payload reaches it.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut missing = Vec::new();
        for (referrer, schema) in &self.schemas {
            for target in schema.references() {
                if !self.contains(target.as_str()) {
                    missing.push(UnresolvedReference {
                        referrer: referrer.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        missing
    }

    /// A validator over this registry with default options.
    pub fn validator(&self) -> Validator<'_> {
        Validator::new(self)
    }

    /// Validate a raw value against a registered schema.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered.
    pub fn validate(&self, name: &str, raw: &Value) -> Result<Instance, ValidationError> {
        self.validator().validate_named(name, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name(s: &str) -> SchemaName {
        SchemaName::new(s).unwrap()
    }

    fn engine() -> CompositeSchema {
        CompositeSchema::builder("Engine")
            .required("name", Schema::string())
            .optional("version", Schema::string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SchemaRegistry::new();
        registry.register_composite(engine()).unwrap();
        assert!(registry.get("Engine").is_some());
        assert!(registry.composite("Engine").is_some());
        assert!(registry.get("Catalog").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_require_reports_unknown_and_non_composite() {
        let mut registry = SchemaRegistry::new();
        registry.register_composite(engine()).unwrap();
        registry.register(name("Version"), Schema::string()).unwrap();

        assert!(registry.require_composite("Engine").is_ok());
        assert!(matches!(registry.require("Catalog"), Err(SchemaError::UnknownSchema(n)) if n == "Catalog"));
        assert!(matches!(
            registry.require_composite("Catalog"),
            Err(SchemaError::UnknownSchema(_))
        ));
        assert!(matches!(
            registry.require_composite("Version"),
            Err(SchemaError::InvalidDeclaration { ref schema, .. }) if schema == "Version"
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register_composite(engine()).unwrap();
        let err = registry.register_composite(engine()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSchema(ref n) if n == "Engine"));
    }

    #[test]
    fn test_forward_reference_resolves_after_registration() {
        let mut registry = SchemaRegistry::new();
        let catalog = CompositeSchema::builder("Catalog")
            .required("name", Schema::string())
            .optional("engines", Schema::list(Schema::named("Engine").unwrap()))
            .build()
            .unwrap();
        registry.register_composite(catalog).unwrap();
        assert_eq!(registry.unresolved_references().len(), 1);

        registry.register_composite(engine()).unwrap();
        assert!(registry.unresolved_references().is_empty());
        let value = registry
            .validate("Catalog", &json!({"name": "default", "engines": [{"name": "spark"}]}))
            .unwrap();
        assert!(value.as_object().is_some());
    }

    #[test]
    fn test_resolve_follows_aliases() {
        let mut registry = SchemaRegistry::new();
        registry.register_composite(engine()).unwrap();
        registry.register(name("QueryEngine"), Schema::named("Engine").unwrap()).unwrap();
        let alias = Schema::named("QueryEngine").unwrap();
        assert!(matches!(registry.resolve(&alias).unwrap(), Schema::Object(_)));
        assert!(registry.composite("QueryEngine").is_some());
    }

    #[test]
    fn test_resolve_missing_and_cyclic() {
        let mut registry = SchemaRegistry::new();
        let missing = Schema::named("Nope").unwrap();
        assert_eq!(
            registry.resolve(&missing).unwrap_err().kind,
            ValidationErrorKind::UnresolvedReference { name: "Nope".into() }
        );

        registry.register(name("A"), Schema::named("B").unwrap()).unwrap();
        registry.register(name("B"), Schema::named("A").unwrap()).unwrap();
        let a = Schema::named("A").unwrap();
        assert!(matches!(
            registry.resolve(&a).unwrap_err().kind,
            ValidationErrorKind::UnresolvedReference { .. }
        ));
    }

    #[test]
    fn test_unresolved_references_report_referrer() {
        let mut registry = SchemaRegistry::new();
        let node = CompositeSchema::builder("Node")
            .optional("parent", Schema::named("Node").unwrap())
            .optional("owner", Schema::named("User").unwrap())
            .build()
            .unwrap();
        registry.register_composite(node).unwrap();
        assert_eq!(
            registry.unresolved_references(),
            vec![UnresolvedReference { referrer: name("Node"), target: name("User") }]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = SchemaRegistry::new();
        a.register_composite(engine()).unwrap();
        let mut b = SchemaRegistry::new();
        b.register(name("Tag"), Schema::string()).unwrap();
        a.merge(b).unwrap();
        let names: Vec<&str> = a.names().map(SchemaName::as_str).collect();
        assert_eq!(names, vec!["Engine", "Tag"]);

        let mut c = SchemaRegistry::new();
        c.register(name("Tag"), Schema::integer()).unwrap();
        assert!(a.merge(c).is_err());
    }
}
