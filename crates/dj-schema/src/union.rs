//! # Union Resolution
//!
//! A union field accepts several raw shapes. Candidates are tried in
//! declaration order with a shallow raw-shape check; the engine commits to
//! the first candidate that accepts the shape and coerces through it. There
//! is no backtracking: if the committed candidate then fails (a constraint,
//! a nested field), that failure is the result, even when a later candidate
//! would have succeeded.
//!
//! The shape check per candidate kind:
//!
//! - primitive: the raw value converts to the kind (constraints ignored)
//! - list: the raw value is a sequence
//! - dict / composite: the raw value is a mapping
//! - reference: the shape check of the resolved schema
//! - nested union: any of its candidates accepts

use dj_core::{ValidationError, ValidationErrorKind};
use serde_json::Value;

use crate::engine::Validator;
use crate::instance::Instance;
use crate::primitive::{self, raw_shape};
use crate::schema::{Schema, UnionSchema};

impl Validator<'_> {
    pub(crate) fn apply_union(
        &self,
        union: &UnionSchema,
        raw: &Value,
        depth: usize,
    ) -> Result<Instance, ValidationError> {
        for (i, candidate) in union.candidates.iter().enumerate() {
            if self.accepts_shape(candidate, raw, depth)? {
                tracing::trace!(candidate = i, kind = %candidate.type_name(), "union candidate selected");
                return self.apply(candidate, raw, depth);
            }
        }
        Err(ValidationError::new(ValidationErrorKind::NoMatchingAlternative {
            candidates: union.candidates.iter().map(Schema::type_name).collect(),
            actual: raw_shape(raw).to_string(),
        }))
    }

    /// Shallow shape check. `depth` guards against reference cycles that
    /// never reach a concrete shape.
    pub(crate) fn accepts_shape(
        &self,
        schema: &Schema,
        raw: &Value,
        depth: usize,
    ) -> Result<bool, ValidationError> {
        self.enter(depth)?;
        Ok(match schema {
            Schema::Primitive(p) => primitive::accepts_shape(p.kind(), raw),
            Schema::List(_) => raw.is_array(),
            Schema::Dict(_) | Schema::Object(_) => raw.is_object(),
            Schema::Ref(_) => {
                let target = self.registry().resolve(schema)?;
                return self.accepts_shape(target, raw, depth + 1);
            }
            Schema::Union(nested) => {
                for candidate in &nested.candidates {
                    if self.accepts_shape(candidate, raw, depth + 1)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }
}
