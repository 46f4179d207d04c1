//! # dj-models: DataJunction Payload Models
//!
//! Declarations of the DataJunction API payloads over the `dj-schema`
//! engine, and thin typed wrappers that read validated instances into
//! native structs.
//!
//! Validation never happens in the wrappers. [`Model::parse`] runs the
//! generic engine against the model's registered schema, then reads the
//! resulting [`ObjectInstance`]:
//!
//! ```ignore
//! let column = Column::parse(&json!({"name": "revenue", "type": "decimal", "id": "7"}))?;
//! assert_eq!(column.id, Presence::Value(7));
//! ```
//!
//! ## Crate Policy
//!
//! - Model shapes live in [`declarations`] only; wrappers add no rules.
//! - Optional payload fields are `Presence<T>` so omission and explicit
//!   null stay distinguishable after parsing.

pub mod catalog;
pub mod column;
pub mod declarations;
pub mod node;

use dj_core::{SchemaError, ValidationError};
use dj_schema::{AccessError, FromInstance, ObjectInstance, Validator};
use serde_json::Value;
use thiserror::Error;

pub use catalog::{Catalog, Dialect, Engine};
pub use column::{AttributeTypeName, AttributeTypeRef, Column, ColumnAttribute, ColumnAttributeInput};
pub use declarations::{build_registry, shared_registry};
pub use node::{CubeInput, MetricInput, NodeMode, NodeNamespace, SourceColumn, SourceNodeInput};

/// Parsing a payload into a model failed.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model declarations could not be built.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The payload does not conform to the model's schema.
    #[error("invalid payload: {0}")]
    Validation(#[from] ValidationError),

    /// The validated instance could not be read into the wrapper.
    #[error("cannot read instance: {0}")]
    Access(#[from] AccessError),
}

/// A typed wrapper over a registered composite.
pub trait Model: FromInstance {
    /// Registry name of the composite this model wraps.
    const SCHEMA_NAME: &'static str;

    /// Read a validated instance of [`Self::SCHEMA_NAME`].
    ///
    /// # Errors
    ///
    /// Returns `AccessError` if a field has the wrong presence or kind.
    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError>;

    /// Validate a raw payload against the shared model registry and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Validation` for a non-conforming payload.
    fn parse(raw: &Value) -> Result<Self, ModelError> {
        let registry = shared_registry()?;
        Self::parse_with(&registry.validator(), raw)
    }

    /// Validate a raw payload with a caller-provided validator and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Validation` for a non-conforming payload.
    fn parse_with(validator: &Validator<'_>, raw: &Value) -> Result<Self, ModelError> {
        let obj = validator.validate_object(Self::SCHEMA_NAME, raw)?;
        Ok(Self::from_object(&obj)?)
    }
}

/// Implement `FromInstance` for a model by delegating to `Model::from_object`.
macro_rules! model_from_instance {
    ($($ty:ty),+ $(,)?) => {$(
        impl dj_schema::FromInstance for $ty {
            fn from_instance(
                instance: &dj_schema::Instance,
            ) -> Result<Self, dj_schema::AccessError> {
                match instance.as_object() {
                    Some(obj) => <Self as $crate::Model>::from_object(obj),
                    None => Err(dj_schema::AccessError::WrongKind {
                        field: String::new(),
                        expected: "object",
                        found: instance.kind_name(),
                    }),
                }
            }
        }
    )+};
}

pub(crate) use model_from_instance;
