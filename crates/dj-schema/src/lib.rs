//! # dj-schema: Schema-Driven Validation & Coercion
//!
//! One generic engine validates every payload shape. Shapes are described by
//! [`Schema`] values, not by per-model code:
//!
//! - [`schema`]: primitive, list, dict, reference and union schemas.
//! - [`composite`]: object descriptors (required set, ordered fields,
//!   additional-fields policy).
//! - [`registry`]: name-keyed store; references resolve at use time, so
//!   forward and cyclic references need no declaration order.
//! - [`engine`]: the [`Validator`], raw value tree in, immutable
//!   [`Instance`] or first [`ValidationError`](dj_core::ValidationError) out.
//! - [`union`]: first-match-wins resolution of alternative raw shapes.
//! - [`instance`]: validated values and their lossless wire encoding.
//! - [`typed`]: conversion of instances into native Rust types.
//! - [`loader`]: JSON/YAML declaration documents.
//! - [`codegen`]: Rust source for typed wrappers.
//!
//! ## Crate Policy
//!
//! - Depends only on `dj-core` internally.
//! - Validation is deterministic: the same schema and input always produce
//!   the same instance or the same error.
//! - Instances are never mutated; updates re-validate into a new instance.

pub mod codegen;
pub mod composite;
pub mod engine;
pub mod instance;
pub mod loader;
mod primitive;
pub mod registry;
pub mod schema;
pub mod typed;
pub mod union;

pub use composite::{AdditionalFields, CompositeBuilder, CompositeSchema, FieldDef};
pub use engine::{Validator, ValidatorOptions, DEFAULT_MAX_DEPTH};
pub use instance::{Instance, ObjectInstance};
pub use loader::{load_dir, load_document, load_file, register_declarations, validate_document};
pub use primitive::raw_shape;
pub use registry::{SchemaRegistry, UnresolvedReference};
pub use schema::{
    Constraints, DictSchema, ListSchema, Pattern, PrimitiveKind, PrimitiveSchema, Schema,
    UnionSchema,
};
pub use typed::{AccessError, FromInstance};
