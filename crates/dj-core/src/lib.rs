//! # dj-core: Foundational Types for the DataJunction Schema Engine
//!
//! This crate is the leaf of the workspace DAG. It defines the small,
//! dependency-light vocabulary every other crate speaks:
//!
//! 1. **`Presence<T>`.** The three-way field state `Unset | Null | Value(T)`.
//!    Omission, explicit null and an actual value are never conflated.
//!
//! 2. **`FieldPath`.** Root-relative dotted/indexed location of a value inside
//!    a payload, used by every validation failure.
//!
//! 3. **Error taxonomy.** `ValidationError` with a closed `ValidationErrorKind`,
//!    `PresenceError` for total accessors, `SchemaError` for declaration
//!    problems. All derive `thiserror::Error`.
//!
//! 4. **`SchemaName`.** Validated newtype for the names composites are
//!    registered and referenced under.
//!
//! 5. **Temporal parsing.** Strict `date` and RFC 3339 `date-time` parsing and
//!    their canonical wire renderings.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dj-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod name;
pub mod path;
pub mod presence;
pub mod temporal;

pub use error::{DjError, PresenceError, SchemaError, ValidationError, ValidationErrorKind};
pub use name::SchemaName;
pub use path::{FieldPath, PathSegment};
pub use presence::Presence;
