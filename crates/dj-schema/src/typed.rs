//! # Typed Access
//!
//! Conversion from validated [`Instance`]s into native Rust values, used by
//! the thin wrapper structs layered over the generic engine.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use dj_core::{Presence, PresenceError};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::instance::{Instance, ObjectInstance};

/// A typed read from an instance failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    /// The field carried no value.
    #[error(transparent)]
    Presence(#[from] PresenceError),

    /// The value has a different kind than the caller asked for.
    #[error("field '{field}': expected {expected}, found {found}")]
    WrongKind {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl AccessError {
    fn wrong_kind(expected: &'static str, found: &Instance) -> Self {
        AccessError::WrongKind {
            field: String::new(),
            expected,
            found: found.kind_name(),
        }
    }

    fn in_field(self, name: &str) -> Self {
        match self {
            AccessError::WrongKind { field, expected, found } => AccessError::WrongKind {
                field: if field.is_empty() || field.starts_with('[') {
                    format!("{name}{field}")
                } else {
                    format!("{name}.{field}")
                },
                expected,
                found,
            },
            AccessError::Presence(e) => AccessError::Presence(e),
        }
    }
}

/// Native types a validated instance converts into.
pub trait FromInstance: Sized {
    /// # Errors
    ///
    /// Returns `AccessError::WrongKind` if the instance is of another kind.
    fn from_instance(instance: &Instance) -> Result<Self, AccessError>;
}

macro_rules! from_scalar {
    ($ty:ty, $expected:literal, $pat:pat => $out:expr) => {
        impl FromInstance for $ty {
            fn from_instance(instance: &Instance) -> Result<Self, AccessError> {
                match instance {
                    $pat => Ok($out),
                    other => Err(AccessError::wrong_kind($expected, other)),
                }
            }
        }
    };
}

from_scalar!(String, "string", Instance::String(s) => s.clone());
from_scalar!(i64, "integer", Instance::Int(i) => *i);
from_scalar!(f64, "float", Instance::Float(f) => *f);
from_scalar!(bool, "boolean", Instance::Bool(b) => *b);
from_scalar!(Decimal, "decimal", Instance::Decimal(d) => *d);
from_scalar!(Vec<u8>, "bytes", Instance::Bytes(b) => b.clone());
from_scalar!(NaiveDate, "date", Instance::Date(d) => *d);
from_scalar!(DateTime<FixedOffset>, "date-time", Instance::DateTime(dt) => *dt);
from_scalar!(Uuid, "uuid", Instance::Uuid(u) => *u);
from_scalar!(ObjectInstance, "object", Instance::Object(o) => o.clone());

impl FromInstance for Instance {
    fn from_instance(instance: &Instance) -> Result<Self, AccessError> {
        Ok(instance.clone())
    }
}

/// The wire form of any instance.
impl FromInstance for Value {
    fn from_instance(instance: &Instance) -> Result<Self, AccessError> {
        Ok(instance.encode())
    }
}

impl<T: FromInstance> FromInstance for Vec<T> {
    fn from_instance(instance: &Instance) -> Result<Self, AccessError> {
        match instance {
            Instance::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| T::from_instance(item).map_err(|e| e.in_field(&format!("[{i}]"))))
                .collect(),
            other => Err(AccessError::wrong_kind("list", other)),
        }
    }
}

impl<T: FromInstance> FromInstance for BTreeMap<String, T> {
    fn from_instance(instance: &Instance) -> Result<Self, AccessError> {
        match instance {
            Instance::Dict(map) => map
                .iter()
                .map(|(k, v)| {
                    T::from_instance(v)
                        .map(|t| (k.clone(), t))
                        .map_err(|e| e.in_field(k))
                })
                .collect(),
            other => Err(AccessError::wrong_kind("dict", other)),
        }
    }
}

impl ObjectInstance {
    /// Read a field that must carry a value.
    ///
    /// # Errors
    ///
    /// `AccessError::Presence` if the field is unset, null or undeclared;
    /// `AccessError::WrongKind` if the value does not convert to `T`.
    pub fn required<T: FromInstance>(&self, name: &str) -> Result<T, AccessError> {
        let instance = self.get(name)?;
        T::from_instance(instance).map_err(|e| e.in_field(name))
    }

    /// Read a field keeping its presence state.
    ///
    /// # Errors
    ///
    /// `AccessError::WrongKind` if a present value does not convert to `T`.
    pub fn optional<T: FromInstance>(&self, name: &str) -> Result<Presence<T>, AccessError> {
        self.field(name)
            .try_map(T::from_instance)
            .map_err(|e| e.in_field(name))
    }

    /// Read a field folding `Unset` and `Null` into `None`.
    ///
    /// # Errors
    ///
    /// `AccessError::WrongKind` if a present value does not convert to `T`.
    pub fn nullable<T: FromInstance>(&self, name: &str) -> Result<Option<T>, AccessError> {
        self.optional(name).map(Presence::into_option)
    }
}
