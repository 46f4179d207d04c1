//! # Schema Names
//!
//! Composite schemas are registered and referenced by name. `SchemaName`
//! is the validated newtype for those names, so a reference can never be
//! built from an empty or malformed string.
//!
//! Accepted names start with an ASCII letter or underscore and continue with
//! ASCII alphanumerics, `_`, `.` or `-`. The dot is used for inline nested
//! composites (`Catalog.engines`).

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Validated name of a registered schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaName(String);

impl SchemaName {
    /// Validate and wrap a schema name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidName` for empty names or names with
    /// characters outside the accepted set.
    pub fn new(name: impl Into<String>) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut chars = name.chars();
        match chars.next() {
            None => {
                return Err(SchemaError::InvalidName {
                    name,
                    reason: "name is empty".into(),
                })
            }
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(SchemaError::InvalidName {
                    reason: format!("must start with a letter or '_', found {c:?}"),
                    name,
                })
            }
            Some(_) => {}
        }
        if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))) {
            return Err(SchemaError::InvalidName {
                reason: format!("unexpected character {c:?}"),
                name,
            });
        }
        Ok(Self(name))
    }

    /// Name of an inline composite nested under `field` of this schema.
    pub fn nested(&self, field: &str) -> Result<Self, SchemaError> {
        Self::new(format!("{}.{field}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SchemaName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SchemaName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for SchemaName {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SchemaName {
    type Error = SchemaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SchemaName> for String {
    fn from(name: SchemaName) -> Self {
        name.0
    }
}
