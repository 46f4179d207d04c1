//! Catalogs and query engines.

use std::fmt;

use dj_core::Presence;
use dj_schema::{AccessError, FromInstance, Instance, ObjectInstance};

use crate::declarations::{CATALOG, ENGINE};
use crate::{model_from_instance, Model};

/// SQL dialect spoken by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Spark,
    Trino,
    Druid,
    Postgres,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Spark => "spark",
            Dialect::Trino => "trino",
            Dialect::Druid => "druid",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromInstance for Dialect {
    fn from_instance(instance: &Instance) -> Result<Self, AccessError> {
        match instance.as_str() {
            Some("spark") => Ok(Dialect::Spark),
            Some("trino") => Ok(Dialect::Trino),
            Some("druid") => Ok(Dialect::Druid),
            Some("postgres") => Ok(Dialect::Postgres),
            _ => Err(AccessError::WrongKind {
                field: String::new(),
                expected: "dialect",
                found: instance.kind_name(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    pub name: String,
    /// Always text; numeric versions are rendered in decimal.
    pub version: String,
    pub uri: Presence<String>,
    pub dialect: Presence<Dialect>,
}

impl Model for Engine {
    const SCHEMA_NAME: &'static str = ENGINE;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        let version = match obj.get("version")? {
            Instance::Int(v) => v.to_string(),
            _ => obj.required("version")?,
        };
        Ok(Self {
            name: obj.required("name")?,
            version,
            uri: obj.optional("uri")?,
            dialect: obj.optional("dialect")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub name: String,
    pub engines: Presence<Vec<Engine>>,
}

impl Catalog {
    /// Engines of the catalog; empty when none were given.
    pub fn engines(&self) -> &[Engine] {
        self.engines.value().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Model for Catalog {
    const SCHEMA_NAME: &'static str = CATALOG;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            name: obj.required("name")?,
            engines: obj.optional("engines")?,
        })
    }
}

model_from_instance!(Engine, Catalog);
