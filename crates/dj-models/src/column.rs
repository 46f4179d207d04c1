//! Columns and column attributes.

use dj_core::Presence;
use dj_schema::{AccessError, FromInstance, Instance, ObjectInstance};

use crate::declarations::{ATTRIBUTE_TYPE_NAME, COLUMN, COLUMN_ATTRIBUTE, COLUMN_ATTRIBUTE_INPUT};
use crate::{model_from_instance, Model};

/// Namespace assumed for attribute types given by bare name.
pub const DEFAULT_ATTRIBUTE_NAMESPACE: &str = "system";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeName {
    pub namespace: String,
    pub name: String,
}

impl Model for AttributeTypeName {
    const SCHEMA_NAME: &'static str = ATTRIBUTE_TYPE_NAME;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            namespace: obj.required("namespace")?,
            name: obj.required("name")?,
        })
    }
}

/// An attribute type as written in a payload: canonical or bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeTypeRef {
    Canonical(AttributeTypeName),
    Name(String),
}

impl AttributeTypeRef {
    pub fn namespace(&self) -> &str {
        match self {
            AttributeTypeRef::Canonical(t) => &t.namespace,
            AttributeTypeRef::Name(_) => DEFAULT_ATTRIBUTE_NAMESPACE,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AttributeTypeRef::Canonical(t) => &t.name,
            AttributeTypeRef::Name(name) => name,
        }
    }

    /// The canonical form, filling in the default namespace.
    pub fn to_canonical(&self) -> AttributeTypeName {
        AttributeTypeName {
            namespace: self.namespace().to_string(),
            name: self.name().to_string(),
        }
    }
}

impl FromInstance for AttributeTypeRef {
    fn from_instance(instance: &Instance) -> Result<Self, AccessError> {
        match instance {
            Instance::String(name) => Ok(AttributeTypeRef::Name(name.clone())),
            other => AttributeTypeName::from_instance(other).map(AttributeTypeRef::Canonical),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAttribute {
    pub attribute_type: AttributeTypeRef,
}

impl Model for ColumnAttribute {
    const SCHEMA_NAME: &'static str = COLUMN_ATTRIBUTE;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            attribute_type: obj.required("attribute_type")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAttributeInput {
    pub attribute_type_namespace: Presence<String>,
    pub attribute_type_name: String,
    pub column_name: String,
}

impl ColumnAttributeInput {
    /// The namespace, defaulting when omitted or null.
    pub fn namespace(&self) -> &str {
        self.attribute_type_namespace
            .value()
            .map_or(DEFAULT_ATTRIBUTE_NAMESPACE, String::as_str)
    }
}

impl Model for ColumnAttributeInput {
    const SCHEMA_NAME: &'static str = COLUMN_ATTRIBUTE_INPUT;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            attribute_type_namespace: obj.optional("attribute_type_namespace")?,
            attribute_type_name: obj.required("attribute_type_name")?,
            column_name: obj.required("column_name")?,
        })
    }
}

/// A column on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub r#type: String,
    pub id: Presence<i64>,
    pub dimension_id: Presence<i64>,
    pub dimension_column: Presence<String>,
    pub attributes: Presence<Vec<ColumnAttribute>>,
}

impl Column {
    /// Returns true if the column carries the named attribute.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .value()
            .is_some_and(|attrs| attrs.iter().any(|a| a.attribute_type.name() == name))
    }

    pub fn is_primary_key(&self) -> bool {
        self.has_attribute("primary_key")
    }
}

impl Model for Column {
    const SCHEMA_NAME: &'static str = COLUMN;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            name: obj.required("name")?,
            r#type: obj.required("type")?,
            id: obj.optional("id")?,
            dimension_id: obj.optional("dimension_id")?,
            dimension_column: obj.optional("dimension_column")?,
            attributes: obj.optional("attributes")?,
        })
    }
}

model_from_instance!(AttributeTypeName, ColumnAttribute, ColumnAttributeInput, Column);
