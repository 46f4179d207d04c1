//! # Composite Schema Descriptor
//!
//! Declares the shape of an object: the required-field set, a field-name →
//! [`Schema`] mapping in declaration order, and the policy for fields the
//! declaration does not name.
//!
//! Nullability is a per-field flag. An optional field always accepts an
//! explicit null (recorded as `Presence::Null`); a required field accepts
//! null only if it is declared nullable.

use std::collections::{BTreeSet, HashMap};

use dj_core::{SchemaError, SchemaName};

use crate::schema::Schema;

/// Rule for keys a composite does not declare.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalFields {
    /// Any undeclared key fails validation with `UnexpectedField`.
    Forbidden,
    /// Undeclared keys are coerced through this schema.
    TypedAs(Schema),
    /// Undeclared keys are accepted unchanged.
    Any,
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    name: String,
    schema: Schema,
    required: bool,
    nullable: bool,
    description: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: false,
            nullable: false,
            description: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns true if an explicit null is an acceptable raw value.
    pub fn accepts_null(&self) -> bool {
        !self.required || self.nullable
    }
}

/// The descriptor of an object-shaped schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSchema {
    name: SchemaName,
    description: Option<String>,
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
    required: BTreeSet<String>,
    additional: AdditionalFields,
}

impl CompositeSchema {
    /// Start a declaration. Additional fields default to [`AdditionalFields::Any`].
    pub fn builder(name: &str) -> CompositeBuilder {
        CompositeBuilder {
            name: name.to_string(),
            description: None,
            fields: Vec::new(),
            additional: AdditionalFields::Any,
        }
    }

    pub fn name(&self) -> &SchemaName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Names of fields that must be present in every payload.
    pub fn required_fields(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Schema of a declared field.
    pub fn field_schema(&self, name: &str) -> Option<&Schema> {
        self.field(name).map(FieldDef::schema)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Declaration-order position of a field.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn additional_fields_policy(&self) -> &AdditionalFields {
        &self.additional
    }

    pub(crate) fn collect_references<'a>(&'a self, out: &mut Vec<&'a SchemaName>) {
        for field in &self.fields {
            field.schema.collect_references(out);
        }
        if let AdditionalFields::TypedAs(schema) = &self.additional {
            schema.collect_references(out);
        }
    }
}

/// Declarative builder for [`CompositeSchema`].
#[derive(Debug, Clone)]
pub struct CompositeBuilder {
    name: String,
    description: Option<String>,
    fields: Vec<FieldDef>,
    additional: AdditionalFields,
}

impl CompositeBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a required, non-nullable field.
    pub fn required(self, name: &str, schema: Schema) -> Self {
        self.field(FieldDef::new(name, schema).required(true))
    }

    /// Declare a required field that may carry an explicit null.
    pub fn required_nullable(self, name: &str, schema: Schema) -> Self {
        self.field(FieldDef::new(name, schema).required(true).nullable(true))
    }

    /// Declare an optional field.
    pub fn optional(self, name: &str, schema: Schema) -> Self {
        self.field(FieldDef::new(name, schema))
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn additional_fields(mut self, policy: AdditionalFields) -> Self {
        self.additional = policy;
        self
    }

    pub fn forbid_additional(self) -> Self {
        self.additional_fields(AdditionalFields::Forbidden)
    }

    /// Finish the declaration.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidName` for a malformed schema name, and
    /// `SchemaError::InvalidDeclaration` for an empty or duplicated field name.
    pub fn build(self) -> Result<CompositeSchema, SchemaError> {
        let name = SchemaName::new(self.name)?;
        let mut index = HashMap::with_capacity(self.fields.len());
        let mut required = BTreeSet::new();
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::InvalidDeclaration {
                    schema: name.to_string(),
                    reason: format!("field #{i} has an empty name"),
                });
            }
            if index.insert(field.name.clone(), i).is_some() {
                return Err(SchemaError::InvalidDeclaration {
                    schema: name.to_string(),
                    reason: format!("field '{}' is declared twice", field.name),
                });
            }
            if field.required {
                required.insert(field.name.clone());
            }
        }
        Ok(CompositeSchema {
            name,
            description: self.description,
            fields: self.fields,
            index,
            required,
            additional: self.additional,
        })
    }
}
