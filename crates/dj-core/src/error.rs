//! # Error Types: Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Validation failures are local and never process-fatal. Each one carries
//!   a root-relative [`FieldPath`] and a closed [`ValidationErrorKind`] with
//!   the expected vs actual shape.
//! - Accessor failures (`PresenceError`) are distinct from validation
//!   failures: the instance is valid, the caller asked for a value that is
//!   not there.
//! - Declaration failures (`SchemaError`) happen when schemas are built or
//!   loaded, before any payload is seen.

use thiserror::Error;

use crate::path::{FieldPath, PathSegment};

/// Failure of an operation that both loads and validates, such as
/// validating a payload document read from disk.
#[derive(Error, Debug)]
pub enum DjError {
    /// A payload did not conform to its schema.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A schema declaration is invalid or could not be loaded.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// What went wrong at the failing location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A composite schema was applied to a non-mapping value.
    #[error("expected an object, got {actual}")]
    NotAnObject {
        /// Shape of the value that was found.
        actual: String,
    },

    /// A required field was absent.
    #[error("missing required field '{field}'")]
    MissingRequiredField {
        /// Name of the absent field.
        field: String,
    },

    /// An undeclared field was present under a `Forbidden` additional-fields policy.
    #[error("unexpected field '{field}'")]
    UnexpectedField {
        /// Name of the undeclared field.
        field: String,
    },

    /// The value's shape does not fit the declared type.
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        /// Declared type name.
        expected: String,
        /// Shape of the value that was found.
        actual: String,
    },

    /// No union candidate accepted the raw shape.
    #[error("no alternative accepts {actual}; candidates: {}", .candidates.join(" | "))]
    NoMatchingAlternative {
        /// Candidate type names, in declaration order.
        candidates: Vec<String>,
        /// Shape of the value that was found.
        actual: String,
    },

    /// A declared pattern, length, range, or enumeration constraint failed.
    #[error("{constraint} constraint violated: {detail}")]
    ConstraintViolation {
        /// Constraint name (e.g. `max_length`, `pattern`).
        constraint: String,
        /// What the constraint required and what was found.
        detail: String,
    },

    /// A schema reference names a schema the registry does not hold.
    #[error("schema '{name}' is not registered")]
    UnresolvedReference {
        /// The referenced schema name.
        name: String,
    },

    /// The payload nests deeper than the validator allows.
    #[error("nesting exceeds the limit of {limit}")]
    DepthExceeded {
        /// Configured depth limit.
        limit: usize,
    },
}

/// A validation failure at a root-relative location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    /// Where the failure occurred.
    pub path: FieldPath,
    /// What the failure was.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// A failure at the current (innermost) location.
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self {
            path: FieldPath::root(),
            kind,
        }
    }

    /// A failure at an explicit location.
    pub fn at(path: FieldPath, kind: ValidationErrorKind) -> Self {
        Self { path, kind }
    }

    /// Wrap the failure with the enclosing segment as it propagates outward.
    pub fn within(mut self, segment: PathSegment) -> Self {
        self.path.push_front(segment);
        self
    }

    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    pub fn constraint(constraint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::ConstraintViolation {
            constraint: constraint.into(),
            detail: detail.into(),
        })
    }

    /// Returns the failure location.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns the failure kind.
    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}

/// A total accessor was used on a field that carries no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresenceError {
    /// The field was omitted.
    #[error("{} is unset", .field.as_deref().unwrap_or("value"))]
    Unset {
        /// Field name, when known.
        field: Option<String>,
    },

    /// The field was an explicit null.
    #[error("{} is null", .field.as_deref().unwrap_or("value"))]
    Null {
        /// Field name, when known.
        field: Option<String>,
    },

    /// The name is neither declared nor an accepted additional field.
    #[error("no field named '{field}'")]
    Undeclared {
        /// The requested name.
        field: String,
    },
}

impl PresenceError {
    /// Attach the field name the failing lookup was made under.
    pub fn for_field(self, name: impl Into<String>) -> Self {
        match self {
            PresenceError::Unset { .. } => PresenceError::Unset {
                field: Some(name.into()),
            },
            PresenceError::Null { .. } => PresenceError::Null {
                field: Some(name.into()),
            },
            other => other,
        }
    }
}

/// A schema declaration could not be accepted.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Registry names are unique and registered schemas are never replaced.
    #[error("schema '{0}' is already registered")]
    DuplicateSchema(String),

    /// The name is not a valid schema name.
    #[error("invalid schema name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The declaration is internally inconsistent.
    #[error("invalid declaration for '{schema}': {reason}")]
    InvalidDeclaration {
        /// Schema being declared.
        schema: String,
        /// What is inconsistent.
        reason: String,
    },

    /// A lookup named a schema that is not registered.
    #[error("schema '{0}' is not registered")]
    UnknownSchema(String),

    /// A declaration or payload document could not be read or parsed.
    #[error("cannot load '{source_name}': {reason}")]
    Load {
        /// File path or other source identifier.
        source_name: String,
        /// Reason the source could not be loaded.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_prepends_segments() {
        let err = ValidationError::type_mismatch("integer", "string")
            .within(PathSegment::Field("id".into()))
            .within(PathSegment::Index(4))
            .within(PathSegment::Field("columns".into()));
        assert_eq!(err.path().to_string(), "columns[4].id");
        assert_eq!(err.to_string(), "columns[4].id: expected integer, got string");
    }

    #[test]
    fn test_root_error_display() {
        let err = ValidationError::new(ValidationErrorKind::NotAnObject {
            actual: "array".into(),
        });
        assert_eq!(err.to_string(), "(root): expected an object, got array");
    }

    #[test]
    fn test_no_matching_alternative_lists_candidates() {
        let kind = ValidationErrorKind::NoMatchingAlternative {
            candidates: vec!["integer".into(), "string".into()],
            actual: "boolean".into(),
        };
        let display = kind.to_string();
        assert!(display.contains("integer | string"));
        assert!(display.contains("boolean"));
    }

    #[test]
    fn test_presence_error_names_field() {
        let err = PresenceError::Unset { field: None }.for_field("dimension_id");
        assert_eq!(err.to_string(), "dimension_id is unset");
        assert_eq!(PresenceError::Null { field: None }.to_string(), "value is null");
    }

    #[test]
    fn test_dj_error_from_validation() {
        let err: DjError = ValidationError::constraint("max_length", "at most 3").into();
        assert!(matches!(err, DjError::Validation(_)));
        assert!(err.to_string().contains("max_length"));
    }
}
