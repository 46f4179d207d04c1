//! # Field Paths
//!
//! A `FieldPath` names the location of a value inside a payload, relative to
//! the root instance being validated. It renders as a dotted/indexed string:
//!
//! ```text
//! columns[2].attributes[0].attribute_type.name
//! ```
//!
//! Paths are built inside-out. The innermost validation reports an empty path
//! and each enclosing container or composite prepends its own segment while
//! the error propagates upward.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    /// A declared or additional field of a composite.
    Field(String),
    /// A position in a list.
    Index(usize),
    /// A key in a dict.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) | PathSegment::Key(name) => f.write_str(name),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Root-relative location of a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath(VecDeque<PathSegment>);

impl FieldPath {
    /// The path of the root instance itself.
    pub fn root() -> Self {
        Self(VecDeque::new())
    }

    /// Returns true if this path designates the root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prepend an outer segment.
    pub fn push_front(&mut self, segment: PathSegment) {
        self.0.push_front(segment);
    }

    /// Append an inner segment.
    pub fn push_back(&mut self, segment: PathSegment) {
        self.0.push_back(segment);
    }

    /// Iterate the segments from the root outward.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }

    /// The innermost segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.back()
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments.into())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(_) => write!(f, "{segment}")?,
                _ if i == 0 => write!(f, "{segment}")?,
                _ => write!(f, ".{segment}")?,
            }
        }
        Ok(())
    }
}
