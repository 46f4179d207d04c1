//! Node namespaces and node-creation requests.

use std::fmt;

use dj_core::Presence;
use dj_schema::{AccessError, FromInstance, Instance, ObjectInstance};

use crate::column::ColumnAttribute;
use crate::declarations::{CUBE_INPUT, METRIC_INPUT, NODE_NAMESPACE, SOURCE_COLUMN, SOURCE_NODE_INPUT};
use crate::{model_from_instance, Model};

/// Whether a node revision is live or a draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeMode {
    #[default]
    Published,
    Draft,
}

impl NodeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeMode::Published => "published",
            NodeMode::Draft => "draft",
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromInstance for NodeMode {
    fn from_instance(instance: &Instance) -> Result<Self, AccessError> {
        match instance.as_str() {
            Some("published") => Ok(NodeMode::Published),
            Some("draft") => Ok(NodeMode::Draft),
            _ => Err(AccessError::WrongKind {
                field: String::new(),
                expected: "node mode",
                found: instance.kind_name(),
            }),
        }
    }
}

/// A namespace and its nested namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeNamespace {
    pub namespace: String,
    pub children: Presence<Vec<NodeNamespace>>,
}

impl NodeNamespace {
    /// Every namespace in the tree, depth first, this one included.
    pub fn flatten(&self) -> Vec<&str> {
        let mut out = vec![self.namespace.as_str()];
        if let Some(children) = self.children.value() {
            for child in children {
                out.extend(child.flatten());
            }
        }
        out
    }
}

impl Model for NodeNamespace {
    const SCHEMA_NAME: &'static str = NODE_NAMESPACE;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            namespace: obj.required("namespace")?,
            children: obj.optional("children")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    pub r#type: String,
    pub dimension: Presence<String>,
    pub attributes: Presence<Vec<ColumnAttribute>>,
}

impl Model for SourceColumn {
    const SCHEMA_NAME: &'static str = SOURCE_COLUMN;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            name: obj.required("name")?,
            r#type: obj.required("type")?,
            dimension: obj.optional("dimension")?,
            attributes: obj.optional("attributes")?,
        })
    }
}

/// Request body for creating a source node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNodeInput {
    pub name: String,
    pub catalog: String,
    pub schema_: String,
    pub table: String,
    pub columns: Vec<SourceColumn>,
    pub display_name: Presence<String>,
    pub description: Presence<String>,
    pub mode: Presence<NodeMode>,
    pub primary_key: Presence<Vec<String>>,
}

impl SourceNodeInput {
    /// Namespace part of the node name (`default` for `default.repair_orders`).
    pub fn namespace(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(ns, _)| ns)
    }

    /// Primary-key columns that are not among the declared columns.
    pub fn unknown_primary_key_columns(&self) -> Vec<&str> {
        self.primary_key
            .value()
            .map(|keys| {
                keys.iter()
                    .map(String::as_str)
                    .filter(|k| !self.columns.iter().any(|c| c.name == *k))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Model for SourceNodeInput {
    const SCHEMA_NAME: &'static str = SOURCE_NODE_INPUT;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            name: obj.required("name")?,
            catalog: obj.required("catalog")?,
            schema_: obj.required("schema_")?,
            table: obj.required("table")?,
            columns: obj.required("columns")?,
            display_name: obj.optional("display_name")?,
            description: obj.optional("description")?,
            mode: obj.optional("mode")?,
            primary_key: obj.optional("primary_key")?,
        })
    }
}

/// Request body for creating a metric node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricInput {
    pub name: String,
    pub query: String,
    pub display_name: Presence<String>,
    pub description: Presence<String>,
    pub mode: Presence<NodeMode>,
    pub required_dimensions: Presence<Vec<String>>,
}

impl MetricInput {
    /// The mode, defaulting to published when omitted or null.
    pub fn mode(&self) -> NodeMode {
        self.mode.value().copied().unwrap_or_default()
    }
}

impl Model for MetricInput {
    const SCHEMA_NAME: &'static str = METRIC_INPUT;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            name: obj.required("name")?,
            query: obj.required("query")?,
            display_name: obj.optional("display_name")?,
            description: obj.optional("description")?,
            mode: obj.optional("mode")?,
            required_dimensions: obj.optional("required_dimensions")?,
        })
    }
}

/// Request body for creating a cube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeInput {
    pub name: String,
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub description: Presence<String>,
    pub mode: Presence<NodeMode>,
    pub filters: Presence<Vec<String>>,
    pub orderby: Presence<Vec<String>>,
    pub limit: Presence<i64>,
}

impl Model for CubeInput {
    const SCHEMA_NAME: &'static str = CUBE_INPUT;

    fn from_object(obj: &ObjectInstance) -> Result<Self, AccessError> {
        Ok(Self {
            name: obj.required("name")?,
            metrics: obj.required("metrics")?,
            dimensions: obj.required("dimensions")?,
            description: obj.optional("description")?,
            mode: obj.optional("mode")?,
            filters: obj.optional("filters")?,
            orderby: obj.optional("orderby")?,
            limit: obj.optional("limit")?,
        })
    }
}

model_from_instance!(NodeNamespace, SourceColumn, SourceNodeInput, MetricInput, CubeInput);
