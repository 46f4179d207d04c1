//! # Model Declarations
//!
//! Schemas for the DataJunction API payloads. Declarations are ordered for
//! readability, not for resolution: `Catalog` references `Engine` before it
//! is registered and `NodeNamespace` references itself.

use std::sync::OnceLock;

use dj_core::{SchemaError, SchemaName};
use dj_schema::{CompositeSchema, PrimitiveKind, PrimitiveSchema, Schema, SchemaRegistry};

pub const ATTRIBUTE_TYPE_NAME: &str = "AttributeTypeName";
pub const COLUMN_ATTRIBUTE: &str = "ColumnAttribute";
pub const COLUMN_ATTRIBUTE_INPUT: &str = "ColumnAttributeInput";
pub const COLUMN: &str = "Column";
pub const SOURCE_COLUMN: &str = "SourceColumn";
pub const CATALOG: &str = "Catalog";
pub const ENGINE: &str = "Engine";
pub const DIALECT: &str = "Dialect";
pub const NODE_MODE: &str = "NodeMode";
pub const NODE_NAMESPACE: &str = "NodeNamespace";
pub const SOURCE_NODE_INPUT: &str = "SourceNodeInput";
pub const METRIC_INPUT: &str = "MetricInput";
pub const CUBE_INPUT: &str = "CubeInput";

/// Dotted node names: `default.repair_orders`, `system.primary_key`.
const NODE_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$";

fn named(name: &str) -> Result<Schema, SchemaError> {
    Schema::named(name)
}

fn node_name() -> Result<Schema, SchemaError> {
    Ok(PrimitiveSchema::new(PrimitiveKind::String)
        .min_length(1)
        .pattern(NODE_NAME_PATTERN)?
        .into())
}

fn non_empty_string() -> Schema {
    PrimitiveSchema::new(PrimitiveKind::String).min_length(1).into()
}

fn attribute_type_name() -> Result<CompositeSchema, SchemaError> {
    CompositeSchema::builder(ATTRIBUTE_TYPE_NAME)
        .description("Namespaced name of a column attribute type.")
        .required("namespace", non_empty_string())
        .required("name", non_empty_string())
        .forbid_additional()
        .build()
}

fn column_attribute() -> Result<CompositeSchema, SchemaError> {
    // Either the canonical `{namespace, name}` form or a bare attribute name.
    CompositeSchema::builder(COLUMN_ATTRIBUTE)
        .description("An attribute set on a column.")
        .required(
            "attribute_type",
            Schema::union(vec![named(ATTRIBUTE_TYPE_NAME)?, non_empty_string()]),
        )
        .forbid_additional()
        .build()
}

fn column_attribute_input() -> Result<CompositeSchema, SchemaError> {
    CompositeSchema::builder(COLUMN_ATTRIBUTE_INPUT)
        .description("Request to set an attribute on a node column.")
        .optional("attribute_type_namespace", non_empty_string())
        .required("attribute_type_name", non_empty_string())
        .required("column_name", non_empty_string())
        .forbid_additional()
        .build()
}

fn column() -> Result<CompositeSchema, SchemaError> {
    CompositeSchema::builder(COLUMN)
        .description("A column on a node.")
        .required("name", Schema::string())
        .required("type", Schema::string())
        .optional("id", Schema::integer())
        .optional("dimension_id", Schema::integer())
        .optional("dimension_column", Schema::string())
        .optional("attributes", Schema::list(named(COLUMN_ATTRIBUTE)?))
        .forbid_additional()
        .build()
}

fn source_column() -> Result<CompositeSchema, SchemaError> {
    CompositeSchema::builder(SOURCE_COLUMN)
        .description("A column declared when registering a source node.")
        .required("name", non_empty_string())
        .required("type", non_empty_string())
        .optional("dimension", node_name()?)
        .optional("attributes", Schema::list(named(COLUMN_ATTRIBUTE)?))
        .forbid_additional()
        .build()
}

fn catalog() -> Result<CompositeSchema, SchemaError> {
    CompositeSchema::builder(CATALOG)
        .description("A physical catalog and the engines that can query it.")
        .required("name", non_empty_string())
        .optional("engines", Schema::list(named(ENGINE)?))
        .build()
}

fn dialect() -> Schema {
    PrimitiveSchema::new(PrimitiveKind::String)
        .one_of(["spark", "trino", "druid", "postgres"])
        .into()
}

fn engine() -> Result<CompositeSchema, SchemaError> {
    // Versions arrive as text ("3.1.1") or as a bare number (26).
    CompositeSchema::builder(ENGINE)
        .description("A query engine.")
        .required("name", non_empty_string())
        .required("version", Schema::union(vec![Schema::string(), Schema::integer()]))
        .optional("uri", Schema::string())
        .optional("dialect", named(DIALECT)?)
        .build()
}

fn node_mode() -> Schema {
    PrimitiveSchema::new(PrimitiveKind::String)
        .one_of(["published", "draft"])
        .into()
}

fn node_namespace() -> Result<CompositeSchema, SchemaError> {
    CompositeSchema::builder(NODE_NAMESPACE)
        .description("A node namespace and its child namespaces.")
        .required("namespace", node_name()?)
        .optional("children", Schema::list(named(NODE_NAMESPACE)?))
        .build()
}

fn source_node_input() -> Result<CompositeSchema, SchemaError> {
    CompositeSchema::builder(SOURCE_NODE_INPUT)
        .description("Request to create a source node over a physical table.")
        .required("name", node_name()?)
        .required("catalog", non_empty_string())
        .required("schema_", non_empty_string())
        .required("table", non_empty_string())
        .required(
            "columns",
            Schema::list_bounded(named(SOURCE_COLUMN)?, Some(1), None),
        )
        .optional("display_name", Schema::string())
        .optional("description", Schema::string())
        .optional("mode", named(NODE_MODE)?)
        .optional("primary_key", Schema::list(non_empty_string()))
        .forbid_additional()
        .build()
}

fn metric_input() -> Result<CompositeSchema, SchemaError> {
    CompositeSchema::builder(METRIC_INPUT)
        .description("Request to create a metric node.")
        .required("name", node_name()?)
        .required("query", non_empty_string())
        .optional("display_name", Schema::string())
        .optional("description", Schema::string())
        .optional("mode", named(NODE_MODE)?)
        .optional("required_dimensions", Schema::list(Schema::string()))
        .forbid_additional()
        .build()
}

fn cube_input() -> Result<CompositeSchema, SchemaError> {
    let limit = PrimitiveSchema::new(PrimitiveKind::Integer).minimum(0);
    CompositeSchema::builder(CUBE_INPUT)
        .description("Request to create a cube over metrics and dimensions.")
        .required("name", node_name()?)
        .required("metrics", Schema::list_bounded(node_name()?, Some(1), None))
        .required("dimensions", Schema::list(node_name()?))
        .optional("description", Schema::string())
        .optional("mode", named(NODE_MODE)?)
        .optional("filters", Schema::list(Schema::string()))
        .optional("orderby", Schema::list(Schema::string()))
        .optional("limit", limit.into())
        .forbid_additional()
        .build()
}

/// Build a registry holding every model declaration.
///
/// # Errors
///
/// Returns a `SchemaError` if a declaration is malformed.
pub fn build_registry() -> Result<SchemaRegistry, SchemaError> {
    let mut registry = SchemaRegistry::new();
    registry.register_composite(attribute_type_name()?)?;
    registry.register_composite(column_attribute()?)?;
    registry.register_composite(column_attribute_input()?)?;
    registry.register_composite(column()?)?;
    registry.register_composite(source_column()?)?;
    registry.register_composite(catalog()?)?;
    registry.register_composite(engine()?)?;
    registry.register(SchemaName::new(DIALECT)?, dialect())?;
    registry.register(SchemaName::new(NODE_MODE)?, node_mode())?;
    registry.register_composite(node_namespace()?)?;
    registry.register_composite(source_node_input()?)?;
    registry.register_composite(metric_input()?)?;
    registry.register_composite(cube_input()?)?;
    tracing::debug!(schemas = registry.len(), "built model registry");
    Ok(registry)
}

static SHARED: OnceLock<SchemaRegistry> = OnceLock::new();

/// The process-wide model registry, built on first use.
///
/// # Errors
///
/// Returns a `SchemaError` if a declaration is malformed.
pub fn shared_registry() -> Result<&'static SchemaRegistry, SchemaError> {
    if let Some(registry) = SHARED.get() {
        return Ok(registry);
    }
    let built = build_registry()?;
    Ok(SHARED.get_or_init(|| built))
}
