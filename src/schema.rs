//! Conceptual schema interface.
//!
//! Type and capability metadata for entities and their properties,
//! consumed read-only. The schema is always passed in explicitly -- this
//! core holds no ambient registry, which keeps aggregation inference
//! side-effect-free and independently testable.

use std::collections::HashMap;
use std::fmt;

/// Data type of a schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer
    Integer,
    /// Fixed-point decimal
    Decimal,
    /// 64-bit floating point
    Double,
    /// Variable-length string
    Text,
    /// Boolean
    Boolean,
    /// Calendar date
    Date,
    /// Date with time of day
    DateTime,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Decimal | DataType::Double)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::DateTime)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "integer",
            DataType::Decimal => "decimal",
            DataType::Double => "double",
            DataType::Text => "text",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// Kind of a schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain column, aggregatable by the engine
    Column,
    /// Model measure, pre-aggregated by the model
    Measure,
    /// Key performance indicator, pre-aggregated by the model
    Kpi,
}

/// Metadata of one entity property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
    pub data_type: DataType,
    pub kind: FieldKind,
    /// Identity/key column flag
    pub is_identity: bool,
    /// Capability flag: the provider can compute a median for this field
    pub supports_median: bool,
}

impl FieldMetadata {
    /// Plain column of the given type.
    pub fn column(data_type: DataType) -> Self {
        FieldMetadata {
            data_type,
            kind: FieldKind::Column,
            is_identity: false,
            supports_median: false,
        }
    }

    /// Pre-aggregated model measure of the given type.
    pub fn measure(data_type: DataType) -> Self {
        FieldMetadata {
            kind: FieldKind::Measure,
            ..FieldMetadata::column(data_type)
        }
    }

    pub fn with_identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn with_median(mut self) -> Self {
        self.supports_median = true;
        self
    }
}

/// Read-only type/capability lookup, queried by entity and property name.
pub trait ConceptualSchema {
    fn field(&self, schema: &str, entity: &str, property: &str) -> Option<&FieldMetadata>;
}

/// In-memory schema for hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MapSchema {
    fields: HashMap<(String, String, String), FieldMetadata>,
}

impl MapSchema {
    pub fn new() -> Self {
        MapSchema::default()
    }

    pub fn insert(
        &mut self,
        schema: impl Into<String>,
        entity: impl Into<String>,
        property: impl Into<String>,
        metadata: FieldMetadata,
    ) {
        self.fields
            .insert((schema.into(), entity.into(), property.into()), metadata);
    }
}

impl ConceptualSchema for MapSchema {
    fn field(&self, schema: &str, entity: &str, property: &str) -> Option<&FieldMetadata> {
        self.fields
            .get(&(schema.to_string(), entity.to_string(), property.to_string()))
    }
}
