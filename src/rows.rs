//! Materialized row payloads.
//!
//! Row data returned by the query-executing collaborator, already
//! positionally aligned to the select list. Payloads are never mutated
//! after creation; eval contexts only read them.

use crate::value::Value;

/// One role-tagged column of a categorical payload.
///
/// `values` is addressed by row index. `min`/`max` are optional
/// pre-aggregated column summaries supplied by the provider, used by
/// static contexts and gradient ranges without touching per-row data.
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    pub name: String,
    pub roles: Vec<String>,
    /// Position of the select item this column materializes
    pub select_index: usize,
    pub values: Vec<Value>,
    pub min: Option<Value>,
    pub max: Option<Value>,
}

impl DataColumn {
    pub fn new(name: impl Into<String>, select_index: usize) -> Self {
        DataColumn {
            name: name.into(),
            roles: Vec::new(),
            select_index,
            values: Vec::new(),
            min: None,
            max: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_values(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    pub fn with_summary(mut self, min: Value, max: Value) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Column-oriented result shape split into category and value columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoricalPayload {
    pub categories: Vec<DataColumn>,
    pub values: Vec<DataColumn>,
}

impl CategoricalPayload {
    pub fn empty() -> Self {
        CategoricalPayload::default()
    }

    /// Row count of the payload: the length of the first non-empty
    /// column. Zero for an empty payload.
    pub fn row_count(&self) -> usize {
        self.categories
            .iter()
            .chain(&self.values)
            .map(|c| c.values.len())
            .find(|&len| len > 0)
            .unwrap_or(0)
    }
}

/// Descriptor of one table-shape column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub roles: Vec<String>,
    /// Position of the select item this column materializes
    pub select_index: usize,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, select_index: usize) -> Self {
        TableColumn {
            name: name.into(),
            roles: Vec::new(),
            select_index,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Row-major result shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePayload {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl TablePayload {
    pub fn new(columns: Vec<TableColumn>, rows: Vec<Vec<Value>>) -> Self {
        TablePayload { columns, rows }
    }
}
