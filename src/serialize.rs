//! JSON boundary for the query-serialization collaborator.
//!
//! Normalized query trees leave this core as JSON for the row-producing
//! service; scalar payload values arrive back the same way. Output is
//! deterministic: from-table entries serialize in registration order and
//! every node kind has a single tagged encoding.

use std::fmt;

use serde_json::{Map, Value as Json, json};

use crate::ast::{Expr, QueryDefn};
use crate::from_table::FromSource;
use crate::value::Value;

/// JSON that cannot be represented as a scalar [`Value`].
#[derive(Debug, Clone)]
pub enum ConvertError {
    /// Arrays and general objects have no scalar counterpart
    UnsupportedJson(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::UnsupportedJson(kind) => {
                write!(f, "unsupported JSON shape for a scalar value: {kind}")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Convert a scalar value to JSON. Datetimes encode as
/// `{"datetime": <epoch millis>}` to stay distinguishable from plain
/// integers.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Integer(n) => Json::Number((*n).into()),
        Value::Float(n) => serde_json::Number::from_f64(*n)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::DateTime(ms) => json!({ "datetime": ms }),
    }
}

/// Convert JSON back to a scalar value. Arrays and objects other than the
/// datetime envelope are rejected.
pub fn value_from_json(json: &Json) -> Result<Value, ConvertError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Boolean(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(ConvertError::UnsupportedJson("number".to_string()))
            }
        }
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Object(map) => {
            if map.len() == 1
                && let Some(ms) = map.get("datetime").and_then(Json::as_i64)
            {
                return Ok(Value::DateTime(ms));
            }
            Err(ConvertError::UnsupportedJson("object".to_string()))
        }
        Json::Array(_) => Err(ConvertError::UnsupportedJson("array".to_string())),
    }
}

/// Tagged-object encoding of an expression tree.
pub fn expr_to_json(expr: &Expr) -> Json {
    match expr {
        Expr::Entity {
            schema,
            entity,
            variable,
        } => {
            let mut body = Map::new();
            body.insert("schema".to_string(), Json::String(schema.clone()));
            body.insert("entity".to_string(), Json::String(entity.clone()));
            if let Some(variable) = variable {
                body.insert("variable".to_string(), Json::String(variable.clone()));
            }
            json!({ "entity": body })
        }
        Expr::Column { source, name } => json!({
            "column": { "source": expr_to_json(source), "name": name }
        }),
        Expr::HierarchyLevel {
            source,
            hierarchy,
            level,
        } => json!({
            "hierarchyLevel": {
                "source": expr_to_json(source),
                "hierarchy": hierarchy,
                "level": level,
            }
        }),
        Expr::Constant(value) => json!({ "constant": value_to_json(value) }),
        Expr::Compare { op, left, right } => json!({
            "compare": {
                "op": op.name(),
                "left": expr_to_json(left),
                "right": expr_to_json(right),
            }
        }),
        Expr::And(left, right) => json!({
            "and": { "left": expr_to_json(left), "right": expr_to_json(right) }
        }),
        Expr::Or(left, right) => json!({
            "or": { "left": expr_to_json(left), "right": expr_to_json(right) }
        }),
        Expr::Not(arg) => json!({ "not": expr_to_json(arg) }),
        Expr::Aggregate { arg, func } => json!({
            "aggregate": { "function": func.name(), "arg": expr_to_json(arg) }
        }),
        Expr::In { args, values } => {
            let args: Vec<Json> = args.iter().map(|a| expr_to_json(a)).collect();
            let values: Vec<Json> = values
                .iter()
                .map(|tuple| Json::Array(tuple.iter().map(|v| expr_to_json(v)).collect()))
                .collect();
            json!({ "in": { "args": args, "values": values } })
        }
    }
}

/// Envelope encoding of a complete query definition.
pub fn query_to_json(query: &QueryDefn) -> Json {
    let from: Vec<Json> = query
        .from
        .entries()
        .map(|(alias, source)| match source {
            FromSource::Entity { schema, entity } => json!({
                "alias": alias,
                "entity": { "schema": schema, "entity": entity },
            }),
            FromSource::Subquery(sub) => json!({
                "alias": alias,
                "query": query_to_json(sub),
            }),
        })
        .collect();
    let select: Vec<Json> = query
        .select
        .iter()
        .map(|item| json!({ "name": item.name, "expr": expr_to_json(&item.expr) }))
        .collect();
    let where_clauses: Vec<Json> = query
        .where_clauses
        .iter()
        .map(|condition| expr_to_json(condition))
        .collect();
    let order_by: Vec<Json> = query
        .order_by
        .iter()
        .map(|item| json!({
            "expr": expr_to_json(&item.expr),
            "direction": item.direction.name(),
        }))
        .collect();
    json!({
        "from": from,
        "select": select,
        "where": where_clauses,
        "orderBy": order_by,
    })
}
