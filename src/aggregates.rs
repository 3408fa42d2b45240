//! Type- and capability-driven aggregate inference.
//!
//! Given an expression and the conceptual schema it refers into, these
//! rules decide which aggregation functions make sense for the underlying
//! field, which one to apply by default, and how to wrap an expression
//! accordingly. Model measures and KPIs arrive pre-aggregated and accept
//! no further aggregation.

use std::sync::Arc;

use crate::ast::{AggregateFn, Expr, ExprRef};
use crate::schema::{ConceptualSchema, DataType, FieldKind, FieldMetadata};

/// Host capability switches affecting aggregate inference.
#[derive(Debug, Clone, Default)]
pub struct AggregatePolicy {
    /// Permit Min/Max over date and datetime fields
    pub datetime_min_max: bool,
}

/// Aggregations valid for the expression's underlying field.
///
/// The expression is de-aggregated first, so querying a `sum(x)` reports
/// the aggregates valid for `x`. The result is empty when the field cannot
/// be resolved in the schema or is a pre-aggregated model measure/KPI.
///
/// Numeric fields support the full set (plus `Median` when the schema
/// declares the capability); date/time fields support `Min`/`Max` when the
/// policy enables it; all other types count. Identity columns omit plain
/// `Count` -- counting duplicate keys is meaningless -- unless the
/// expression already carries a distinct count.
pub fn supported_aggregates(
    expr: &ExprRef,
    schema: &dyn ConceptualSchema,
    policy: &AggregatePolicy,
) -> Vec<AggregateFn> {
    let Some((metadata, existing)) = underlying_field(expr, schema) else {
        return Vec::new();
    };
    if metadata.kind != FieldKind::Column {
        return Vec::new();
    }

    if metadata.data_type.is_numeric() {
        let mut set = vec![
            AggregateFn::Sum,
            AggregateFn::Avg,
            AggregateFn::Min,
            AggregateFn::Max,
            AggregateFn::Count,
            AggregateFn::CountNonNull,
            AggregateFn::StdDev,
            AggregateFn::Variance,
        ];
        if metadata.supports_median {
            set.push(AggregateFn::Median);
        }
        set
    } else if metadata.data_type.is_temporal() {
        if policy.datetime_min_max {
            vec![AggregateFn::Min, AggregateFn::Max]
        } else {
            Vec::new()
        }
    } else if metadata.is_identity && existing != Some(AggregateFn::CountNonNull) {
        vec![AggregateFn::CountNonNull]
    } else {
        vec![AggregateFn::Count, AggregateFn::CountNonNull]
    }
}

/// Membership test on [`supported_aggregates`].
pub fn is_supported_aggregate(
    expr: &ExprRef,
    schema: &dyn ConceptualSchema,
    policy: &AggregatePolicy,
    func: AggregateFn,
) -> bool {
    supported_aggregates(expr, schema, policy).contains(&func)
}

/// Type-appropriate default aggregation: `Sum` for non-identity numeric
/// fields, none for everything else.
pub fn default_aggregate(data_type: DataType, is_identity: bool) -> Option<AggregateFn> {
    if !is_identity && data_type.is_numeric() {
        Some(AggregateFn::Sum)
    } else {
        None
    }
}

/// Wraps the expression's de-aggregated target with `preferred` if that
/// aggregation is supported, else with the type-appropriate default.
///
/// The default is re-checked against the supported set rather than trusted
/// blindly -- a schema provider may flag a numeric field in a way that
/// excludes its nominal default. When no usable aggregation exists the
/// target is returned ungrouped.
pub fn create_expr_with_aggregate(
    expr: &ExprRef,
    schema: &dyn ConceptualSchema,
    policy: &AggregatePolicy,
    preferred: Option<AggregateFn>,
) -> ExprRef {
    let target = Arc::clone(Expr::deaggregated(expr));
    let supported = supported_aggregates(&target, schema, policy);

    if let Some(func) = preferred
        && supported.contains(&func)
    {
        return Expr::aggregate(target, func);
    }

    let default = underlying_field(&target, schema)
        .and_then(|(metadata, _)| default_aggregate(metadata.data_type, metadata.is_identity));
    match default {
        Some(func) if supported.contains(&func) => Expr::aggregate(target, func),
        _ => target,
    }
}

/// Resolves the de-aggregated field an expression refers to, along with
/// the aggregation it already carries, if any.
fn underlying_field<'s>(
    expr: &ExprRef,
    schema: &'s dyn ConceptualSchema,
) -> Option<(&'s FieldMetadata, Option<AggregateFn>)> {
    let target = Expr::deaggregated(expr);
    let existing = match &**expr {
        Expr::Aggregate { func, .. } => Some(*func),
        _ => None,
    };
    let (schema_name, entity) = target.source_entity()?;
    let property = target.property_name()?;
    let metadata = schema.field(schema_name, entity, property)?;
    Some((metadata, existing))
}
