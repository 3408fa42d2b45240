// tests/aggregate_tests.rs

use trellis::aggregates::{
    AggregatePolicy, create_expr_with_aggregate, default_aggregate, is_supported_aggregate,
    supported_aggregates,
};
use trellis::ast::{AggregateFn, Expr, ExprRef};
use trellis::schema::{DataType, FieldMetadata, MapSchema};

use std::sync::Arc;

fn schema() -> MapSchema {
    let mut schema = MapSchema::new();
    schema.insert("s", "Sales", "amount", FieldMetadata::column(DataType::Double));
    schema.insert(
        "s",
        "Sales",
        "quantity",
        FieldMetadata::column(DataType::Integer).with_median(),
    );
    schema.insert("s", "Sales", "region", FieldMetadata::column(DataType::Text));
    schema.insert(
        "s",
        "Sales",
        "order_id",
        FieldMetadata::column(DataType::Text).with_identity(),
    );
    schema.insert(
        "s",
        "Sales",
        "customer_key",
        FieldMetadata::column(DataType::Integer).with_identity(),
    );
    schema.insert("s", "Sales", "ordered_at", FieldMetadata::column(DataType::DateTime));
    schema.insert("s", "Sales", "profit", FieldMetadata::measure(DataType::Double));
    schema
}

fn col(name: &str) -> ExprRef {
    Expr::column(Expr::entity("s", "Sales"), name)
}

const NUMERIC_SET: [AggregateFn; 8] = [
    AggregateFn::Sum,
    AggregateFn::Avg,
    AggregateFn::Min,
    AggregateFn::Max,
    AggregateFn::Count,
    AggregateFn::CountNonNull,
    AggregateFn::StdDev,
    AggregateFn::Variance,
];

// ============================================================================
// Supported aggregates
// ============================================================================

#[test]
fn test_numeric_field_supports_full_set() {
    let supported = supported_aggregates(&col("amount"), &schema(), &AggregatePolicy::default());
    assert_eq!(supported, NUMERIC_SET.to_vec());
}

#[test]
fn test_median_requires_capability() {
    let schema = schema();
    let policy = AggregatePolicy::default();
    assert!(!supported_aggregates(&col("amount"), &schema, &policy)
        .contains(&AggregateFn::Median));
    assert!(supported_aggregates(&col("quantity"), &schema, &policy)
        .contains(&AggregateFn::Median));
}

#[test]
fn test_text_field_counts_only() {
    let supported = supported_aggregates(&col("region"), &schema(), &AggregatePolicy::default());
    assert_eq!(supported, vec![AggregateFn::Count, AggregateFn::CountNonNull]);
}

#[test]
fn test_identity_text_field_omits_count() {
    let supported = supported_aggregates(&col("order_id"), &schema(), &AggregatePolicy::default());
    assert_eq!(supported, vec![AggregateFn::CountNonNull]);
}

#[test]
fn test_identity_with_existing_distinct_count_keeps_count() {
    let expr = Expr::aggregate(col("order_id"), AggregateFn::CountNonNull);
    let supported = supported_aggregates(&expr, &schema(), &AggregatePolicy::default());
    assert_eq!(supported, vec![AggregateFn::Count, AggregateFn::CountNonNull]);
}

#[test]
fn test_datetime_min_max_behind_policy() {
    let schema = schema();
    let off = supported_aggregates(&col("ordered_at"), &schema, &AggregatePolicy::default());
    assert!(off.is_empty());

    let policy = AggregatePolicy {
        datetime_min_max: true,
    };
    let on = supported_aggregates(&col("ordered_at"), &schema, &policy);
    assert_eq!(on, vec![AggregateFn::Min, AggregateFn::Max]);
}

#[test]
fn test_model_measure_accepts_no_aggregation() {
    let supported = supported_aggregates(&col("profit"), &schema(), &AggregatePolicy::default());
    assert!(supported.is_empty());
}

#[test]
fn test_unresolvable_field_is_empty() {
    let supported = supported_aggregates(&col("missing"), &schema(), &AggregatePolicy::default());
    assert!(supported.is_empty());

    let constant = Expr::constant(trellis::Value::Integer(1));
    assert!(supported_aggregates(&constant, &schema(), &AggregatePolicy::default()).is_empty());
}

#[test]
fn test_aggregated_expr_reports_underlying_field() {
    // Supported aggregates of sum(amount) are those of amount.
    let expr = Expr::aggregate(col("amount"), AggregateFn::Sum);
    let supported = supported_aggregates(&expr, &schema(), &AggregatePolicy::default());
    assert_eq!(supported, NUMERIC_SET.to_vec());
}

#[test]
fn test_is_supported_aggregate_is_membership() {
    let schema = schema();
    let policy = AggregatePolicy::default();
    assert!(is_supported_aggregate(&col("amount"), &schema, &policy, AggregateFn::Avg));
    assert!(!is_supported_aggregate(&col("amount"), &schema, &policy, AggregateFn::Median));
    assert!(!is_supported_aggregate(&col("region"), &schema, &policy, AggregateFn::Sum));
}

// ============================================================================
// Defaults and wrapping
// ============================================================================

#[test]
fn test_default_aggregate_rules() {
    assert_eq!(default_aggregate(DataType::Double, false), Some(AggregateFn::Sum));
    assert_eq!(default_aggregate(DataType::Integer, true), None);
    assert_eq!(default_aggregate(DataType::Text, false), None);
    assert_eq!(default_aggregate(DataType::DateTime, false), None);
}

#[test]
fn test_preferred_aggregate_applies_when_supported() {
    let expr = col("amount");
    let wrapped = create_expr_with_aggregate(
        &expr,
        &schema(),
        &AggregatePolicy::default(),
        Some(AggregateFn::Avg),
    );
    let Expr::Aggregate { arg, func } = &*wrapped else {
        panic!("expected an aggregate wrapper");
    };
    assert_eq!(*func, AggregateFn::Avg);
    assert!(Arc::ptr_eq(arg, &expr));
}

#[test]
fn test_unsupported_preference_falls_back_to_default() {
    let wrapped = create_expr_with_aggregate(
        &col("amount"),
        &schema(),
        &AggregatePolicy::default(),
        Some(AggregateFn::Median),
    );
    let Expr::Aggregate { func, .. } = &*wrapped else {
        panic!("expected an aggregate wrapper");
    };
    assert_eq!(*func, AggregateFn::Sum);
}

#[test]
fn test_no_default_leaves_expr_ungrouped() {
    let expr = col("region");
    let result = create_expr_with_aggregate(&expr, &schema(), &AggregatePolicy::default(), None);
    assert!(Arc::ptr_eq(&result, &expr));
}

#[test]
fn test_identity_numeric_default_is_not_sum() {
    // Sum over a key column is meaningless; with no usable default the
    // expression stays ungrouped.
    let expr = col("customer_key");
    let result = create_expr_with_aggregate(&expr, &schema(), &AggregatePolicy::default(), None);
    assert!(Arc::ptr_eq(&result, &expr));
}

#[test]
fn test_rewrapping_replaces_existing_aggregate() {
    let existing = Expr::aggregate(col("amount"), AggregateFn::Sum);
    let rewrapped = create_expr_with_aggregate(
        &existing,
        &schema(),
        &AggregatePolicy::default(),
        Some(AggregateFn::Max),
    );
    let Expr::Aggregate { arg, func } = &*rewrapped else {
        panic!("expected an aggregate wrapper");
    };
    assert_eq!(*func, AggregateFn::Max);
    assert!(matches!(&**arg, Expr::Column { .. }));
}
