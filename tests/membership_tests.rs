// tests/membership_tests.rs

use trellis::ast::{CompareOp, Expr, ExprRef};
use trellis::rewrite::fold_equality_to_in;
use trellis::value::Value;

use std::sync::Arc;

// Helper functions to build AST for testing

fn sales() -> ExprRef {
    Expr::entity("s", "Sales")
}

fn col(name: &str) -> ExprRef {
    Expr::column(sales(), name)
}

fn int(n: i64) -> ExprRef {
    Expr::constant(Value::Integer(n))
}

fn eq(left: ExprRef, right: ExprRef) -> ExprRef {
    Expr::equal(left, right)
}

fn or(left: ExprRef, right: ExprRef) -> ExprRef {
    Expr::or(left, right)
}

fn and(left: ExprRef, right: ExprRef) -> ExprRef {
    Expr::and(left, right)
}

/// Expected single-comparand membership node.
fn expect_in(expr: &Expr, comparand: &ExprRef, expected: &[i64]) {
    let Expr::In { args, values } = expr else {
        panic!("expected a membership node, got {expr:?}");
    };
    assert_eq!(args.len(), 1);
    assert!(args[0].structural_eq(comparand, false));
    assert_eq!(values.len(), expected.len());
    for (tuple, want) in values.iter().zip(expected) {
        assert_eq!(tuple.len(), 1);
        assert_eq!(tuple[0].as_constant(), Some(&Value::Integer(*want)));
    }
}

// ============================================================================
// Folding
// ============================================================================

#[test]
fn test_folds_two_equalities() {
    let x = col("x");
    let chain = or(eq(Arc::clone(&x), int(1)), eq(Arc::clone(&x), int(2)));
    let folded = fold_equality_to_in(&chain);
    expect_in(&folded, &x, &[1, 2]);
}

#[test]
fn test_folds_three_equalities() {
    // x=1 OR x=2 OR x=3 (left-nested, as a builder produces it)
    let x = col("x");
    let chain = or(
        or(eq(Arc::clone(&x), int(1)), eq(Arc::clone(&x), int(2))),
        eq(Arc::clone(&x), int(3)),
    );
    let folded = fold_equality_to_in(&chain);
    expect_in(&folded, &x, &[1, 2, 3]);
}

#[test]
fn test_folds_right_nested_chain() {
    let x = col("x");
    let chain = or(
        eq(Arc::clone(&x), int(1)),
        or(eq(Arc::clone(&x), int(2)), eq(Arc::clone(&x), int(3))),
    );
    let folded = fold_equality_to_in(&chain);
    expect_in(&folded, &x, &[1, 2, 3]);
}

#[test]
fn test_value_order_is_first_seen_without_dedup() {
    let x = col("x");
    let chain = or(
        or(eq(Arc::clone(&x), int(3)), eq(Arc::clone(&x), int(1))),
        eq(Arc::clone(&x), int(3)),
    );
    let folded = fold_equality_to_in(&chain);
    expect_in(&folded, &x, &[3, 1, 3]);
}

#[test]
fn test_folds_reversed_operands() {
    // 1=x OR x=2: the comparand may sit on either side
    let x = col("x");
    let chain = or(eq(int(1), Arc::clone(&x)), eq(Arc::clone(&x), int(2)));
    let folded = fold_equality_to_in(&chain);
    expect_in(&folded, &x, &[1, 2]);
}

#[test]
fn test_folds_hierarchy_level_comparand() {
    let year = Expr::hierarchy_level(sales(), "Date", "Year");
    let chain = or(
        eq(Arc::clone(&year), int(2024)),
        eq(Arc::clone(&year), int(2025)),
    );
    let folded = fold_equality_to_in(&chain);
    expect_in(&folded, &year, &[2024, 2025]);
}

#[test]
fn test_folds_chain_nested_under_not() {
    let x = col("x");
    let wrapped = Expr::not(or(eq(Arc::clone(&x), int(1)), eq(Arc::clone(&x), int(2))));
    let folded = fold_equality_to_in(&wrapped);
    let Expr::Not(inner) = &*folded else {
        panic!("negation should be preserved");
    };
    expect_in(inner, &x, &[1, 2]);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_different_comparands_are_unmodified() {
    let chain = or(eq(col("x"), int(1)), eq(col("y"), int(2)));
    let folded = fold_equality_to_in(&chain);
    assert!(Arc::ptr_eq(&folded, &chain));
}

#[test]
fn test_and_boundary_leaves_or_subtree_unmodified() {
    // (x=1 OR x=2) AND z=3
    let x = col("x");
    let expr = and(
        or(eq(Arc::clone(&x), int(1)), eq(Arc::clone(&x), int(2))),
        eq(col("z"), int(3)),
    );
    let folded = fold_equality_to_in(&expr);
    assert!(Arc::ptr_eq(&folded, &expr));
}

#[test]
fn test_and_inside_chain_cancels() {
    // x=1 OR (x=2 AND x=3)
    let x = col("x");
    let expr = or(
        eq(Arc::clone(&x), int(1)),
        and(eq(Arc::clone(&x), int(2)), eq(Arc::clone(&x), int(3))),
    );
    let folded = fold_equality_to_in(&expr);
    assert!(Arc::ptr_eq(&folded, &expr));
}

#[test]
fn test_mixed_operator_cancels() {
    let x = col("x");
    let expr = or(
        eq(Arc::clone(&x), int(1)),
        Expr::compare(CompareOp::GreaterThan, Arc::clone(&x), int(2)),
    );
    let folded = fold_equality_to_in(&expr);
    assert!(Arc::ptr_eq(&folded, &expr));
}

#[test]
fn test_two_comparands_in_one_equality_cancels() {
    // x=y is ambiguous: both sides are comparands
    let expr = or(eq(col("x"), int(1)), eq(col("x"), col("y")));
    let folded = fold_equality_to_in(&expr);
    assert!(Arc::ptr_eq(&folded, &expr));
}

#[test]
fn test_no_comparand_cancels() {
    let x = col("x");
    let expr = or(eq(Arc::clone(&x), int(1)), eq(int(2), int(2)));
    let folded = fold_equality_to_in(&expr);
    assert!(Arc::ptr_eq(&folded, &expr));
}

#[test]
fn test_bare_equality_is_untouched() {
    let expr = eq(col("x"), int(1));
    let folded = fold_equality_to_in(&expr);
    assert!(Arc::ptr_eq(&folded, &expr));
}

#[test]
fn test_cancellation_does_not_leak_into_sibling_entry() {
    // Two independent rewriter entries: a cancelled chain in one call
    // must not affect a cleanly foldable chain in another.
    let x = col("x");
    let cancelled = or(eq(col("a"), int(1)), eq(col("b"), int(2)));
    let foldable = or(eq(Arc::clone(&x), int(1)), eq(Arc::clone(&x), int(2)));

    assert!(Arc::ptr_eq(&fold_equality_to_in(&cancelled), &cancelled));
    expect_in(&fold_equality_to_in(&foldable), &x, &[1, 2]);
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_rewrite_is_idempotent_on_folded_output() {
    let x = col("x");
    let chain = or(
        or(eq(Arc::clone(&x), int(1)), eq(Arc::clone(&x), int(2))),
        eq(Arc::clone(&x), int(3)),
    );
    let once = fold_equality_to_in(&chain);
    let twice = fold_equality_to_in(&once);
    assert!(Arc::ptr_eq(&twice, &once));
}

#[test]
fn test_rewrite_is_idempotent_on_unmodified_output() {
    let expr = or(eq(col("x"), int(1)), eq(col("y"), int(2)));
    let once = fold_equality_to_in(&expr);
    let twice = fold_equality_to_in(&once);
    assert!(once.structural_eq(&twice, false));
}

// ============================================================================
// Equivalence
// ============================================================================

/// Evaluates an equality-OR chain or its membership rewrite as a
/// predicate over one bound comparand value.
fn eval_predicate(expr: &Expr, comparand: &ExprRef, bound: &Value) -> bool {
    match expr {
        Expr::Compare {
            op: CompareOp::Equal,
            left,
            right,
        } => {
            let constant = if left.is_comparand() {
                right.as_constant()
            } else {
                left.as_constant()
            };
            constant.is_some_and(|c| bound.eq_value(c))
        }
        Expr::Or(left, right) => {
            eval_predicate(left, comparand, bound) || eval_predicate(right, comparand, bound)
        }
        Expr::In { args, values } => {
            assert_eq!(args.len(), 1);
            assert!(args[0].structural_eq(comparand, false));
            values.iter().any(|tuple| {
                tuple.len() == 1
                    && tuple[0]
                        .as_constant()
                        .is_some_and(|c| bound.eq_value(c))
            })
        }
        other => panic!("unexpected node in predicate: {other:?}"),
    }
}

#[test]
fn test_fold_preserves_predicate_semantics() {
    let x = col("x");
    let chain = or(
        or(eq(Arc::clone(&x), int(1)), eq(Arc::clone(&x), int(2))),
        eq(Arc::clone(&x), int(3)),
    );
    let folded = fold_equality_to_in(&chain);

    // Sample values inside and outside the chain, across representations.
    let samples = [
        Value::Integer(0),
        Value::Integer(1),
        Value::Integer(2),
        Value::Integer(3),
        Value::Integer(4),
        Value::Float(2.0),
        Value::Float(2.5),
        Value::String("2".to_string()),
        Value::Null,
    ];
    for sample in &samples {
        assert_eq!(
            eval_predicate(&chain, &x, sample),
            eval_predicate(&folded, &x, sample),
            "fold changed the predicate at {sample:?}"
        );
    }
}
