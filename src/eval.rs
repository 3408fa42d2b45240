//! Eval contexts: per-row resolution of expression values, role values
//! and rule outputs.
//!
//! A context is transient -- one per materialization pass, owned by the
//! single update that created it, discarded afterwards. Resolution
//! failures are data absence, not errors: a column or role may
//! legitimately be missing for a given configuration, so every lookup
//! returns an `Option` and an empty payload never fails.
//!
//! - **[categorical]** - context over a categorical payload with a
//!   movable row cursor
//! - **[static_ctx]** - context over zero/one conceptual row, for
//!   property-pane and enumeration use
//! - **[color]** - declarative fill rules and resolved color allocators

use std::cmp::Ordering;
use std::sync::Arc;

use crate::ast::Expr;
use crate::value::Value;

pub mod categorical;
pub mod color;
pub mod static_ctx;

pub use categorical::CategoricalEvalContext;
pub use color::{ColorAllocator, ColorError, FillRule, FillRuleKind, GradientStop};
pub use static_ctx::StaticEvalContext;

/// Resolver of expression/role values against a currently-positioned row.
///
/// Contexts are single-owner and synchronous; the row cursor of a
/// categorical context must not be advanced by two logical consumers at
/// once. Allocators returned by `color_allocator` are memoized per rule
/// identity for the context's lifetime.
pub trait EvalContext {
    /// Scalar value of an expression at the current row.
    fn expr_value(&self, expr: &Expr) -> Option<Value>;

    /// Scalar value of the column tagged with `role` at the current row.
    fn role_value(&self, role: &str) -> Option<Value>;

    /// Resolved color allocator for a fill rule, memoized by the rule's
    /// shared allocation identity.
    fn color_allocator(&mut self, rule: &Arc<FillRule>) -> Option<&ColorAllocator>;
}

/// Minimum and maximum of a value stream, ignoring nulls and values that
/// do not compare.
pub(crate) fn fold_range<'a, I>(values: I) -> (Option<Value>, Option<Value>)
where
    I: Iterator<Item = &'a Value>,
{
    let mut min: Option<&Value> = None;
    let mut max: Option<&Value> = None;
    for value in values {
        if matches!(value, Value::Null) {
            continue;
        }
        match min {
            None => min = Some(value),
            Some(m) if matches!(value.compare(m), Some(Ordering::Less)) => min = Some(value),
            _ => {}
        }
        match max {
            None => max = Some(value),
            Some(m) if matches!(value.compare(m), Some(Ordering::Greater)) => max = Some(value),
            _ => {}
        }
    }
    (min.cloned(), max.cloned())
}
