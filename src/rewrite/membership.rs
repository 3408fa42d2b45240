//! Equality-to-membership folding.
//!
//! Folds an OR-chain of equality comparisons against one comparand
//! (`x = 1 OR x = 2 OR x = 3`) into a single membership test
//! (`x IN [1, 2, 3]`). The fold is conservative by construction: any
//! ambiguity -- composite keys, mixed operators, unsupported node kinds --
//! skips the optimization for that chain rather than risk an incorrect
//! filter.

use std::sync::Arc;

use crate::ast::{CompareOp, Expr, ExprRef};
use crate::visitor::{ExprRewriter, rewrite_children};

/// Folds equality-OR chains into membership tests, depth-first in a
/// single pass.
///
/// An accumulator opens at the outermost `Or` of a chain and commits when
/// that `Or` completes with at least one recorded pair and no
/// cancellation. Values keep first-seen order, without dedup or
/// reordering. Multi-column (composite) sets are not folded; a differing
/// comparand within one chain cancels it.
///
/// Conjunctions are an opaque boundary: folding never crosses an `And`,
/// so `(x = 1 OR x = 2) AND z = 3` comes back untouched. Conjuncts are
/// folded independently one level up, where each where-clause condition
/// gets its own pass (see [`normalize_query`](crate::rewrite::normalize_query)).
///
/// Idempotent: a membership node is an unsupported kind for folding, so
/// re-running on the output changes nothing.
pub fn fold_equality_to_in(expr: &ExprRef) -> ExprRef {
    Folder { current: None }.rewrite(expr)
}

/// Accumulator for one OR-chain.
struct InBuilder {
    comparand: Option<ExprRef>,
    values: Vec<ExprRef>,
    cancelled: bool,
}

impl InBuilder {
    fn new() -> Self {
        InBuilder {
            comparand: None,
            values: Vec::new(),
            cancelled: false,
        }
    }

    /// Records one `(comparand, value)` pair. A comparand differing from
    /// the recorded one cancels the chain: composite sets are out.
    fn add(&mut self, comparand: &ExprRef, value: &ExprRef) {
        if self.cancelled {
            return;
        }
        match &self.comparand {
            None => {
                self.comparand = Some(Arc::clone(comparand));
                self.values.push(Arc::clone(value));
            }
            Some(existing) if existing.structural_eq(comparand, false) => {
                self.values.push(Arc::clone(value));
            }
            Some(_) => self.cancelled = true,
        }
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// The membership replacement, or `None` when the chain was cancelled
    /// or recorded nothing.
    fn complete(self) -> Option<ExprRef> {
        if self.cancelled || self.values.is_empty() {
            return None;
        }
        let comparand = self.comparand?;
        let tuples = self.values.into_iter().map(|v| vec![v]).collect();
        Some(Expr::membership(vec![comparand], tuples))
    }
}

struct Folder {
    current: Option<InBuilder>,
}

impl ExprRewriter for Folder {
    fn rewrite(&mut self, expr: &ExprRef) -> ExprRef {
        match &**expr {
            Expr::Or(left, right) => {
                if self.current.is_some() {
                    // Inner link of an open chain: record into the
                    // ancestor's accumulator; the opener commits.
                    self.rewrite(left);
                    self.rewrite(right);
                    return Arc::clone(expr);
                }
                self.current = Some(InBuilder::new());
                self.rewrite(left);
                self.rewrite(right);
                let completed = self.current.take().and_then(InBuilder::complete);
                completed.unwrap_or_else(|| Arc::clone(expr))
            }
            Expr::Compare { op, left, right } => {
                let Some(builder) = self.current.as_mut() else {
                    // A bare comparison outside any chain stays as-is.
                    return Arc::clone(expr);
                };
                if *op != CompareOp::Equal {
                    builder.cancel();
                    return Arc::clone(expr);
                }
                // Exactly one side must be the comparand; the other is
                // recorded as a value.
                match (left.is_comparand(), right.is_comparand()) {
                    (true, false) => builder.add(left, right),
                    (false, true) => builder.add(right, left),
                    _ => builder.cancel(),
                }
                Arc::clone(expr)
            }
            Expr::And(_, _) => {
                // Folding must not cross a conjunction boundary.
                if let Some(builder) = self.current.as_mut() {
                    builder.cancel();
                }
                Arc::clone(expr)
            }
            _ => {
                if let Some(builder) = self.current.as_mut() {
                    // Any other kind inside a chain makes it ambiguous.
                    builder.cancel();
                    Arc::clone(expr)
                } else {
                    rewrite_children(self, expr)
                }
            }
        }
    }
}
