//! Generic visit/rewrite dispatch over the expression union.
//!
//! Both traits dispatch through an exhaustive match on [`Expr`], so adding
//! a node kind is a compile error here until its traversal is written --
//! there is no silent fall-through for an unhandled kind.

use std::sync::Arc;

use crate::ast::{Expr, ExprRef};

/// Read-only expression visitor.
///
/// Override [`visit`](ExprVisitor::visit) to observe nodes; delegate to
/// [`walk_expr`] for the children you do not handle yourself.
pub trait ExprVisitor: Sized {
    fn visit(&mut self, expr: &ExprRef) {
        walk_expr(self, expr);
    }
}

/// Visits every child of `expr` in evaluation order.
pub fn walk_expr<V: ExprVisitor>(visitor: &mut V, expr: &ExprRef) {
    match &**expr {
        Expr::Entity { .. } | Expr::Constant(_) => {}
        Expr::Column { source, .. } | Expr::HierarchyLevel { source, .. } => {
            visitor.visit(source);
        }
        Expr::Compare { left, right, .. } => {
            visitor.visit(left);
            visitor.visit(right);
        }
        Expr::And(left, right) | Expr::Or(left, right) => {
            visitor.visit(left);
            visitor.visit(right);
        }
        Expr::Not(arg) => visitor.visit(arg),
        Expr::Aggregate { arg, .. } => visitor.visit(arg),
        Expr::In { args, values } => {
            for arg in args {
                visitor.visit(arg);
            }
            for tuple in values {
                for value in tuple {
                    visitor.visit(value);
                }
            }
        }
    }
}

/// Depth-first expression rewriter.
///
/// The default behavior is the identity rewrite: children are visited and
/// the node is rebuilt only when a child actually changed, so an untouched
/// subtree comes back as the very same allocation and rewrite cost stays
/// proportional to the size of the change. Implementors override
/// [`rewrite`](ExprRewriter::rewrite) for the node kinds they care about
/// and delegate to [`rewrite_children`] for everything else.
pub trait ExprRewriter: Sized {
    fn rewrite(&mut self, expr: &ExprRef) -> ExprRef {
        rewrite_children(self, expr)
    }
}

/// Rewrites every child of `expr`, returning the original handle when no
/// child changed. Change detection is pointer identity per child.
pub fn rewrite_children<R: ExprRewriter>(rewriter: &mut R, expr: &ExprRef) -> ExprRef {
    match &**expr {
        Expr::Entity { .. } | Expr::Constant(_) => Arc::clone(expr),
        Expr::Column { source, name } => {
            let new_source = rewriter.rewrite(source);
            if Arc::ptr_eq(&new_source, source) {
                Arc::clone(expr)
            } else {
                Expr::column(new_source, name.clone())
            }
        }
        Expr::HierarchyLevel {
            source,
            hierarchy,
            level,
        } => {
            let new_source = rewriter.rewrite(source);
            if Arc::ptr_eq(&new_source, source) {
                Arc::clone(expr)
            } else {
                Expr::hierarchy_level(new_source, hierarchy.clone(), level.clone())
            }
        }
        Expr::Compare { op, left, right } => {
            let new_left = rewriter.rewrite(left);
            let new_right = rewriter.rewrite(right);
            if Arc::ptr_eq(&new_left, left) && Arc::ptr_eq(&new_right, right) {
                Arc::clone(expr)
            } else {
                Expr::compare(*op, new_left, new_right)
            }
        }
        Expr::And(left, right) => {
            let new_left = rewriter.rewrite(left);
            let new_right = rewriter.rewrite(right);
            if Arc::ptr_eq(&new_left, left) && Arc::ptr_eq(&new_right, right) {
                Arc::clone(expr)
            } else {
                Expr::and(new_left, new_right)
            }
        }
        Expr::Or(left, right) => {
            let new_left = rewriter.rewrite(left);
            let new_right = rewriter.rewrite(right);
            if Arc::ptr_eq(&new_left, left) && Arc::ptr_eq(&new_right, right) {
                Arc::clone(expr)
            } else {
                Expr::or(new_left, new_right)
            }
        }
        Expr::Not(arg) => {
            let new_arg = rewriter.rewrite(arg);
            if Arc::ptr_eq(&new_arg, arg) {
                Arc::clone(expr)
            } else {
                Expr::not(new_arg)
            }
        }
        Expr::Aggregate { arg, func } => {
            let new_arg = rewriter.rewrite(arg);
            if Arc::ptr_eq(&new_arg, arg) {
                Arc::clone(expr)
            } else {
                Expr::aggregate(new_arg, *func)
            }
        }
        Expr::In { args, values } => {
            let mut changed = false;
            let new_args = rewrite_slice(rewriter, args, &mut changed);
            let new_values: Vec<Vec<ExprRef>> = values
                .iter()
                .map(|tuple| rewrite_slice(rewriter, tuple, &mut changed))
                .collect();
            if changed {
                Expr::membership(new_args, new_values)
            } else {
                Arc::clone(expr)
            }
        }
    }
}

fn rewrite_slice<R: ExprRewriter>(
    rewriter: &mut R,
    exprs: &[ExprRef],
    changed: &mut bool,
) -> Vec<ExprRef> {
    exprs
        .iter()
        .map(|e| {
            let rewritten = rewriter.rewrite(e);
            if !Arc::ptr_eq(&rewritten, e) {
                *changed = true;
            }
            rewritten
        })
        .collect()
}
