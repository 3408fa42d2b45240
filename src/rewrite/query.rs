//! Whole-query rewriting.
//!
//! Applies an expression rewriter across every expression position of a
//! query definition -- select, where, order-by and nested subquery
//! sources -- sharing parts the rewriter did not change.

use std::sync::Arc;

use crate::ast::{OrderByItem, QueryDefn, SelectItem};
use crate::from_table::FromSource;
use crate::rewrite::membership::fold_equality_to_in;
use crate::visitor::ExprRewriter;

/// Rewrites every expression of `query` through `rewriter`, recursing
/// into subquery sources. Where-clause conditions are rewritten one by
/// one, so each conjunct is an independent rewrite root.
pub fn rewrite_query<R: ExprRewriter>(query: &QueryDefn, rewriter: &mut R) -> QueryDefn {
    let from = query.from.map_sources(|source| match source {
        FromSource::Subquery(sub) => Some(FromSource::subquery(rewrite_query(sub, rewriter))),
        FromSource::Entity { .. } => None,
    });
    let select = query
        .select
        .iter()
        .map(|item| SelectItem {
            name: item.name.clone(),
            expr: rewriter.rewrite(&item.expr),
        })
        .collect();
    let where_clauses = query
        .where_clauses
        .iter()
        .map(|condition| rewriter.rewrite(condition))
        .collect();
    let order_by = query
        .order_by
        .iter()
        .map(|item| OrderByItem {
            expr: rewriter.rewrite(&item.expr),
            direction: item.direction,
        })
        .collect();
    QueryDefn {
        from,
        select,
        where_clauses,
        order_by,
    }
}

/// Normalizes a query before serialization: each where-clause condition
/// gets its own equality-to-membership pass, and subquery sources are
/// normalized recursively. Select and order-by expressions are value
/// projections, not filter conditions, and pass through untouched.
pub fn normalize_query(query: &QueryDefn) -> QueryDefn {
    let from = query.from.map_sources(|source| match source {
        FromSource::Subquery(sub) => Some(FromSource::subquery(normalize_query(sub))),
        FromSource::Entity { .. } => None,
    });
    let where_clauses = query
        .where_clauses
        .iter()
        .map(fold_equality_to_in)
        .collect();
    QueryDefn {
        from,
        select: query.select.clone(),
        where_clauses,
        order_by: query.order_by.clone(),
    }
}

/// True when `normalize_query` would leave the query byte-identical:
/// every where clause folds to itself. Useful for skipping reserialization
/// of unchanged queries.
pub fn is_normalized(query: &QueryDefn) -> bool {
    query
        .where_clauses
        .iter()
        .all(|condition| Arc::ptr_eq(&fold_equality_to_in(condition), condition))
}
