//! # Query Expression Trees
//!
//! This module defines the expression nodes of a declarative query: an
//! immutable tree (really a DAG, since nodes may be shared) of references,
//! comparisons, boolean connectives and aggregates, plus the query
//! definition that binds expressions into select/where/order-by positions.
//!
//! ## Architecture Overview
//!
//! The module is organized into focused submodules:
//!
//! - **[expressions]** - Expression nodes and structural equality
//! - **[operators]** - Comparison operators, aggregate functions, sort
//!   directions
//! - **[query]** - Complete query definition (from/select/where/order-by)
//!
//! ## Core Concepts
//!
//! ### Immutability and sharing
//!
//! Every node is held behind an [`ExprRef`] (a reference-counted handle).
//! Rewriters never mutate a node in place: they return either the original
//! handle (nothing changed) or a newly allocated node whose unchanged
//! children are shared with the original.
//!
//! ### Structural equality
//!
//! [`Expr::structural_eq`] compares kind plus children, with optional
//! case-insensitive leaf-name comparison. It underlies source dedup in the
//! from-table and select-binding resolution in the eval contexts.

pub mod expressions;
pub mod operators;
pub mod query;

pub use expressions::{Expr, ExprRef};
pub use operators::{AggregateFn, CompareOp, SortDirection};
pub use query::{OrderByItem, QueryDefn, SelectItem};
