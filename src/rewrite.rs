//! Pattern rewriters over query expressions.
//!
//! Rewriters consume trees read-only and return new-or-same references;
//! identical input always yields identical output and identical
//! cancel/commit decisions.
//!
//! - **[membership]** - equality-OR-chain to membership folding
//! - **[query]** - applying a rewriter across select/where/order-by/from

pub mod membership;
pub mod query;

pub use membership::fold_equality_to_in;
pub use query::{is_normalized, normalize_query, rewrite_query};
