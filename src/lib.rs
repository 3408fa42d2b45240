pub mod aggregates;
pub mod ast;
pub mod eval;
pub mod from_table;
pub mod inherit;
pub mod rewrite;
pub mod rows;
pub mod schema;
pub mod serialize;
pub mod value;
pub mod visitor;

pub use aggregates::{
    AggregatePolicy, create_expr_with_aggregate, is_supported_aggregate, supported_aggregates,
};
pub use ast::{
    AggregateFn, CompareOp, Expr, ExprRef, OrderByItem, QueryDefn, SelectItem, SortDirection,
};
pub use eval::{
    CategoricalEvalContext, ColorAllocator, EvalContext, FillRule, FillRuleKind, GradientStop,
    StaticEvalContext,
};
pub use from_table::{EnsureResult, FromSource, FromTable};
pub use inherit::{MatrixNode, inherit_matrix_node_hierarchy, inherit_single};
pub use rewrite::{fold_equality_to_in, normalize_query, rewrite_query};
pub use rows::{CategoricalPayload, DataColumn, TableColumn, TablePayload};
pub use schema::{ConceptualSchema, DataType, FieldKind, FieldMetadata, MapSchema};
pub use value::Value;
pub use visitor::{ExprRewriter, ExprVisitor, rewrite_children, walk_expr};
