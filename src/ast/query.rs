use crate::ast::{Expr, ExprRef, SortDirection};
use crate::from_table::FromTable;

/// One named binding in a select list.
///
/// Select lists are ordered and uniquely named; every role-tagged data
/// column maps back to exactly one select item by name.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub name: String,
    pub expr: ExprRef,
}

impl SelectItem {
    pub fn new(name: impl Into<String>, expr: ExprRef) -> Self {
        SelectItem {
            name: name.into(),
            expr,
        }
    }
}

/// One sort key of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: ExprRef,
    pub direction: SortDirection,
}

impl OrderByItem {
    pub fn new(expr: ExprRef, direction: SortDirection) -> Self {
        OrderByItem { expr, direction }
    }
}

/// Complete query definition.
///
/// Holds the deduplicated source table, the ordered select list, the
/// where conditions (an implicit conjunction) and the sort keys. Built by
/// a query builder, read-only to rewriters, then serialized out to the
/// row-producing collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefn {
    pub from: FromTable,
    pub select: Vec<SelectItem>,
    pub where_clauses: Vec<ExprRef>,
    pub order_by: Vec<OrderByItem>,
}

impl QueryDefn {
    /// Empty query over the given source table.
    pub fn new(from: FromTable) -> Self {
        QueryDefn {
            from,
            select: Vec::new(),
            where_clauses: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Position of the select item binding a structurally equal
    /// expression, if any.
    pub fn select_index_of(&self, expr: &Expr) -> Option<usize> {
        self.select
            .iter()
            .position(|item| item.expr.structural_eq(expr, false))
    }

    /// Select item registered under `name`.
    pub fn select_item(&self, name: &str) -> Option<&SelectItem> {
        self.select.iter().find(|item| item.name == name)
    }
}
