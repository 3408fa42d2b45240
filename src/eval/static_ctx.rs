//! Eval context over zero or one conceptual row.
//!
//! Property panes and enumeration surfaces need expression and rule
//! resolution without a live row iteration: a column-level summary when
//! one exists, else the first row of an optional table payload, else no
//! value.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{AggregateFn, Expr, SelectItem};
use crate::eval::color::{ColorAllocator, FillRule, FillRuleKind};
use crate::eval::{EvalContext, fold_range};
use crate::rows::{DataColumn, TablePayload};
use crate::value::Value;

/// Eval context with no movable cursor.
pub struct StaticEvalContext {
    select: Vec<SelectItem>,
    /// Column-level summaries (and, optionally, single-row values)
    columns: Vec<DataColumn>,
    table: Option<TablePayload>,
    allocators: HashMap<usize, Option<ColorAllocator>>,
}

impl StaticEvalContext {
    pub fn new(select: Vec<SelectItem>) -> Self {
        StaticEvalContext {
            select,
            columns: Vec::new(),
            table: None,
            allocators: HashMap::new(),
        }
    }

    /// Attaches column-level data (summaries and/or one-row values).
    pub fn with_columns(mut self, columns: Vec<DataColumn>) -> Self {
        self.columns = columns;
        self
    }

    /// Attaches a table payload; row 0 backs fallback resolution.
    pub fn with_table(mut self, table: TablePayload) -> Self {
        self.table = Some(table);
        self
    }

    fn select_index_of(&self, expr: &Expr) -> Option<usize> {
        self.select
            .iter()
            .position(|item| item.expr.structural_eq(expr, false))
    }

    fn column_by_index(&self, index: usize) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.select_index == index)
    }

    /// Pre-aggregated summary for a Min/Max aggregate, resolved without
    /// a live row.
    fn summary_value(&self, expr: &Expr) -> Option<Value> {
        let Expr::Aggregate { arg, func } = expr else {
            return None;
        };
        let index = self
            .select_index_of(expr)
            .or_else(|| self.select_index_of(arg))?;
        let column = self.column_by_index(index)?;
        match func {
            AggregateFn::Min => column.min.clone(),
            AggregateFn::Max => column.max.clone(),
            _ => None,
        }
    }

    fn table_value(&self, index: usize) -> Option<Value> {
        let table = self.table.as_ref()?;
        let position = table.columns.iter().position(|c| c.select_index == index)?;
        table.rows.first().and_then(|row| row.get(position)).cloned()
    }

    fn build_allocator(&self, rule: &FillRule) -> Option<ColorAllocator> {
        if let FillRuleKind::Solid { .. } = rule.kind {
            return ColorAllocator::for_rule(rule, None, None).ok();
        }
        let (min, max) = if let Some(column) =
            self.columns.iter().find(|c| c.has_role(&rule.input_role))
        {
            match (&column.min, &column.max) {
                (Some(lo), Some(hi)) => (Some(lo.clone()), Some(hi.clone())),
                _ => fold_range(column.values.iter()),
            }
        } else if let Some(table) = &self.table
            && let Some(position) = table
                .columns
                .iter()
                .position(|c| c.has_role(&rule.input_role))
        {
            fold_range(table.rows.iter().filter_map(|row| row.get(position)))
        } else {
            return None;
        };
        ColorAllocator::for_rule(rule, min.as_ref(), max.as_ref()).ok()
    }
}

impl EvalContext for StaticEvalContext {
    fn expr_value(&self, expr: &Expr) -> Option<Value> {
        if let Some(summary) = self.summary_value(expr) {
            return Some(summary);
        }
        let index = self.select_index_of(expr)?;
        if let Some(column) = self.column_by_index(index)
            && let Some(value) = column.values.first()
        {
            return Some(value.clone());
        }
        self.table_value(index)
    }

    fn role_value(&self, role: &str) -> Option<Value> {
        if let Some(column) = self.columns.iter().find(|c| c.has_role(role))
            && let Some(value) = column.values.first()
        {
            return Some(value.clone());
        }
        let table = self.table.as_ref()?;
        let position = table.columns.iter().position(|c| c.has_role(role))?;
        table.rows.first().and_then(|row| row.get(position)).cloned()
    }

    fn color_allocator(&mut self, rule: &Arc<FillRule>) -> Option<&ColorAllocator> {
        let key = Arc::as_ptr(rule) as usize;
        if !self.allocators.contains_key(&key) {
            let built = self.build_allocator(rule);
            self.allocators.insert(key, built);
        }
        self.allocators.get(&key).and_then(Option::as_ref)
    }
}
