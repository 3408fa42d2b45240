//! Eval context over a categorical payload.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{Expr, SelectItem};
use crate::eval::color::{ColorAllocator, FillRule, FillRuleKind};
use crate::eval::{EvalContext, fold_range};
use crate::rows::{CategoricalPayload, DataColumn};
use crate::value::Value;

/// Where a role resolved inside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnSlot {
    Values(usize),
    Categories(usize),
}

/// Eval context backed by parallel category/value columns plus the select
/// list they materialize.
///
/// The context holds a mutable row cursor; every lookup before the first
/// [`set_current_row`](CategoricalEvalContext::set_current_row) yields no
/// value. Role lookups scan value columns first, then category columns,
/// and the resolved position is cached per role for the context's
/// lifetime (the payload is immutable, so the answer cannot change).
pub struct CategoricalEvalContext {
    payload: CategoricalPayload,
    select: Vec<SelectItem>,
    current_row: Option<usize>,
    role_cache: RefCell<HashMap<String, Option<ColumnSlot>>>,
    allocators: HashMap<usize, Option<ColorAllocator>>,
}

impl CategoricalEvalContext {
    pub fn new(payload: CategoricalPayload, select: Vec<SelectItem>) -> Self {
        CategoricalEvalContext {
            payload,
            select,
            current_row: None,
            role_cache: RefCell::new(HashMap::new()),
            allocators: HashMap::new(),
        }
    }

    /// Moves the row cursor. An out-of-range index simply resolves every
    /// subsequent lookup to no value.
    pub fn set_current_row(&mut self, index: usize) {
        self.current_row = Some(index);
    }

    pub fn row_count(&self) -> usize {
        self.payload.row_count()
    }

    fn column_at(&self, slot: ColumnSlot) -> &DataColumn {
        match slot {
            ColumnSlot::Values(i) => &self.payload.values[i],
            ColumnSlot::Categories(i) => &self.payload.categories[i],
        }
    }

    fn column_for_role(&self, role: &str) -> Option<ColumnSlot> {
        if let Some(cached) = self.role_cache.borrow().get(role) {
            return *cached;
        }
        let slot = self
            .payload
            .values
            .iter()
            .position(|c| c.has_role(role))
            .map(ColumnSlot::Values)
            .or_else(|| {
                self.payload
                    .categories
                    .iter()
                    .position(|c| c.has_role(role))
                    .map(ColumnSlot::Categories)
            });
        self.role_cache.borrow_mut().insert(role.to_string(), slot);
        slot
    }

    fn build_allocator(&self, rule: &FillRule) -> Option<ColorAllocator> {
        if let FillRuleKind::Solid { .. } = rule.kind {
            return ColorAllocator::for_rule(rule, None, None).ok();
        }
        let slot = self.column_for_role(&rule.input_role)?;
        let column = self.column_at(slot);
        let (min, max) = match (&column.min, &column.max) {
            (Some(lo), Some(hi)) => (Some(lo.clone()), Some(hi.clone())),
            _ => fold_range(column.values.iter()),
        };
        ColorAllocator::for_rule(rule, min.as_ref(), max.as_ref()).ok()
    }
}

impl EvalContext for CategoricalEvalContext {
    fn expr_value(&self, expr: &Expr) -> Option<Value> {
        let row = self.current_row?;
        let index = self
            .select
            .iter()
            .position(|item| item.expr.structural_eq(expr, false))?;
        let column = self
            .payload
            .values
            .iter()
            .chain(&self.payload.categories)
            .find(|c| c.select_index == index)?;
        column.values.get(row).cloned()
    }

    fn role_value(&self, role: &str) -> Option<Value> {
        let row = self.current_row?;
        let slot = self.column_for_role(role)?;
        self.column_at(slot).values.get(row).cloned()
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
