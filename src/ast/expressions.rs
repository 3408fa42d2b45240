use std::sync::Arc;

use crate::ast::{AggregateFn, CompareOp};
use crate::value::Value;

/// Shared handle to an immutable expression node.
///
/// Nodes are reference-counted so rewriters can return the same allocation
/// when nothing changed, and so one node may appear in several trees (the
/// tree is really a DAG; it is never cyclic, so walks need no cycle
/// detection).
pub type ExprRef = Arc<Expr>;

/// Query expression node.
///
/// The expression tree is the internal representation of one declarative
/// query condition, reference or projection. Nodes are immutable after
/// construction; all rewriting produces new-or-same references.
///
/// # Examples
///
/// `sales.amount > 100`:
///
/// ```text
/// Compare(GreaterThan)
/// ├── Column("amount") ── Entity("s", "sales")
/// └── Constant(100)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a data source entity
    ///
    /// # Example
    /// ```text
    /// Entity { schema: "s", entity: "Sales", variable: None }
    /// ```
    Entity {
        schema: String,
        entity: String,
        variable: Option<String>,
    },

    /// Column of an entity or subquery source
    Column { source: ExprRef, name: String },

    /// One level of a hierarchy on a source
    ///
    /// # Example
    /// ```text
    /// HierarchyLevel { source: <Sales>, hierarchy: "Date", level: "Year" }
    /// ```
    HierarchyLevel {
        source: ExprRef,
        hierarchy: String,
        level: String,
    },

    /// Literal scalar
    Constant(Value),

    /// Binary comparison
    Compare {
        op: CompareOp,
        left: ExprRef,
        right: ExprRef,
    },

    /// Logical conjunction
    And(ExprRef, ExprRef),

    /// Logical disjunction
    Or(ExprRef, ExprRef),

    /// Logical negation
    Not(ExprRef),

    /// Aggregation over a projected expression
    Aggregate { arg: ExprRef, func: AggregateFn },

    /// Membership test: `args` tuple IN `values` tuples
    ///
    /// Each entry of `values` is one tuple, positionally matching `args`.
    /// The single-comparand form produced by the equality-to-membership
    /// rewrite is `args.len() == 1` with one-element value tuples.
    In {
        args: Vec<ExprRef>,
        values: Vec<Vec<ExprRef>>,
    },
}

impl Expr {
    /// Entity reference without a bound variable.
    pub fn entity(schema: impl Into<String>, entity: impl Into<String>) -> ExprRef {
        Arc::new(Expr::Entity {
            schema: schema.into(),
            entity: entity.into(),
            variable: None,
        })
    }

    /// Entity reference bound to an alias variable from the from-table.
    pub fn entity_var(
        schema: impl Into<String>,
        entity: impl Into<String>,
        variable: impl Into<String>,
    ) -> ExprRef {
        Arc::new(Expr::Entity {
            schema: schema.into(),
            entity: entity.into(),
            variable: Some(variable.into()),
        })
    }

    /// Column reference on a source expression.
    pub fn column(source: ExprRef, name: impl Into<String>) -> ExprRef {
        Arc::new(Expr::Column {
            source,
            name: name.into(),
        })
    }

    /// Hierarchy-level reference on a source expression.
    pub fn hierarchy_level(
        source: ExprRef,
        hierarchy: impl Into<String>,
        level: impl Into<String>,
    ) -> ExprRef {
        Arc::new(Expr::HierarchyLevel {
            source,
            hierarchy: hierarchy.into(),
            level: level.into(),
        })
    }

    /// Literal constant.
    pub fn constant(value: Value) -> ExprRef {
        Arc::new(Expr::Constant(value))
    }

    /// Binary comparison.
    pub fn compare(op: CompareOp, left: ExprRef, right: ExprRef) -> ExprRef {
        Arc::new(Expr::Compare { op, left, right })
    }

    /// Equality comparison.
    pub fn equal(left: ExprRef, right: ExprRef) -> ExprRef {
        Expr::compare(CompareOp::Equal, left, right)
    }

    /// Logical conjunction.
    pub fn and(left: ExprRef, right: ExprRef) -> ExprRef {
        Arc::new(Expr::And(left, right))
    }

    /// Logical disjunction.
    pub fn or(left: ExprRef, right: ExprRef) -> ExprRef {
        Arc::new(Expr::Or(left, right))
    }

    /// Logical negation.
    pub fn not(arg: ExprRef) -> ExprRef {
        Arc::new(Expr::Not(arg))
    }

    /// Aggregation over an expression.
    pub fn aggregate(arg: ExprRef, func: AggregateFn) -> ExprRef {
        Arc::new(Expr::Aggregate { arg, func })
    }

    /// Membership test over comparand tuples.
    pub fn membership(args: Vec<ExprRef>, values: Vec<Vec<ExprRef>>) -> ExprRef {
        Arc::new(Expr::In { args, values })
    }

    /// True for the node kinds a membership fold may collect on its
    /// comparand side: column and hierarchy-level references.
    pub fn is_comparand(&self) -> bool {
        matches!(self, Expr::Column { .. } | Expr::HierarchyLevel { .. })
    }

    /// The constant payload, if this node is a literal.
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expr::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Strips one aggregation wrapper, if present.
    pub fn deaggregated(expr: &ExprRef) -> &ExprRef {
        match &**expr {
            Expr::Aggregate { arg, .. } => arg,
            _ => expr,
        }
    }

    /// The schema-addressable property name of a reference node: the
    /// column name, or the level name of a hierarchy level.
    pub fn property_name(&self) -> Option<&str> {
        match self {
            Expr::Column { name, .. } => Some(name),
            Expr::HierarchyLevel { level, .. } => Some(level),
            _ => None,
        }
    }

    /// Walks reference/aggregate wrappers down to the underlying entity,
    /// returning its `(schema, entity)` pair.
    pub fn source_entity(&self) -> Option<(&str, &str)> {
        match self {
            Expr::Entity { schema, entity, .. } => Some((schema, entity)),
            Expr::Column { source, .. } | Expr::HierarchyLevel { source, .. } => {
                source.source_entity()
            }
            Expr::Aggregate { arg, .. } => arg.source_entity(),
            _ => None,
        }
    }

    /// Deep structural equality: kind plus children.
    ///
    /// With `ignore_case`, leaf *names* (schema, entity, variable, column,
    /// hierarchy and level names) compare case-insensitively. Constant
    /// string values always compare exactly.
    pub fn structural_eq(&self, other: &Expr, ignore_case: bool) -> bool {
        match (self, other) {
            (
                Expr::Entity {
                    schema: sa,
                    entity: ea,
                    variable: va,
                },
                Expr::Entity {
                    schema: sb,
                    entity: eb,
                    variable: vb,
                },
            ) => {
                names_eq(sa, sb, ignore_case)
                    && names_eq(ea, eb, ignore_case)
                    && match (va, vb) {
                        (None, None) => true,
                        (Some(a), Some(b)) => names_eq(a, b, ignore_case),
                        _ => false,
                    }
            }
            (
                Expr::Column {
                    source: srca,
                    name: na,
                },
                Expr::Column {
                    source: srcb,
                    name: nb,
                },
            ) => names_eq(na, nb, ignore_case) && srca.structural_eq(srcb, ignore_case),
            (
                Expr::HierarchyLevel {
                    source: srca,
                    hierarchy: ha,
                    level: la,
                },
                Expr::HierarchyLevel {
                    source: srcb,
                    hierarchy: hb,
                    level: lb,
                },
            ) => {
                names_eq(ha, hb, ignore_case)
                    && names_eq(la, lb, ignore_case)
                    && srca.structural_eq(srcb, ignore_case)
            }
            (Expr::Constant(a), Expr::Constant(b)) => a == b,
            (
                Expr::Compare {
                    op: opa,
                    left: la,
                    right: ra,
                },
                Expr::Compare {
                    op: opb,
                    left: lb,
                    right: rb,
                },
            ) => {
                opa == opb
                    && la.structural_eq(lb, ignore_case)
                    && ra.structural_eq(rb, ignore_case)
            }
            (Expr::And(la, ra), Expr::And(lb, rb)) | (Expr::Or(la, ra), Expr::Or(lb, rb)) => {
                la.structural_eq(lb, ignore_case) && ra.structural_eq(rb, ignore_case)
            }
            (Expr::Not(a), Expr::Not(b)) => a.structural_eq(b, ignore_case),
            (
                Expr::Aggregate { arg: aa, func: fa },
                Expr::Aggregate { arg: ab, func: fb },
            ) => fa == fb && aa.structural_eq(ab, ignore_case),
            (
                Expr::In {
                    args: aa,
                    values: va,
                },
                Expr::In {
                    args: ab,
                    values: vb,
                },
            ) => {
                exprs_eq(aa, ab, ignore_case)
                    && va.len() == vb.len()
                    && va
                        .iter()
                        .zip(vb)
                        .all(|(ta, tb)| exprs_eq(ta, tb, ignore_case))
            }
            _ => false,
        }
    }
}

fn names_eq(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn exprs_eq(a: &[ExprRef], b: &[ExprRef], ignore_case: bool) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(ea, eb)| ea.structural_eq(eb, ignore_case))
}
