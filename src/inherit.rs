//! Copy-on-write inheritance over hierarchical result trees.
//!
//! Large matrix/tree results are produced once per query execution, then
//! overlaid per update with per-view overrides. An overlay clones only
//! the nodes on the path to a change -- everything deeper is shared by
//! reference -- so repeated "override the top N levels" operations never
//! copy the full tree. Shared subtrees are safe to hold from several
//! readers at once because nothing already shared is ever mutated in
//! place: changes propagate by replacing handles upward from the change
//! point.

use std::sync::Arc;

use crate::value::Value;

/// One node of a hierarchical (matrix/tree) result.
///
/// `level: None` is the root sentinel; it is always eligible for cloning
/// regardless of the requested depth. A leaf has no children.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixNode {
    pub level: Option<u32>,
    pub value: Option<Value>,
    pub children: Vec<Arc<MatrixNode>>,
    /// Marks a node produced by an overlay clone
    pub inherited: bool,
}

impl MatrixNode {
    /// Root node (level sentinel) over the given children.
    pub fn root(children: Vec<Arc<MatrixNode>>) -> Arc<Self> {
        Arc::new(MatrixNode {
            level: None,
            value: None,
            children,
            inherited: false,
        })
    }

    /// Node at a concrete level.
    pub fn new(level: u32, value: Option<Value>) -> Self {
        MatrixNode {
            level: Some(level),
            value,
            children: Vec::new(),
            inherited: false,
        }
    }

    pub fn with_children(mut self, children: Vec<Arc<MatrixNode>>) -> Self {
        self.children = children;
        self
    }

    pub fn into_ref(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth used against `deepest_level`; the root sentinel sits above
    /// level zero.
    fn depth(&self) -> i64 {
        self.level.map(i64::from).unwrap_or(-1)
    }
}

/// Shallow-clones one node with the `inherited` mark. In `strict` mode a
/// node that is already an overlay clone is reused instead of re-cloned.
pub fn inherit_single(node: &Arc<MatrixNode>, strict: bool) -> Arc<MatrixNode> {
    if strict && node.inherited {
        return Arc::clone(node);
    }
    Arc::new(MatrixNode {
        inherited: true,
        ..(**node).clone()
    })
}

/// Prepares the top of a hierarchy for per-view overrides.
///
/// A node whose level exceeds `deepest_level` comes back as the same
/// handle, its whole subtree shared. Every shallower node (the root
/// sentinel included) is shallow-cloned with a rebuilt child list, each
/// child processed the same way -- so recursion stops exactly past
/// `deepest_level`, and a node *at* that level is cloned while its
/// children keep their original handles.
///
/// `strict` skips re-cloning nodes already produced by an earlier
/// overlay whose children all came back unchanged, so layering overlays
/// repeatedly does not stack redundant clone chains.
///
/// # Examples
///
/// For a tree with levels 0..=2 below the root, overriding through level
/// 1 shares every level-2 node:
///
/// ```
/// use trellis::inherit::{MatrixNode, inherit_matrix_node_hierarchy};
/// use std::sync::Arc;
///
/// let leaf = MatrixNode::new(2, None).into_ref();
/// let mid = MatrixNode::new(1, None)
///     .with_children(vec![Arc::clone(&leaf)])
///     .into_ref();
/// let top = MatrixNode::new(0, None)
///     .with_children(vec![mid])
///     .into_ref();
/// let root = MatrixNode::root(vec![top]);
///
/// let overlay = inherit_matrix_node_hierarchy(&root, 1, false);
/// assert!(!Arc::ptr_eq(&overlay, &root));
/// let overlay_leaf = &overlay.children[0].children[0].children[0];
/// assert!(Arc::ptr_eq(overlay_leaf, &leaf));
/// ```
pub fn inherit_matrix_node_hierarchy(
    node: &Arc<MatrixNode>,
    deepest_level: u32,
    strict: bool,
) -> Arc<MatrixNode> {
    if node.depth() > i64::from(deepest_level) {
        return Arc::clone(node);
    }
    let children: Vec<Arc<MatrixNode>> = node
        .children
        .iter()
        .map(|child| inherit_matrix_node_hierarchy(child, deepest_level, strict))
        .collect();
    if strict
        && node.inherited
        && children
            .iter()
            .zip(&node.children)
            .all(|(a, b)| Arc::ptr_eq(a, b))
    {
        return Arc::clone(node);
    }
    Arc::new(MatrixNode {
        level: node.level,
        value: node.value.clone(),
        children,
        inherited: true,
    })
}
