//! Generic document tree.
//!
//! The external parser hands the core a tree of untyped nodes: objects,
//! arrays, named pairs, scalar literals, paths, cardinalities and expression
//! subtrees. Nodes live contiguously in a [`Document`] arena and refer to
//! their children by [`NodeId`]. Nothing stores a parent pointer; callers that
//! need upward navigation build a [`ParentMap`] on demand.

use std::fmt;

use crate::{BinaryOp, Pos, ScalarKind, UnaryOp};

/// Index into a [`Document`] arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Invalid node ID (sentinel value).
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Node variants of the generic tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// `Name { members }`, or an anonymous `{ members }` inside an array.
    Object {
        name: Option<String>,
        members: Vec<NodeId>,
    },
    /// `[elements]`
    Array { elements: Vec<NodeId> },
    /// `name: value`; a missing value is the boolean shorthand `name;`.
    Pair { name: String, value: Option<NodeId> },
    /// Literal with the lexical kind assigned by the tokenizer.
    Scalar { kind: ScalarKind, raw: String },
    /// Navigation path, kept as text.
    Path(String),
    /// `min..max`, `max == None` meaning unbounded.
    Cardinality { min: u64, max: Option<u64> },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Conditional {
        cond: NodeId,
        then: NodeId,
        otherwise: NodeId,
    },
    Call { name: String, args: Vec<NodeId> },
    Symbol(String),
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Object { members, .. } => members.clone(),
            NodeKind::Array { elements } => elements.clone(),
            NodeKind::Pair { value, .. } => value.iter().copied().collect(),
            NodeKind::Unary { operand, .. } => vec![*operand],
            NodeKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::Conditional {
                cond,
                then,
                otherwise,
            } => vec![*cond, *then, *otherwise],
            NodeKind::Call { args, .. } => args.clone(),
            NodeKind::Scalar { .. }
            | NodeKind::Path(_)
            | NodeKind::Cardinality { .. }
            | NodeKind::Symbol(_) => Vec::new(),
        }
    }

    /// Returns `true` for nodes the evaluator turns into a value.
    pub const fn is_value(&self) -> bool {
        !matches!(
            self,
            NodeKind::Object { .. } | NodeKind::Array { .. } | NodeKind::Pair { .. }
        )
    }

    /// Short description used in messages ("object", "pair", ...).
    pub const fn describe(&self) -> &'static str {
        match self {
            NodeKind::Object { .. } => "object",
            NodeKind::Array { .. } => "array",
            NodeKind::Pair { .. } => "pair",
            NodeKind::Scalar { .. } => "literal",
            NodeKind::Path(_) => "path",
            NodeKind::Cardinality { .. } => "cardinality",
            NodeKind::Unary { .. } | NodeKind::Binary { .. } | NodeKind::Conditional { .. } => {
                "expression"
            }
            NodeKind::Call { .. } => "function call",
            NodeKind::Symbol(_) => "symbol",
        }
    }
}

/// A positioned tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: Pos,
}

/// Contiguous storage for one parsed document.
///
/// Nodes are append-only: the parser allocates children before parents, so
/// a node's children always have smaller ids than the node itself.
#[derive(Clone, Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Document {
            nodes: Vec::with_capacity(nodes),
            root: None,
        }
    }

    /// Allocate a node, return its ID.
    ///
    /// # Panics
    /// Panics if the arena would exceed `u32::MAX` nodes.
    pub fn alloc(&mut self, kind: NodeKind, pos: Pos) -> NodeId {
        let index = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("document exceeds {} nodes", u32::MAX));
        self.nodes.push(Node { kind, pos });
        NodeId::new(index)
    }

    /// Get a node by ID.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn try_get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The designated root, or the last allocated node when none was set.
    pub fn root(&self) -> Option<NodeId> {
        self.root.or_else(|| {
            self.nodes
                .len()
                .checked_sub(1)
                .and_then(|last| u32::try_from(last).ok())
                .map(NodeId::new)
        })
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Iterate over `(id, node)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| u32::try_from(i).ok().map(|i| (NodeId::new(i), node)))
    }

    // ===== Builder helpers =====

    /// `name { members }`
    pub fn object(&mut self, name: &str, members: Vec<NodeId>, pos: Pos) -> NodeId {
        self.alloc(
            NodeKind::Object {
                name: Some(name.to_string()),
                members,
            },
            pos,
        )
    }

    /// `{ members }` without a name (array elements).
    pub fn anonymous_object(&mut self, members: Vec<NodeId>, pos: Pos) -> NodeId {
        self.alloc(
            NodeKind::Object {
                name: None,
                members,
            },
            pos,
        )
    }

    pub fn array(&mut self, elements: Vec<NodeId>, pos: Pos) -> NodeId {
        self.alloc(NodeKind::Array { elements }, pos)
    }

    /// `name: value`
    pub fn pair(&mut self, name: &str, value: NodeId, pos: Pos) -> NodeId {
        self.alloc(
            NodeKind::Pair {
                name: name.to_string(),
                value: Some(value),
            },
            pos,
        )
    }

    /// Boolean shorthand `name;`.
    pub fn flag(&mut self, name: &str, pos: Pos) -> NodeId {
        self.alloc(
            NodeKind::Pair {
                name: name.to_string(),
                value: None,
            },
            pos,
        )
    }

    pub fn scalar(&mut self, kind: ScalarKind, raw: &str, pos: Pos) -> NodeId {
        self.alloc(
            NodeKind::Scalar {
                kind,
                raw: raw.to_string(),
            },
            pos,
        )
    }

    pub fn path(&mut self, text: &str, pos: Pos) -> NodeId {
        self.alloc(NodeKind::Path(text.to_string()), pos)
    }

    pub fn cardinality(&mut self, min: u64, max: Option<u64>, pos: Pos) -> NodeId {
        self.alloc(NodeKind::Cardinality { min, max }, pos)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId, pos: Pos) -> NodeId {
        self.alloc(NodeKind::Unary { op, operand }, pos)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId, pos: Pos) -> NodeId {
        self.alloc(NodeKind::Binary { op, lhs, rhs }, pos)
    }

    pub fn conditional(
        &mut self,
        cond: NodeId,
        then: NodeId,
        otherwise: NodeId,
        pos: Pos,
    ) -> NodeId {
        self.alloc(
            NodeKind::Conditional {
                cond,
                then,
                otherwise,
            },
            pos,
        )
    }

    pub fn call(&mut self, name: &str, args: Vec<NodeId>, pos: Pos) -> NodeId {
        self.alloc(
            NodeKind::Call {
                name: name.to_string(),
                args,
            },
            pos,
        )
    }

    pub fn symbol(&mut self, name: &str, pos: Pos) -> NodeId {
        self.alloc(NodeKind::Symbol(name.to_string()), pos)
    }

    // ===== Queries =====

    /// Build the parent index for every node reachable in this document.
    pub fn parents(&self) -> ParentMap {
        let mut parents = vec![None; self.nodes.len()];
        for (id, node) in self.iter() {
            for child in node.kind.children() {
                if let Some(slot) = parents.get_mut(child.index()) {
                    *slot = Some(id);
                }
            }
        }
        ParentMap { parents }
    }

    /// Structural equality of two subtrees, ignoring positions.
    pub fn same_shape(&self, id: NodeId, other: &Document, other_id: NodeId) -> bool {
        let (Some(a), Some(b)) = (self.try_get(id), other.try_get(other_id)) else {
            return false;
        };
        let a_children = a.kind.children();
        let b_children = b.kind.children();
        let heads_match = match (&a.kind, &b.kind) {
            (NodeKind::Object { name: x, .. }, NodeKind::Object { name: y, .. }) => x == y,
            (NodeKind::Array { .. }, NodeKind::Array { .. }) => true,
            (NodeKind::Pair { name: x, .. }, NodeKind::Pair { name: y, .. }) => x == y,
            (NodeKind::Unary { op: x, .. }, NodeKind::Unary { op: y, .. }) => x == y,
            (NodeKind::Binary { op: x, .. }, NodeKind::Binary { op: y, .. }) => x == y,
            (NodeKind::Conditional { .. }, NodeKind::Conditional { .. }) => true,
            (NodeKind::Call { name: x, .. }, NodeKind::Call { name: y, .. }) => x == y,
            (x, y) => x == y,
        };
        heads_match
            && a_children.len() == b_children.len()
            && a_children
                .iter()
                .zip(&b_children)
                .all(|(x, y)| self.same_shape(*x, other, *y))
    }
}

/// Parent index computed by [`Document::parents`].
#[derive(Clone, Debug, Default)]
pub struct ParentMap {
    parents: Vec<Option<NodeId>>,
}

impl ParentMap {
    /// Parent of `id`, `None` for roots and unknown ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }
}

#[cfg(test)]
mod tests;
