//! Graph node types for the keyframe dependency graph.
//!
//! Each node holds one value for one `(flattened index, attribute tag)` key.
//! Leaves carry authored values; evaluated nodes combine the values of the
//! nodes their edges point at according to an [`Aggregation`].

use core::fmt;

use crate::attr::Attr;

use super::edge::EdgeId;
use super::index::FlatIndex;

/// Unique identifier for a node in the dependency graph.
///
/// Node IDs are arena positions: assigned sequentially, never reused within a
/// graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// How an evaluated node combines its resolved contributors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// Exactly one contributor; its value passes through.
    SingleValue,
    /// Smallest contributor. At least one required.
    Min,
    /// Largest contributor. At least one required.
    Max,
    /// `max(non-pad contributors, floor) + sum(pad contributors)`.
    ///
    /// Needs at least one non-pad contributor or a floor.
    MaxPlusPad,
    /// Sum of contributors; zero contributors sum to 0.
    Sum,
}

impl Aggregation {
    /// Returns the lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Aggregation::SingleValue => "single_value",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::MaxPlusPad => "max_plus_pad",
            Aggregation::Sum => "sum",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The role of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Authored value with no dependencies.
    Leaf,
    /// Value computed from the node's edges.
    Eval(Aggregation),
}

/// Internal bookkeeping for a node in the graph.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    /// Flattened index this node belongs to.
    pub index: FlatIndex,
    /// Attribute tag; together with `index` the node's key.
    pub attr: Attr,
    pub kind: NodeKind,
    /// Cached value. Authored for leaves, computed for eval nodes.
    pub value: i32,
    /// Prior value that a `MaxPlusPad` node never drops below (expand rule).
    pub floor: Option<i32>,
    pub evaluated: bool,
    /// Set while the evaluator has this node on its current path.
    pub on_path: bool,
    /// First outgoing edge; edges form a singly linked list through the arena.
    pub head: Option<EdgeId>,
    /// Last outgoing edge, for O(1) append.
    pub tail: Option<EdgeId>,
}

impl Node {
    /// Creates a node with no edges.
    pub fn new(index: FlatIndex, attr: Attr, kind: NodeKind, value: i32) -> Self {
        Self {
            index,
            attr,
            kind,
            value,
            floor: None,
            evaluated: false,
            on_path: false,
            head: None,
            tail: None,
        }
    }

    /// Returns true when the cached value is final.
    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf) || self.evaluated
    }

    /// Redefines the node, dropping its edges. Dropped edges stay in the arena.
    pub fn redefine(&mut self, kind: NodeKind, value: i32) {
        self.kind = kind;
        self.value = value;
        self.floor = None;
        self.evaluated = false;
        self.head = None;
        self.tail = None;
    }
}
