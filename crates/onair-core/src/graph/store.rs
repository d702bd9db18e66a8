//! Dependency graph store and node/edge registry.
//!
//! [`DependencyGraph`] owns every node and edge of one template in two
//! preallocated arenas. Nodes are found through a small fixed slot array per
//! flattened index, keyed by attribute tag, so lookups never chase pointers and
//! insertion never reallocates. Exceeding any arena is a
//! [`GraphError::CapacityExceeded`]; the template is then rejected as a whole.
//!
//! There is no removal. A template reload discards the graph and builds a new one.

use crate::attr::Attr;
use crate::error::GraphError;

use super::edge::{Edge, EdgeId};
use super::index::{FlatIndex, GraphDims};
use super::node::{Aggregation, Node, NodeId, NodeKind};

/// Maximum number of distinct attribute tags one flattened index can hold.
///
/// Fixed-size slots keep the per-index table a flat array with no heap
/// allocation per index.
pub const MAX_TAGS_PER_INDEX: usize = 2;

#[derive(Clone, Copy, Debug, Default)]
struct IndexSlots {
    entries: [Option<(Attr, NodeId)>; MAX_TAGS_PER_INDEX],
}

impl IndexSlots {
    fn find(&self, attr: Attr) -> Option<NodeId> {
        self.entries
            .iter()
            .flatten()
            .find(|(tag, _)| *tag == attr)
            .map(|&(_, id)| id)
    }

    fn insert(&mut self, attr: Attr, id: NodeId) -> bool {
        match self.entries.iter_mut().find(|e| e.is_none()) {
            Some(free) => {
                *free = Some((attr, id));
                true
            }
            None => false,
        }
    }
}

/// Arena-backed dependency graph for one template.
///
/// # Usage
///
/// 1. Size it with [`new()`](Self::new) from the template's [`GraphDims`] and a
///    precomputed edge budget
/// 2. Register nodes: [`add_leaf()`](Self::add_leaf),
///    [`add_eval_node()`](Self::add_eval_node)
/// 3. Link them: [`add_edge()`](Self::add_edge)
/// 4. Check [`is_dag()`](Self::is_dag), then [`evaluate_dag()`](Self::evaluate_dag)
pub struct DependencyGraph {
    dims: GraphDims,
    slots: Vec<IndexSlots>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    node_capacity: usize,
    edge_capacity: usize,
}

impl DependencyGraph {
    /// Creates an empty graph with room for one node per flattened index and
    /// `edge_capacity` edges. Both arenas are allocated up front.
    pub fn new(dims: GraphDims, edge_capacity: usize) -> Self {
        let node_capacity = dims.node_count();
        Self {
            dims,
            slots: vec![IndexSlots::default(); node_capacity],
            nodes: Vec::with_capacity(node_capacity),
            edges: Vec::with_capacity(edge_capacity),
            node_capacity,
            edge_capacity,
        }
    }

    /// Returns the index space of this graph.
    #[inline]
    pub fn dims(&self) -> GraphDims {
        self.dims
    }

    /// Returns the number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges created, including edges dropped by a redefinition.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the node arena capacity.
    pub fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    /// Returns the edge arena capacity.
    pub fn edge_capacity(&self) -> usize {
        self.edge_capacity
    }

    // --- Lookup ---

    /// Finds the node stored under `(index, attr)`.
    pub fn get_node(&self, index: FlatIndex, attr: Attr) -> Option<NodeId> {
        self.slots.get(index.get())?.find(attr)
    }

    /// Returns the `(flattened index, attribute tag)` key of a node.
    pub fn node_key(&self, id: NodeId) -> Option<(FlatIndex, Attr)> {
        self.nodes.get(id.slot()).map(|n| (n.index, n.attr))
    }

    /// Returns the role of a node.
    pub fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id.slot()).map(|n| n.kind)
    }

    /// Returns the cached value of the node under `(index, attr)`.
    ///
    /// For eval nodes this is only meaningful after evaluation.
    pub fn value(&self, index: FlatIndex, attr: Attr) -> Option<i32> {
        self.get_node(index, attr)
            .map(|id| self.nodes[id.slot()].value)
    }

    /// Returns the number of live outgoing edges of a node.
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.edge_ids(id).count()
    }

    // --- Registry ---

    /// Inserts a leaf, or turns the existing node under the key into a leaf
    /// holding `value`.
    pub fn add_leaf(
        &mut self,
        index: FlatIndex,
        attr: Attr,
        value: i32,
    ) -> Result<NodeId, GraphError> {
        if self.get_node(index, attr).is_some() {
            return self.update_leaf(index, attr, value);
        }
        self.insert(index, attr, NodeKind::Leaf, value)
    }

    /// Replaces the value of the existing node under `(index, attr)`, making it a
    /// leaf. Any edges it owned are dropped.
    pub fn update_leaf(
        &mut self,
        index: FlatIndex,
        attr: Attr,
        value: i32,
    ) -> Result<NodeId, GraphError> {
        let id = self
            .get_node(index, attr)
            .ok_or(GraphError::MissingSource { index, attr })?;
        self.nodes[id.slot()].redefine(NodeKind::Leaf, value);
        Ok(id)
    }

    /// Inserts a node computed from its edges. An existing node under the key
    /// is redefined with the new aggregation and no edges.
    pub fn add_eval_node(
        &mut self,
        index: FlatIndex,
        attr: Attr,
        aggregation: Aggregation,
    ) -> Result<NodeId, GraphError> {
        if let Some(id) = self.get_node(index, attr) {
            self.nodes[id.slot()].redefine(NodeKind::Eval(aggregation), 0);
            return Ok(id);
        }
        self.insert(index, attr, NodeKind::Eval(aggregation), 0)
    }

    /// Adds a dependency of `(from_index, from_attr)` on `(to_index, to_attr)`.
    ///
    /// The source must already exist; the target may be registered later.
    /// `pad` only matters when the source aggregates with
    /// [`Aggregation::MaxPlusPad`].
    pub fn add_edge(
        &mut self,
        from_index: FlatIndex,
        from_attr: Attr,
        to_index: FlatIndex,
        to_attr: Attr,
        pad: bool,
    ) -> Result<EdgeId, GraphError> {
        let from = self
            .get_node(from_index, from_attr)
            .ok_or(GraphError::MissingSource {
                index: from_index,
                attr: from_attr,
            })?;

        if self.edges.len() >= self.edge_capacity {
            return Err(GraphError::CapacityExceeded {
                what: "edge",
                needed: self.edges.len() + 1,
                capacity: self.edge_capacity,
            });
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            target_index: to_index,
            target_attr: to_attr,
            pad,
            next: None,
        });

        let node = &mut self.nodes[from.slot()];
        match node.tail {
            Some(tail) => self.edges[tail.slot()].next = Some(edge_id),
            None => node.head = Some(edge_id),
        }
        node.tail = Some(edge_id);
        tracing::trace!(
            "graph_connect: {from_attr}{from_index} -> {to_attr}{to_index}{}",
            if pad { " (pad)" } else { "" }
        );
        Ok(edge_id)
    }

    /// Applies the expand self-max rule to the node under `(index, attr)`.
    ///
    /// `prior` is the value the key held before the keyframe replaced it. The
    /// node becomes `max(prior, its own value or contributors) + pad`:
    ///
    /// - a leaf takes `max(value, prior)` as its floor,
    /// - a `single_value`/`max` node becomes `max_plus_pad` over the same
    ///   edges with `prior` as the floor,
    /// - a `max_plus_pad` node raises its floor to at least `prior`.
    ///
    /// `min` and `sum` nodes cannot be clamped and are rejected.
    pub fn set_floor(
        &mut self,
        index: FlatIndex,
        attr: Attr,
        prior: i32,
    ) -> Result<NodeId, GraphError> {
        let id = self
            .get_node(index, attr)
            .ok_or(GraphError::MissingSource { index, attr })?;
        let node = &mut self.nodes[id.slot()];
        match node.kind {
            NodeKind::Leaf => {
                node.floor = Some(node.value.max(prior));
                node.kind = NodeKind::Eval(Aggregation::MaxPlusPad);
            }
            NodeKind::Eval(Aggregation::SingleValue | Aggregation::Max) => {
                node.floor = Some(prior);
                node.kind = NodeKind::Eval(Aggregation::MaxPlusPad);
            }
            NodeKind::Eval(Aggregation::MaxPlusPad) => {
                node.floor = Some(node.floor.map_or(prior, |f| f.max(prior)));
            }
            NodeKind::Eval(other @ (Aggregation::Min | Aggregation::Sum)) => {
                return Err(GraphError::InvalidTemplate(format!(
                    "cannot expand {other} node {attr} at index {index}"
                )));
            }
        }
        node.evaluated = false;
        Ok(id)
    }

    // --- Internal helpers ---

    fn insert(
        &mut self,
        index: FlatIndex,
        attr: Attr,
        kind: NodeKind,
        value: i32,
    ) -> Result<NodeId, GraphError> {
        if index.get() >= self.slots.len() {
            return Err(GraphError::CapacityExceeded {
                what: "index",
                needed: index.get() + 1,
                capacity: self.slots.len(),
            });
        }
        if self.nodes.len() >= self.node_capacity {
            return Err(GraphError::CapacityExceeded {
                what: "node",
                needed: self.nodes.len() + 1,
                capacity: self.node_capacity,
            });
        }

        let id = NodeId(self.nodes.len() as u32);
        if !self.slots[index.get()].insert(attr, id) {
            return Err(GraphError::CapacityExceeded {
                what: "index slot",
                needed: MAX_TAGS_PER_INDEX + 1,
                capacity: MAX_TAGS_PER_INDEX,
            });
        }
        self.nodes.push(Node::new(index, attr, kind, value));
        Ok(id)
    }

    /// Iterates the live outgoing edge ids of a node.
    pub(crate) fn edge_ids(&self, id: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let mut cursor = self.nodes.get(id.slot()).and_then(|n| n.head);
        core::iter::from_fn(move || {
            let current = cursor?;
            cursor = self.edges[current.slot()].next;
            Some(current)
        })
    }

    /// Resolves an edge's target key to a node, if one has been registered.
    #[inline]
    pub(crate) fn resolve(&self, edge: &Edge) -> Option<NodeId> {
        self.get_node(edge.target_index, edge.target_attr)
    }

    // --- Diagnostics ---

    /// Renders the graph in Graphviz DOT format.
    ///
    /// Nodes are labelled `g<geo>.<attr>@<frame>`; eval nodes show their
    /// aggregation, pad edges are dashed, and unresolved targets point at a
    /// red placeholder.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph keyframes {\n  rankdir=LR;\n");
        let label = |index: FlatIndex, attr: Attr| {
            let (geo, _, frame) = self.dims.coords(index);
            format!("g{geo}.{attr}@{frame}")
        };

        for (i, node) in self.nodes.iter().enumerate() {
            let name = label(node.index, node.attr);
            match node.kind {
                NodeKind::Leaf => {
                    out.push_str(&format!(
                        "  n{i} [label=\"{name}\\n= {}\" shape=box];\n",
                        node.value
                    ));
                }
                NodeKind::Eval(agg) => {
                    let floor = node
                        .floor
                        .map(|f| format!(" floor {f}"))
                        .unwrap_or_default();
                    out.push_str(&format!("  n{i} [label=\"{name}\\n{agg}{floor}\"];\n"));
                }
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            for edge_id in self.edge_ids(NodeId(i as u32)) {
                let edge = &self.edges[edge_id.slot()];
                let style = if edge.pad { " [style=dashed]" } else { "" };
                match self.resolve(edge) {
                    Some(target) => {
                        out.push_str(&format!("  n{i} -> n{}{style};\n", target.0));
                    }
                    None => {
                        let missing = format!("missing_{}_{}", edge.target_index.0, edge.target_attr);
                        out.push_str(&format!(
                            "  {missing} [label=\"{}\" color=red];\n  n{i} -> {missing}{style};\n",
                            label(edge.target_index, edge.target_attr)
                        ));
                    }
                }
            }
        }

        out.push_str("}\n");
        out
    }
}
