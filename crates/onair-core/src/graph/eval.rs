//! Memoized evaluation of the dependency graph.
//!
//! Evaluation is an explicit post-order worklist rather than recursion, so a
//! deep chain of bindings cannot exhaust the stack. Each node is computed once
//! per [`evaluate_dag()`](DependencyGraph::evaluate_dag) run and its value
//! cached on the node.

use crate::error::GraphError;

use super::edge::Edge;
use super::node::{Aggregation, NodeId, NodeKind};
use super::store::DependencyGraph;

impl DependencyGraph {
    /// Evaluates one node, evaluating everything it depends on first.
    ///
    /// Leaves and already-evaluated nodes return their cached value. Edges whose
    /// target was never registered are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`GraphError::CycleDetected`] if the node depends on itself. The
    ///   acyclicity check normally rejects such graphs before evaluation.
    /// - [`GraphError::AggregationArity`] if an aggregation has the wrong number
    ///   of resolved contributors.
    pub fn evaluate(&mut self, id: NodeId) -> Result<i32, GraphError> {
        if self.nodes[id.slot()].is_settled() {
            return Ok(self.nodes[id.slot()].value);
        }

        let result = self.evaluate_from(id);
        if result.is_err() {
            for node in &mut self.nodes {
                node.on_path = false;
            }
        }
        result
    }

    fn evaluate_from(&mut self, id: NodeId) -> Result<i32, GraphError> {
        let mut stack = vec![(id, false)];

        while let Some((current, expanded)) = stack.pop() {
            let node = &self.nodes[current.slot()];
            if node.is_settled() {
                continue;
            }

            if expanded {
                let value = self.combine(current)?;
                let node = &mut self.nodes[current.slot()];
                node.value = value;
                node.evaluated = true;
                node.on_path = false;
                continue;
            }

            if node.on_path {
                return Err(self.cycle_at(current));
            }
            self.nodes[current.slot()].on_path = true;
            stack.push((current, true));

            for edge_id in self.edge_ids(current) {
                let Some(target) = self.resolve(&self.edges[edge_id.slot()]) else {
                    continue;
                };
                let target_node = &self.nodes[target.slot()];
                if target_node.on_path {
                    return Err(self.cycle_at(target));
                }
                if !target_node.is_settled() {
                    stack.push((target, false));
                }
            }
        }

        Ok(self.nodes[id.slot()].value)
    }

    /// Combines the cached values of a node's resolved contributors.
    fn combine(&self, id: NodeId) -> Result<i32, GraphError> {
        let node = &self.nodes[id.slot()];
        let NodeKind::Eval(aggregation) = node.kind else {
            return Ok(node.value);
        };

        let mut found = 0usize;
        let mut single = 0i32;
        let mut min = i32::MAX;
        let mut max = i32::MIN;
        let mut sum = 0i32;
        let mut non_pad: Option<i32> = node.floor;
        let mut pad = 0i32;

        for edge_id in self.edge_ids(id) {
            let edge = &self.edges[edge_id.slot()];
            let Some(target) = self.resolve(edge) else {
                self.warn_unresolved(id, edge);
                continue;
            };
            let value = self.nodes[target.slot()].value;
            found += 1;
            single = value;
            min = min.min(value);
            max = max.max(value);
            sum = sum.saturating_add(value);
            if edge.pad {
                pad = pad.saturating_add(value);
            } else {
                non_pad = Some(non_pad.map_or(value, |m| m.max(value)));
            }
        }

        let arity = |expected: &'static str| GraphError::AggregationArity {
            index: node.index,
            attr: node.attr,
            aggregation,
            expected,
            found,
        };

        match aggregation {
            Aggregation::SingleValue if found == 1 => Ok(single),
            Aggregation::SingleValue => Err(arity("exactly one value")),
            Aggregation::Min | Aggregation::Max if found == 0 => Err(arity("at least one value")),
            Aggregation::Min => Ok(min),
            Aggregation::Max => Ok(max),
            Aggregation::MaxPlusPad => non_pad
                .map(|m| m.saturating_add(pad))
                .ok_or_else(|| arity("a non-pad value or a floor")),
            Aggregation::Sum => Ok(sum),
        }
    }

    fn warn_unresolved(&self, owner: NodeId, edge: &Edge) {
        let node = &self.nodes[owner.slot()];
        let (geo, _, frame) = self.dims().coords(node.index);
        let (target_geo, _, target_frame) = self.dims().coords(edge.target_index);
        tracing::warn!(
            "graph_eval: geometry {geo} {} @{frame} depends on missing geometry {target_geo} {} @{target_frame}, skipped",
            node.attr,
            edge.target_attr
        );
    }

    fn cycle_at(&self, id: NodeId) -> GraphError {
        let node = &self.nodes[id.slot()];
        GraphError::CycleDetected {
            index: node.index,
            attr: node.attr,
        }
    }

    /// Evaluates every node and returns the flat value array.
    ///
    /// The array has one entry per flattened index; indices without a node hold
    /// 0. When an index holds several tags, the node whose tag matches the
    /// attribute encoded in the index supplies the value. Calling this again
    /// recomputes every eval node and yields the same array.
    pub fn evaluate_dag(&mut self) -> Result<Vec<i32>, GraphError> {
        for node in &mut self.nodes {
            node.on_path = false;
            if matches!(node.kind, NodeKind::Eval(_)) {
                node.evaluated = false;
            }
        }

        for slot in 0..self.nodes.len() {
            self.evaluate(NodeId(slot as u32))?;
        }

        let dims = self.dims();
        let mut values = vec![0; dims.node_count()];
        for canonical in [false, true] {
            for node in &self.nodes {
                if (dims.attr_of(node.index) == node.attr) == canonical {
                    values[node.index.get()] = node.value;
                }
            }
        }

        tracing::debug!(
            "graph_eval: {} nodes, {} edges, {} values",
            self.nodes.len(),
            self.edges.len(),
            values.len()
        );
        Ok(values)
    }
}
