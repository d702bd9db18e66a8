//! Acyclicity check.
//!
//! Depth-first search with three-colour marking. The marks live in a scratch
//! vector owned by one run, so the check never mutates the graph and can be
//! repeated freely.

use super::node::NodeId;
use super::store::DependencyGraph;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Undiscovered,
    Discovered,
    Visited,
}

impl DependencyGraph {
    /// Returns true when no node can reach itself through resolved edges.
    pub fn is_dag(&self) -> bool {
        self.find_cycle().is_none()
    }

    /// Returns a node lying on a dependency cycle, if any.
    ///
    /// Every node is visited once. Edges whose target is not registered are
    /// skipped, matching evaluation.
    pub fn find_cycle(&self) -> Option<NodeId> {
        let mut marks = vec![Mark::Undiscovered; self.nodes.len()];
        // (node, next outgoing edge to explore)
        let mut stack = Vec::new();

        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Undiscovered {
                continue;
            }
            let root = NodeId(root as u32);
            marks[root.slot()] = Mark::Discovered;
            stack.push((root, self.nodes[root.slot()].head));

            while let Some((node, cursor)) = stack.last_mut() {
                let node = *node;
                let Some(edge_id) = *cursor else {
                    marks[node.slot()] = Mark::Visited;
                    stack.pop();
                    continue;
                };
                let edge = &self.edges[edge_id.slot()];
                *cursor = edge.next;

                let Some(target) = self.resolve(edge) else {
                    continue;
                };
                match marks[target.slot()] {
                    Mark::Discovered => {
                        tracing::debug!("graph_cycle: back edge {node} -> {target}");
                        return Some(target);
                    }
                    Mark::Visited => {}
                    Mark::Undiscovered => {
                        marks[target.slot()] = Mark::Discovered;
                        stack.push((target, self.nodes[target.slot()].head));
                    }
                }
            }
        }
        None
    }
}
