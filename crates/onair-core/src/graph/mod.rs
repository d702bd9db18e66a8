//! Keyframe dependency graph.
//!
//! One [`DependencyGraph`] holds every value of one template: a node per
//! `(flattened index, attribute tag)` key and edges recording which values a
//! computed node depends on.
//!
//! # Architecture
//!
//! ```text
//! relation builder ─┐
//!                   ├─► DependencyGraph ─► is_dag() ─► evaluate_dag() ─► [i32; N]
//! keyframe loader ──┘        (arena)
//! ```
//!
//! - **Store**: nodes and edges live in arenas sized before construction
//!   ([`DependencyGraph::new`]). Nothing is ever removed; a reload builds a new graph.
//! - **Registry**: nodes are found through a fixed slot array per flattened
//!   index ([`MAX_TAGS_PER_INDEX`] tags each).
//! - **Edges** name their target by key, so a dependency may be declared before
//!   its target exists. Unresolved targets are skipped at evaluation.
//! - **Cycle detection** ([`DependencyGraph::is_dag`]) gates evaluation.
//! - **Evaluation** ([`DependencyGraph::evaluate_dag`]) is an iterative post-order
//!   walk that caches one value per node.

mod cycle;
mod edge;
mod eval;
mod index;
mod node;
mod store;

pub use edge::EdgeId;
pub use index::{FlatIndex, GraphDims};
pub use node::{Aggregation, NodeId, NodeKind};
pub use store::{DependencyGraph, MAX_TAGS_PER_INDEX};
