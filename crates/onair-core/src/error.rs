//! Error types for graph construction, evaluation, and template loading.

use crate::attr::Attr;
use crate::graph::{Aggregation, FlatIndex};
use crate::template::{GeoId, TemplateId};

/// Errors that abort construction or evaluation of one dependency graph.
///
/// Recoverable conditions (unresolved dependencies, keyframes on unsupported
/// attributes) are logged as warnings and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A preallocated arena is full, or the template needs more than the engine allows.
    #[error("{what} capacity exceeded: need {needed}, capacity {capacity}")]
    CapacityExceeded {
        /// Which arena overflowed ("node", "edge", "index slot").
        what: &'static str,
        /// Requested size.
        needed: usize,
        /// Available size.
        capacity: usize,
    },

    /// An edge was added from a node that does not exist.
    #[error("edge source {attr} at index {index} does not exist")]
    MissingSource {
        /// Flattened index of the absent source.
        index: FlatIndex,
        /// Attribute tag of the absent source.
        attr: Attr,
    },

    /// The dependency graph is not acyclic.
    #[error("dependency cycle through {attr} at index {index}")]
    CycleDetected {
        /// Flattened index of a node on the cycle.
        index: FlatIndex,
        /// Attribute tag of that node.
        attr: Attr,
    },

    /// An aggregation received the wrong number of resolved contributors.
    #[error("{aggregation} node {attr} at index {index} expects {expected}, found {found}")]
    AggregationArity {
        /// Flattened index of the failing node.
        index: FlatIndex,
        /// Attribute tag of the failing node.
        attr: Attr,
        /// The node's aggregation.
        aggregation: Aggregation,
        /// Human-readable requirement.
        expected: &'static str,
        /// Resolved contributors found.
        found: usize,
    },

    /// A coordinate lies outside the template's geometry or frame range.
    #[error(
        "geometry {geo} {attr} frame {frame} is outside the template \
         ({geometries} geometries, {frames} frames)"
    )]
    OutOfRange {
        /// Requested geometry.
        geo: GeoId,
        /// Requested attribute.
        attr: Attr,
        /// Requested frame.
        frame: usize,
        /// Geometry count of the template.
        geometries: usize,
        /// Frame count of the template.
        frames: usize,
    },

    /// A geometry names a parent that does not exist (or itself).
    #[error("geometry {geo} declares invalid parent {parent}")]
    InvalidParent {
        /// The child geometry.
        geo: GeoId,
        /// The declared parent.
        parent: GeoId,
    },

    /// The template is structurally malformed.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
}

/// A [`GraphError`] scoped to the template whose load it aborted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("template {template} rejected: {source}")]
pub struct TemplateError {
    /// The template that failed to load.
    pub template: TemplateId,
    /// The underlying failure.
    #[source]
    pub source: GraphError,
}

impl TemplateError {
    /// Returns the underlying graph error.
    pub fn kind(&self) -> &GraphError {
        &self.source
    }
}
