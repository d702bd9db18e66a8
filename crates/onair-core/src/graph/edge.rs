//! Graph edge types for the keyframe dependency graph.
//!
//! An edge records that its owning node depends on the value at a target
//! `(flattened index, attribute tag)` key. The target is stored as a key rather
//! than a [`NodeId`](super::NodeId) because it may not exist yet when the edge
//! is created; it is resolved at evaluation time.

use core::fmt;

use crate::attr::Attr;

use super::index::FlatIndex;

/// Unique identifier for an edge in the dependency graph.
///
/// Edge IDs are arena positions: assigned sequentially, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
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

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// A dependency of one node on the value at another key.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge {
    /// Target flattened index.
    pub target_index: FlatIndex,
    /// Target attribute tag.
    pub target_attr: Attr,
    /// Contributes to the pad sum of a `MaxPlusPad` node instead of its max.
    pub pad: bool,
    /// Next edge of the same owner.
    pub next: Option<EdgeId>,
}
