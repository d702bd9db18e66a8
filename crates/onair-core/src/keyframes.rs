//! Keyframe loading.
//!
//! Turns the three keyframe lists of a template into graph nodes, applied in
//! order `user`, `set`, `bind`. A later declaration on the same
//! `(geometry, attribute, frame)` replaces an earlier one.
//!
//! | Kind   | Node                                               |
//! |--------|----------------------------------------------------|
//! | `user` | leaf holding the geometry's live value at load time |
//! | `set`  | leaf holding the literal value                     |
//! | `bind` | `single_value` node with one edge to the target    |
//!
//! An expanding keyframe never shrinks its key below the value it held before
//! the keyframe was applied, and pushes a width or height change down to the layout bounds of the
//! geometry's children.

use crate::attr::Attr;
use crate::error::GraphError;
use crate::graph::{Aggregation, DependencyGraph, FlatIndex, NodeKind};
use crate::template::{GeoId, KeyframeDecl, KeyframeKind, TemplateDecl};

/// The set of `(geometry, attribute)` pairs touched by at least one keyframe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedSet {
    marks: Vec<bool>,
    len: usize,
}

impl TrackedSet {
    /// Creates an empty set for `geometries` geometries.
    pub fn new(geometries: usize) -> Self {
        Self {
            marks: vec![false; geometries * Attr::COUNT],
            len: 0,
        }
    }

    /// Marks a pair as tracked. Out-of-range geometries are ignored.
    pub fn mark(&mut self, geo: GeoId, attr: Attr) {
        if let Some(slot) = self.marks.get_mut(geo * Attr::COUNT + attr.index())
            && !*slot
        {
            *slot = true;
            self.len += 1;
        }
    }

    /// Returns true if the pair is tracked.
    pub fn contains(&self, geo: GeoId, attr: Attr) -> bool {
        self.marks
            .get(geo * Attr::COUNT + attr.index())
            .copied()
            .unwrap_or(false)
    }

    /// Number of tracked pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates tracked pairs in `(geometry, attribute)` order.
    pub fn iter(&self) -> impl Iterator<Item = (GeoId, Attr)> + '_ {
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, marked)| **marked)
            .map(|(slot, _)| (slot / Attr::COUNT, Attr::ALL[slot % Attr::COUNT]))
    }
}

/// Outcome of loading one template's keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Declarations turned into nodes.
    pub applied: usize,
    /// Declarations dropped for targeting an attribute the geometry lacks.
    pub dropped: usize,
    /// Applied declarations that expand.
    pub expanded: usize,
}

/// Applies every keyframe of `template` to `graph`, marking touched pairs in
/// `tracked`.
///
/// The layout relations must already be built: expand edges start at the
/// children's bound nodes.
///
/// # Errors
///
/// A keyframe or bind target outside the template's geometries or frames is
/// [`GraphError::OutOfRange`]. Graph capacity errors propagate unchanged.
pub fn load_keyframes(
    graph: &mut DependencyGraph,
    template: &TemplateDecl,
    tracked: &mut TrackedSet,
) -> Result<LoadSummary, GraphError> {
    let dims = graph.dims();
    let mut summary = LoadSummary::default();

    for keyframe in template.keyframes() {
        let index = dims.index(keyframe.geo, keyframe.attr, keyframe.frame)?;
        let geometry = &template.geometries[keyframe.geo];

        if !geometry.kind.is_keyframable(keyframe.attr) {
            tracing::warn!(
                "keyframe_load: {} keyframe on geometry {} ({}) targets unsupported attribute {}, dropped",
                keyframe.kind.name(),
                keyframe.geo,
                geometry.kind,
                keyframe.attr
            );
            summary.dropped += 1;
            continue;
        }

        // The key already holds the relation leaf or an earlier keyframe.
        let prior = prior_value(graph, index, keyframe.attr)
            .unwrap_or_else(|| geometry.value_at(keyframe.frame, keyframe.attr));

        match keyframe.kind {
            KeyframeKind::User => {
                graph.add_leaf(index, keyframe.attr, geometry.live.get(keyframe.attr))?;
            }
            KeyframeKind::Set { value } => {
                graph.add_leaf(index, keyframe.attr, value)?;
            }
            KeyframeKind::Bind { target } => {
                let target_index = dims.index(target.geo, target.attr, target.frame)?;
                graph.add_eval_node(index, keyframe.attr, Aggregation::SingleValue)?;
                graph.add_edge(index, keyframe.attr, target_index, target.attr, false)?;
            }
        }
        tracked.mark(keyframe.geo, keyframe.attr);
        summary.applied += 1;

        if keyframe.expand {
            expand(graph, template, keyframe, index, prior)?;
            summary.expanded += 1;
        }
    }

    tracing::debug!(
        "keyframe_load: {} applied, {} dropped, {} expanding",
        summary.applied,
        summary.dropped,
        summary.expanded
    );
    Ok(summary)
}

/// Returns the bound attribute an expanding keyframe on `attr` propagates to.
pub fn expand_bound(attr: Attr) -> Option<Attr> {
    match attr {
        Attr::Width => Some(Attr::UpperX),
        Attr::Height => Some(Attr::UpperY),
        _ => None,
    }
}

/// The value of a leaf under the key. Evaluated nodes have no value yet.
fn prior_value(graph: &DependencyGraph, index: FlatIndex, attr: Attr) -> Option<i32> {
    let id = graph.get_node(index, attr)?;
    match graph.node_kind(id)? {
        NodeKind::Leaf => graph.value(index, attr),
        NodeKind::Eval(_) => None,
    }
}

fn expand(
    graph: &mut DependencyGraph,
    template: &TemplateDecl,
    keyframe: &KeyframeDecl,
    index: FlatIndex,
    prior: i32,
) -> Result<(), GraphError> {
    graph.set_floor(index, keyframe.attr, prior)?;

    let Some(bound) = expand_bound(keyframe.attr) else {
        return Ok(());
    };
    let dims = graph.dims();
    for child in template.children_of(keyframe.geo) {
        let child_bound = dims.index(child, bound, keyframe.frame)?;
        graph.add_edge(child_bound, bound, index, keyframe.attr, false)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::GeometryKind;
    use crate::graph::GraphDims;
    use crate::relations::{EDGES_PER_GEOMETRY_FRAME, build_relations};
    use crate::template::{AttrRef, GeometryDecl, PageSize, TemplateId};

    fn load(template: &TemplateDecl) -> Result<(Vec<i32>, TrackedSet, LoadSummary), GraphError> {
        let dims = GraphDims::new(template.geometries.len(), template.max_keyframe);
        let capacity = template.geometries.len() * template.max_keyframe * EDGES_PER_GEOMETRY_FRAME + 16;
        let mut graph = DependencyGraph::new(dims, capacity);
        build_relations(&mut graph, template, PageSize::default())?;
        let mut tracked = TrackedSet::new(template.geometries.len());
        let summary = load_keyframes(&mut graph, template, &mut tracked)?;
        Ok((graph.evaluate_dag()?, tracked, summary))
    }

    fn value(t: &TemplateDecl, values: &[i32], geo: GeoId, attr: Attr, frame: usize) -> i32 {
        let dims = GraphDims::new(t.geometries.len(), t.max_keyframe);
        values[dims.index(geo, attr, frame).unwrap().get()]
    }

    fn boxed(max_keyframe: usize) -> TemplateDecl {
        TemplateDecl::new(TemplateId(3), max_keyframe).with_geometry(
            GeometryDecl::new(1, GeometryKind::Rectangle)
                .with_live(Attr::Width, 80)
                .with_live(Attr::Opacity, 128),
        )
    }

    #[test]
    fn test_tracked_set_marks_once() {
        let mut set = TrackedSet::new(2);
        set.mark(1, Attr::Width);
        set.mark(1, Attr::Width);
        set.mark(5, Attr::Width);
        assert_eq!(set.len(), 1);
        assert!(set.contains(1, Attr::Width));
        assert!(!set.contains(0, Attr::Width));
        assert_eq!(set.iter().collect::<Vec<_>>(), [(1, Attr::Width)]);
    }

    #[test]
    fn test_user_snapshots_live_value() {
        let t = boxed(2)
            .with_geometry(GeometryDecl::new(2, GeometryKind::Text))
            .with_keyframe(KeyframeDecl::user(1, Attr::Opacity, 1));
        let (v, tracked, _) = load(&t).unwrap();
        assert_eq!(value(&t, &v, 1, Attr::Opacity, 1), 128);
        assert!(tracked.contains(1, Attr::Opacity));
    }

    #[test]
    fn test_set_replaces_user() {
        let t = boxed(2)
            .with_keyframe(KeyframeDecl::set(1, Attr::Opacity, 0, 7))
            .with_keyframe(KeyframeDecl::user(1, Attr::Opacity, 0));
        let (v, _, summary) = load(&t).unwrap();
        assert_eq!(value(&t, &v, 1, Attr::Opacity, 0), 7);
        assert_eq!(summary.applied, 2);
    }

    #[test]
    fn test_bind_follows_target() {
        let t = boxed(2)
            .with_keyframe(KeyframeDecl::set(1, Attr::Width, 0, 640))
            .with_keyframe(KeyframeDecl::bind(
                1,
                Attr::Width,
                1,
                AttrRef::new(1, Attr::Width, 0),
            ));
        let (v, _, _) = load(&t).unwrap();
        assert_eq!(value(&t, &v, 1, Attr::Width, 1), 640);
        assert_eq!(value(&t, &v, 1, Attr::UpperX, 1), 640);
    }

    #[test]
    fn test_bind_to_missing_geometry_is_fatal() {
        let t = boxed(2).with_keyframe(KeyframeDecl::bind(
            1,
            Attr::Width,
            1,
            AttrRef::new(9, Attr::Width, 0),
        ));
        assert!(matches!(
            load(&t),
            Err(GraphError::OutOfRange { geo: 9, .. })
        ));
    }

    #[test]
    fn test_keyframe_frame_out_of_range_is_fatal() {
        let t = boxed(2).with_keyframe(KeyframeDecl::set(1, Attr::Width, 2, 1));
        assert!(matches!(
            load(&t),
            Err(GraphError::OutOfRange { frame: 2, .. })
        ));
    }

    #[test]
    fn test_unsupported_attribute_dropped() {
        let t = boxed(1)
            .with_keyframe(KeyframeDecl::set(1, Attr::FontSize, 0, 40))
            .with_keyframe(KeyframeDecl::set(1, Attr::PosX, 0, 40));
        let (_, tracked, summary) = load(&t).unwrap();
        assert_eq!(summary.dropped, 2);
        assert!(tracked.is_empty());
    }

    #[test]
    fn test_expand_raises_child_bound() {
        let t = boxed(2)
            .with_geometry(
                GeometryDecl::new(2, GeometryKind::Text)
                    .with_parent(1)
                    .with_live(Attr::Width, 120),
            )
            .with_keyframe(KeyframeDecl::set(1, Attr::Width, 1, 300).expanding());
        let (v, _, summary) = load(&t).unwrap();
        assert_eq!(summary.expanded, 1);
        assert_eq!(value(&t, &v, 2, Attr::UpperX, 0), 120);
        assert_eq!(value(&t, &v, 2, Attr::UpperX, 1), 300);
        assert_eq!(value(&t, &v, 1, Attr::Width, 1), 300);
    }

    #[test]
    fn test_expand_never_shrinks_authored_size() {
        let t = TemplateDecl::new(TemplateId(4), 2).with_geometry(
            GeometryDecl::new(1, GeometryKind::Rectangle).with_live(Attr::Width, 200),
        );
        let shrink = t
            .clone()
            .with_keyframe(KeyframeDecl::set(1, Attr::Width, 1, 100).expanding());
        let (v, _, _) = load(&shrink).unwrap();
        assert_eq!(value(&shrink, &v, 1, Attr::Width, 1), 200);

        let plain = t.with_keyframe(KeyframeDecl::set(1, Attr::Width, 1, 100));
        let (v, _, _) = load(&plain).unwrap();
        assert_eq!(value(&plain, &v, 1, Attr::Width, 1), 100);
    }

    #[test]
    fn test_expanding_bind_clamped_to_prior_value() {
        let t = boxed(2)
            .with_keyframe(KeyframeDecl::set(1, Attr::Height, 0, 10))
            .with_keyframe(
                KeyframeDecl::bind(1, Attr::Width, 1, AttrRef::new(1, Attr::Height, 0)).expanding(),
            );
        let (v, _, _) = load(&t).unwrap();
        assert_eq!(value(&t, &v, 1, Attr::Width, 1), 80);
    }

    #[test]
    fn test_expand_bound_axes() {
        assert_eq!(expand_bound(Attr::Width), Some(Attr::UpperX));
        assert_eq!(expand_bound(Attr::Height), Some(Attr::UpperY));
        assert_eq!(expand_bound(Attr::Opacity), None);
    }
}
