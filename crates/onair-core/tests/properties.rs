//! Property-based tests for onair-core.
//!
//! Checks evaluation idempotence, interpolation boundaries and monotonicity,
//! and acceptance of randomly generated layout trees.

use proptest::prelude::*;
use onair_core::{
    Attr, AttrRef, CompileOptions, DependencyGraph, GeometryDecl, GeometryKind, GraphDims,
    KeyframeCursor, KeyframeDecl, TemplateDecl, TemplateId, build_graph, compile_template, lerp,
};

/// Builds a template whose geometry `i` hangs off `parents[i - 1] % i`, so the
/// tree is always well formed.
fn tree_template(parents: &[usize], offsets: &[i32], frames: usize) -> TemplateDecl {
    let mut template = TemplateDecl::new(TemplateId(9), frames);
    for (i, (&parent, &offset)) in parents.iter().zip(offsets).enumerate() {
        let id = i + 1;
        template = template.with_geometry(
            GeometryDecl::new(id, GeometryKind::Rectangle)
                .with_parent(parent % id)
                .with_live(Attr::RelX, offset)
                .with_live(Attr::Width, offset.abs())
                .with_frame_value(frames - 1, Attr::RelX, -offset),
        );
    }
    template
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Interpolation hits both endpoints exactly.
    #[test]
    fn lerp_exact_at_boundaries(
        start in -100_000i32..100_000,
        end in -100_000i32..100_000,
        width in 1u32..5000,
    ) {
        prop_assert_eq!(lerp(start, end, 0, width), start);
        prop_assert_eq!(lerp(start, end, width, width), end);
    }

    /// Interpolation never decreases as the offset grows when start < end.
    #[test]
    fn lerp_monotonic(
        start in -100_000i32..100_000,
        span in 1i32..100_000,
        width in 1u32..2000,
        a in 0u32..2000,
        b in 0u32..2000,
    ) {
        let end = start + span;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = lo.min(width);
        let hi = hi.min(width);
        let v_lo = lerp(start, end, lo, width);
        let v_hi = lerp(start, end, hi, width);
        prop_assert!(v_lo <= v_hi);
        prop_assert!(v_lo >= start && v_hi <= end);
    }

    /// Cursors stay inside the keyframe range and the segment.
    #[test]
    fn cursor_in_range(
        progress in -0.5f64..1.5,
        max_keyframe in 1usize..50,
        width in 1u32..5000,
    ) {
        let cursor = KeyframeCursor::locate(progress, max_keyframe, width);
        prop_assert!(cursor.keyframe < max_keyframe);
        prop_assert!(cursor.offset < width);
        if cursor.is_last(max_keyframe) {
            prop_assert_eq!(cursor.offset, 0);
        }
    }

    /// Any parent tree is acyclic and evaluates to the same array twice.
    #[test]
    fn random_trees_evaluate_idempotently(
        parents in prop::collection::vec(0usize..64, 1..24),
        offsets in prop::collection::vec(-500i32..500, 24),
        frames in 1usize..5,
    ) {
        let template = tree_template(&parents, &offsets, frames);
        let (mut graph, _, _) = build_graph(&template, &CompileOptions::default()).unwrap();
        prop_assert!(graph.is_dag());
        let first = graph.evaluate_dag().unwrap();
        let second = graph.evaluate_dag().unwrap();
        prop_assert_eq!(first, second);
    }

    /// Absolute position equals the sum of offsets up the parent chain.
    #[test]
    fn position_is_sum_of_offsets(
        parents in prop::collection::vec(0usize..64, 1..16),
        offsets in prop::collection::vec(-500i32..500, 16),
    ) {
        let template = tree_template(&parents, &offsets, 1);
        let published = compile_template(&template, &CompileOptions::default()).unwrap();
        for geometry in template.geometries.iter().skip(1) {
            let mut expected = 0;
            let mut cursor = geometry.id;
            while cursor != 0 {
                let g = &template.geometries[cursor];
                expected += g.value_at(0, Attr::RelX);
                cursor = g.parent.unwrap_or(0);
            }
            prop_assert_eq!(published.value(geometry.id, Attr::PosX, 0), Some(expected));
        }
    }

    /// Bind keyframes pointing only at earlier geometries never form a cycle.
    #[test]
    fn backward_bindings_accepted(
        parents in prop::collection::vec(0usize..8, 2..10),
        offsets in prop::collection::vec(-50i32..50, 10),
        targets in prop::collection::vec(0usize..8, 1..10),
    ) {
        let mut template = tree_template(&parents, &offsets, 2);
        for (i, &t) in targets.iter().enumerate() {
            let geo = i % parents.len() + 1;
            let target = t % geo;
            template.push_keyframe(KeyframeDecl::bind(
                geo,
                Attr::Opacity,
                1,
                AttrRef::new(target, Attr::Opacity, 0),
            ));
        }
        let result = compile_template(&template, &CompileOptions::default());
        prop_assert!(
            !matches!(result, Err(ref e) if matches!(e.kind(), onair_core::GraphError::CycleDetected { .. })),
            "upward-only binds must not produce CycleDetected"
        );
    }
}

/// Graphs with only leaves are trivially acyclic.
#[test]
fn leaf_only_graph_is_dag() {
    let dims = GraphDims::new(2, 2);
    let mut graph = DependencyGraph::new(dims, 0);
    for frame in 0..2 {
        let index = dims.index(1, Attr::Width, frame).unwrap();
        graph.add_leaf(index, Attr::Width, 10).unwrap();
    }
    assert!(graph.is_dag());
    assert_eq!(graph.evaluate_dag().unwrap().len(), dims.node_count());
}
