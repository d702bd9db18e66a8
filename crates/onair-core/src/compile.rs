//! Template compilation and publication.
//!
//! [`compile_template()`] runs the whole load pipeline for one template:
//!
//! 1. structural validation and capacity planning
//! 2. [`build_relations`](crate::relations::build_relations)
//! 3. [`load_keyframes`](crate::keyframes::load_keyframes)
//! 4. cycle check
//! 5. evaluation into a flat array
//!
//! The result is an immutable [`PublishedTemplate`]. Any failure rejects the
//! template as a whole and is logged inside the `template_load` span.

use crate::attr::{Attr, GeometryKind};
use crate::error::{GraphError, TemplateError};
use crate::graph::{DependencyGraph, GraphDims};
use crate::keyframes::{LoadSummary, TrackedSet, expand_bound, load_keyframes};
use crate::relations::{EDGES_PER_GEOMETRY_FRAME, build_relations, parent_of};
use crate::template::{GeoId, PageSize, TemplateDecl, TemplateId};

/// Default upper bound on graph nodes per template.
pub const DEFAULT_MAX_NODES: usize = 4_194_304;

/// Default upper bound on graph edges per template.
pub const DEFAULT_MAX_EDGES: usize = 16_777_216;

/// Hard limits on the arenas a single template may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompileLimits {
    /// Maximum node arena size.
    pub max_nodes: usize,
    /// Maximum edge arena size.
    pub max_edges: usize,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            max_edges: DEFAULT_MAX_EDGES,
        }
    }
}

/// Engine-wide settings applied to every template load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Page size used when the template does not declare one.
    pub page: PageSize,
    /// Arena limits.
    pub limits: CompileLimits,
}

/// Arena sizes a template needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityPlan {
    /// Node arena size (one per flattened index).
    pub nodes: usize,
    /// Edge arena size.
    pub edges: usize,
}

/// Computes the arena sizes `template` needs before anything is allocated.
///
/// Edges come from three sources: the layout relations of every non-root
/// geometry, one per bind keyframe, and one per child of each expanding size
/// keyframe.
pub fn plan_capacity(template: &TemplateDecl) -> CapacityPlan {
    let dims = GraphDims::new(template.geometries.len(), template.max_keyframe);
    let relations = template
        .geometries
        .len()
        .saturating_sub(1)
        .saturating_mul(template.max_keyframe)
        .saturating_mul(EDGES_PER_GEOMETRY_FRAME);
    let binds = template.bind.len();
    let expands: usize = template
        .keyframes()
        .filter(|k| k.expand && expand_bound(k.attr).is_some())
        .map(|k| template.children_of(k.geo).count())
        .sum();

    CapacityPlan {
        nodes: dims.node_count(),
        edges: relations.saturating_add(binds).saturating_add(expands),
    }
}

/// Rejects templates whose structure the graph builder cannot represent.
pub fn validate_structure(template: &TemplateDecl) -> Result<(), GraphError> {
    if template.max_keyframe == 0 {
        return Err(GraphError::InvalidTemplate(
            "template has no keyframes".to_string(),
        ));
    }
    let Some(root) = template.geometries.first() else {
        return Err(GraphError::InvalidTemplate(
            "template has no page root".to_string(),
        ));
    };
    if root.kind != GeometryKind::Page || root.parent.is_some() {
        return Err(GraphError::InvalidTemplate(
            "geometry 0 must be a parentless page".to_string(),
        ));
    }

    for (position, geometry) in template.geometries.iter().enumerate() {
        if geometry.id != position {
            return Err(GraphError::InvalidTemplate(format!(
                "geometry at position {position} has id {}",
                geometry.id
            )));
        }
        if position > 0 {
            if geometry.kind == GeometryKind::Page {
                return Err(GraphError::InvalidTemplate(format!(
                    "geometry {position} is a second page"
                )));
            }
            parent_of(template, geometry)?;
        }
    }
    Ok(())
}

/// Validates `template` and builds its dependency graph without evaluating it.
///
/// Returns the graph with relations and keyframes loaded, the tracked set,
/// and the keyframe load summary.
pub fn build_graph(
    template: &TemplateDecl,
    options: &CompileOptions,
) -> Result<(DependencyGraph, TrackedSet, LoadSummary), GraphError> {
    validate_structure(template)?;

    let plan = plan_capacity(template);
    if plan.nodes > options.limits.max_nodes {
        return Err(GraphError::CapacityExceeded {
            what: "node",
            needed: plan.nodes,
            capacity: options.limits.max_nodes,
        });
    }
    if plan.edges > options.limits.max_edges {
        return Err(GraphError::CapacityExceeded {
            what: "edge",
            needed: plan.edges,
            capacity: options.limits.max_edges,
        });
    }

    let dims = GraphDims::new(template.geometries.len(), template.max_keyframe);
    let mut graph = DependencyGraph::new(dims, plan.edges);
    tracing::debug!(
        "graph_alloc: {} nodes, {} edges",
        graph.node_capacity(),
        graph.edge_capacity()
    );

    let page = template.page.unwrap_or(options.page);
    build_relations(&mut graph, template, page)?;

    let mut tracked = TrackedSet::new(template.geometries.len());
    let summary = load_keyframes(&mut graph, template, &mut tracked)?;
    Ok((graph, tracked, summary))
}

/// Loads one template: build, check, evaluate, publish.
///
/// # Errors
///
/// Returns [`TemplateError`] wrapping the first fatal [`GraphError`]. Nothing
/// is published on failure.
pub fn compile_template(
    template: &TemplateDecl,
    options: &CompileOptions,
) -> Result<PublishedTemplate, TemplateError> {
    let span = tracing::info_span!("template_load", template = %template.id);
    let _guard = span.enter();

    compile_inner(template, options).map_err(|source| {
        tracing::error!("template_load: rejected: {source}");
        TemplateError {
            template: template.id,
            source,
        }
    })
}

fn compile_inner(
    template: &TemplateDecl,
    options: &CompileOptions,
) -> Result<PublishedTemplate, GraphError> {
    let (mut graph, tracked, summary) = build_graph(template, options)?;

    if let Some(node) = graph.find_cycle() {
        let (index, attr) = graph
            .node_key(node)
            .ok_or_else(|| GraphError::InvalidTemplate(format!("unknown node {node}")))?;
        return Err(GraphError::CycleDetected { index, attr });
    }

    let values = graph.evaluate_dag()?;
    let published = PublishedTemplate::new(
        template.id,
        graph.dims(),
        template.page.unwrap_or(options.page),
        values,
        tracked,
    );

    tracing::info!(
        "template_load: published {} values, {} keyframes applied, {} dropped, {} blended pairs",
        published.values.len(),
        summary.applied,
        summary.dropped,
        published.blend.len()
    );
    Ok(published)
}

/// The immutable result of loading one template.
///
/// Holds the evaluated value of every `(geometry, attribute, frame)` and the
/// set of pairs the interpolator blends. Shared with the render path through an
/// `Arc`; a reload publishes a new instance rather than mutating this one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedTemplate {
    id: TemplateId,
    dims: GraphDims,
    page: PageSize,
    values: Box<[i32]>,
    tracked: TrackedSet,
    blend: Box<[(GeoId, Attr)]>,
}

impl PublishedTemplate {
    fn new(
        id: TemplateId,
        dims: GraphDims,
        page: PageSize,
        values: Vec<i32>,
        tracked: TrackedSet,
    ) -> Self {
        let blend = (0..dims.geometries())
            .flat_map(|geo| Attr::ALL.into_iter().map(move |attr| (geo, attr)))
            .filter(|&(geo, attr)| attr.is_layout_output() || tracked.contains(geo, attr))
            .collect();
        Self {
            id,
            dims,
            page,
            values: values.into_boxed_slice(),
            tracked,
            blend,
        }
    }

    /// Template identifier.
    pub fn id(&self) -> TemplateId {
        self.id
    }

    /// Index space of the published values.
    pub fn dims(&self) -> GraphDims {
        self.dims
    }

    /// Page size the layout was computed against.
    pub fn page(&self) -> PageSize {
        self.page
    }

    /// Number of keyframes.
    pub fn max_keyframe(&self) -> usize {
        self.dims.frames()
    }

    /// Number of geometries.
    pub fn geometries(&self) -> usize {
        self.dims.geometries()
    }

    /// The flat evaluated array, indexed by flattened index.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Returns the evaluated value at a coordinate, or `None` if out of range.
    pub fn value(&self, geo: GeoId, attr: Attr, frame: usize) -> Option<i32> {
        let index = self.dims.index(geo, attr, frame).ok()?;
        self.values.get(index.get()).copied()
    }

    /// Returns true if a keyframe touches the pair.
    pub fn is_tracked(&self, geo: GeoId, attr: Attr) -> bool {
        self.tracked.contains(geo, attr)
    }

    /// The tracked pairs.
    pub fn tracked(&self) -> &TrackedSet {
        &self.tracked
    }

    /// Pairs the interpolator writes each tick: tracked pairs plus the layout
    /// outputs of every geometry.
    pub fn blend_pairs(&self) -> &[(GeoId, Attr)] {
        &self.blend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{AttrRef, GeometryDecl, KeyframeDecl};

    fn card() -> TemplateDecl {
        TemplateDecl::new(TemplateId(11), 2)
            .with_page(PageSize::new(800, 600))
            .with_geometry(GeometryDecl::new(1, GeometryKind::Rectangle).with_live(Attr::Width, 50))
            .with_geometry(GeometryDecl::new(2, GeometryKind::Text).with_parent(1))
            .with_geometry(GeometryDecl::new(3, GeometryKind::Text).with_parent(1))
    }

    #[test]
    fn test_plan_counts_every_edge_source() {
        let t = card()
            .with_keyframe(KeyframeDecl::set(1, Attr::Width, 1, 300).expanding())
            .with_keyframe(KeyframeDecl::bind(2, Attr::Opacity, 0, AttrRef::new(3, Attr::Opacity, 0)));
        let plan = plan_capacity(&t);
        assert_eq!(plan.nodes, 4 * Attr::COUNT * 2);
        assert_eq!(plan.edges, 3 * 2 * EDGES_PER_GEOMETRY_FRAME + 1 + 2);

        let (graph, _, _) = build_graph(&t, &CompileOptions::default()).unwrap();
        assert_eq!(graph.edge_count(), plan.edges);
    }

    #[test]
    fn test_limits_checked_before_allocation() {
        let options = CompileOptions {
            limits: CompileLimits {
                max_nodes: 10,
                max_edges: DEFAULT_MAX_EDGES,
            },
            ..CompileOptions::default()
        };
        assert!(matches!(
            build_graph(&card(), &options),
            Err(GraphError::CapacityExceeded { what: "node", .. })
        ));
    }

    #[test]
    fn test_structure_validation() {
        let mut t = card();
        t.geometries[2].id = 5;
        assert!(matches!(
            validate_structure(&t),
            Err(GraphError::InvalidTemplate(_))
        ));

        let t = TemplateDecl::new(TemplateId(1), 0);
        assert!(validate_structure(&t).is_err());

        let t = TemplateDecl::new(TemplateId(1), 1)
            .with_geometry(GeometryDecl::new(1, GeometryKind::Page));
        assert!(validate_structure(&t).is_err());
    }

    #[test]
    fn test_published_uses_template_page() {
        let published = compile_template(&card(), &CompileOptions::default()).unwrap();
        assert_eq!(published.page(), PageSize::new(800, 600));
        assert_eq!(published.value(0, Attr::Width, 0), Some(800));
        assert_eq!(published.value(9, Attr::Width, 0), None);
        assert_eq!(published.max_keyframe(), 2);
    }

    #[test]
    fn test_blend_pairs_cover_layout_and_tracked() {
        let t = card().with_keyframe(KeyframeDecl::set(2, Attr::Opacity, 1, 255));
        let published = compile_template(&t, &CompileOptions::default()).unwrap();
        let pairs = published.blend_pairs();
        assert_eq!(pairs.len(), 4 * Attr::LAYOUT_OUTPUTS.len() + 1);
        assert!(pairs.contains(&(2, Attr::Opacity)));
        assert!(!pairs.contains(&(3, Attr::Opacity)));
        assert!(published.is_tracked(2, Attr::Opacity));
    }

    #[test]
    fn test_cycle_rejects_template() {
        let t = card()
            .with_keyframe(KeyframeDecl::bind(1, Attr::Width, 0, AttrRef::new(1, Attr::Width, 1)))
            .with_keyframe(KeyframeDecl::bind(1, Attr::Width, 1, AttrRef::new(1, Attr::Width, 0)));
        let err = compile_template(&t, &CompileOptions::default()).unwrap_err();
        assert_eq!(err.template, TemplateId(11));
        assert!(matches!(err.kind(), GraphError::CycleDetected { .. }));
    }
}
