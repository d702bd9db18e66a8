//! Implicit layout relations.
//!
//! Every geometry at every keyframe gets the same small set of nodes:
//!
//! ```text
//! pos_x   = sum(rel_x, parent.pos_x)
//! lower_x = single_value(pos_x)
//! upper_x = max_plus_pad(width | pad rel_x)
//! ```
//!
//! and the same for `y`. `upper_x` is a `max_plus_pad` node so that expanding
//! size keyframes on the parent can join the max later. With only the geometry's
//! own width as non-pad contributor it equals `rel_x + width`.
//!
//! Authored inputs and visual attributes become leaves. The page root is seeded
//! with constants and has no parent.

use crate::attr::Attr;
use crate::error::GraphError;
use crate::graph::{Aggregation, DependencyGraph};
use crate::template::{GeoId, GeometryDecl, PageSize, TemplateDecl};

/// Edges the relation builder adds per non-root geometry per keyframe.
pub const EDGES_PER_GEOMETRY_FRAME: usize = 10;

/// Attribute roles along one axis.
struct Axis {
    rel: Attr,
    size: Attr,
    pos: Attr,
    lower: Attr,
    upper: Attr,
}

const AXES: [Axis; 2] = [
    Axis {
        rel: Attr::RelX,
        size: Attr::Width,
        pos: Attr::PosX,
        lower: Attr::LowerX,
        upper: Attr::UpperX,
    },
    Axis {
        rel: Attr::RelY,
        size: Attr::Height,
        pos: Attr::PosY,
        lower: Attr::LowerY,
        upper: Attr::UpperY,
    },
];

/// Resolves the parent of a non-root geometry. Parentless geometries hang off
/// the page root.
pub fn parent_of(template: &TemplateDecl, geometry: &GeometryDecl) -> Result<GeoId, GraphError> {
    let parent = geometry.parent.unwrap_or(0);
    if parent >= template.geometries.len() || parent == geometry.id {
        return Err(GraphError::InvalidParent {
            geo: geometry.id,
            parent,
        });
    }
    Ok(parent)
}

/// Adds the layout nodes and edges of every geometry at every keyframe.
pub fn build_relations(
    graph: &mut DependencyGraph,
    template: &TemplateDecl,
    page: PageSize,
) -> Result<(), GraphError> {
    let dims = graph.dims();
    let edges_before = graph.edge_count();

    for frame in 0..dims.frames() {
        seed_root(graph, frame, page)?;

        for geometry in template.geometries.iter().skip(1) {
            let parent = parent_of(template, geometry)?;
            let geo = geometry.id;

            for attr in Attr::ALL {
                if geometry.kind.is_keyframable(attr) {
                    let index = dims.index(geo, attr, frame)?;
                    graph.add_leaf(index, attr, geometry.value_at(frame, attr))?;
                }
            }

            for axis in &AXES {
                let rel = dims.index(geo, axis.rel, frame)?;
                let size = dims.index(geo, axis.size, frame)?;
                let pos = dims.index(geo, axis.pos, frame)?;
                let lower = dims.index(geo, axis.lower, frame)?;
                let upper = dims.index(geo, axis.upper, frame)?;
                let parent_pos = dims.index(parent, axis.pos, frame)?;

                graph.add_eval_node(pos, axis.pos, Aggregation::Sum)?;
                graph.add_edge(pos, axis.pos, rel, axis.rel, false)?;
                graph.add_edge(pos, axis.pos, parent_pos, axis.pos, false)?;

                graph.add_eval_node(lower, axis.lower, Aggregation::SingleValue)?;
                graph.add_edge(lower, axis.lower, pos, axis.pos, false)?;

                graph.add_eval_node(upper, axis.upper, Aggregation::MaxPlusPad)?;
                graph.add_edge(upper, axis.upper, size, axis.size, false)?;
                graph.add_edge(upper, axis.upper, rel, axis.rel, true)?;
            }
        }
    }

    tracing::debug!(
        "graph_relations: {} geometries x {} frames, {} edges",
        dims.geometries(),
        dims.frames(),
        graph.edge_count() - edges_before
    );
    Ok(())
}

fn seed_root(graph: &mut DependencyGraph, frame: usize, page: PageSize) -> Result<(), GraphError> {
    let dims = graph.dims();
    let seeds = [
        (Attr::RelX, 0),
        (Attr::RelY, 0),
        (Attr::Width, page.width),
        (Attr::Height, page.height),
        (Attr::PosX, 0),
        (Attr::PosY, 0),
        (Attr::LowerX, 0),
        (Attr::LowerY, 0),
        (Attr::UpperX, page.width),
        (Attr::UpperY, page.height),
    ];
    for (attr, value) in seeds {
        graph.add_leaf(dims.index(0, attr, frame)?, attr, value)?;
    }
    Ok(())
}
