//! onair core - keyframe dependency evaluation for on-air graphics templates
//!
//! A template is a tree of geometries animated over a fixed number of
//! keyframes. This crate computes, once per template load, the value of every
//! geometry attribute at every keyframe, then blends between keyframes on each
//! render tick.
//!
//! # Pipeline
//!
//! ```text
//! TemplateDecl ─► build_relations ─┐
//!                                  ├─► DependencyGraph ─► is_dag ─► evaluate_dag
//!              ─► load_keyframes ──┘                                     │
//!                                                                        ▼
//!   Layer::tick ◄── Arc<PublishedTemplate> ◄── TemplateLibrary::load ◄── [i32; N]
//! ```
//!
//! - [`relations`] adds implicit layout: absolute position from parent position
//!   plus offset, and layout bounds from offset and size.
//! - [`keyframes`] adds authored values: live snapshots, literals, bindings to
//!   other attributes, and expand propagation to children.
//! - [`graph`] stores nodes and edges in fixed-capacity arenas, rejects cycles,
//!   and evaluates every node once.
//! - [`compile_template`] runs the pipeline and publishes an immutable
//!   [`PublishedTemplate`], or rejects the template with a [`TemplateError`].
//! - [`interp`] maps layer progress to bracketing keyframes and blends.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use onair_core::{
//!     Attr, CompileOptions, GeometryDecl, GeometryKind, KeyframeDecl, Layer, TemplateDecl,
//!     TemplateId, TemplateLibrary,
//! };
//!
//! let template = TemplateDecl::new(TemplateId(1), 2)
//!     .with_geometry(
//!         GeometryDecl::new(1, GeometryKind::Rectangle)
//!             .with_frame_value(0, Attr::RelX, 50)
//!             .with_frame_value(1, Attr::RelX, 150),
//!     )
//!     .with_keyframe(KeyframeDecl::user(1, Attr::Opacity, 0));
//!
//! let mut library = TemplateLibrary::new(CompileOptions::default());
//! let page = library.load(&template).unwrap();
//!
//! let mut layer = Layer::default();
//! layer.show(Arc::clone(&page));
//! layer.set_progress(0.5);
//! layer.tick();
//! assert_eq!(layer.live().get(1, Attr::PosX), Some(100));
//! ```

pub mod attr;
pub mod compile;
pub mod error;
pub mod graph;
pub mod interp;
pub mod keyframes;
pub mod library;
pub mod relations;
pub mod template;

pub use attr::{Attr, GeometryKind, ParseNameError};
pub use compile::{
    CapacityPlan, CompileLimits, CompileOptions, DEFAULT_MAX_EDGES, DEFAULT_MAX_NODES,
    PublishedTemplate, build_graph, compile_template, plan_capacity, validate_structure,
};
pub use error::{GraphError, TemplateError};
pub use graph::{Aggregation, DependencyGraph, FlatIndex, GraphDims, NodeId, NodeKind};
pub use interp::{
    DEFAULT_SEGMENT_WIDTH, KeyframeCursor, Layer, LiveAttributes, interpolate, lerp, sample,
};
pub use keyframes::{LoadSummary, TrackedSet, load_keyframes};
pub use library::TemplateLibrary;
pub use relations::build_relations;
pub use template::{
    AttrRef, AttrValues, FrameValue, GeoId, GeometryDecl, KeyframeDecl, KeyframeKind, PageSize,
    TemplateDecl, TemplateId,
};
