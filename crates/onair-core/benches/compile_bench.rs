//! Criterion benchmarks for template compilation and per-tick interpolation.
//!
//! - **Compile**: graph construction, cycle check and evaluation for templates
//!   of growing size
//! - **Tick**: `Layer::tick()` over a published template
//!
//! Run with: `cargo bench -p onair-core`
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use onair_core::{
    Attr, AttrRef, CompileOptions, GeometryDecl, GeometryKind, KeyframeDecl, Layer, TemplateDecl,
    TemplateId, compile_template,
};

const GEOMETRY_COUNTS: &[usize] = &[16, 64, 256, 1024];
const FRAMES: usize = 8;

/// A row of boxes, each nested in the previous one, with a keyframe per box.
fn nested_template(geometries: usize) -> TemplateDecl {
    let mut template = TemplateDecl::new(TemplateId(1), FRAMES);
    for id in 1..geometries {
        template = template.with_geometry(
            GeometryDecl::new(id, GeometryKind::Rectangle)
                .with_parent(id - 1)
                .with_live(Attr::RelX, 4)
                .with_live(Attr::Width, 32)
                .with_frame_value(FRAMES - 1, Attr::RelX, 12),
        );
        template.push_keyframe(KeyframeDecl::set(id, Attr::Opacity, 0, 0));
        if id > 1 {
            template.push_keyframe(KeyframeDecl::bind(
                id,
                Attr::Opacity,
                FRAMES - 1,
                AttrRef::new(id - 1, Attr::Opacity, 0),
            ));
        }
    }
    template
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let options = CompileOptions::default();

    for &count in GEOMETRY_COUNTS {
        let template = nested_template(count);
        group.bench_with_input(BenchmarkId::new("nested", count), &template, |b, t| {
            b.iter(|| black_box(compile_template(black_box(t), &options)));
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    let options = CompileOptions::default();

    for &count in GEOMETRY_COUNTS {
        let Ok(published) = compile_template(&nested_template(count), &options) else {
            continue;
        };
        let mut layer = Layer::default();
        layer.show(Arc::new(published));

        group.bench_with_input(BenchmarkId::new("layer", count), &count, |b, _| {
            let mut progress = 0.0;
            b.iter(|| {
                progress = (progress + 0.001) % 1.0;
                layer.set_progress(progress);
                black_box(layer.tick());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_tick);
criterion_main!(benches);
