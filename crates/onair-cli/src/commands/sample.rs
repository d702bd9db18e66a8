//! Print interpolated values at a point in the animation.

use std::sync::Arc;

use clap::Args;
use onair_config::EngineConfig;
use onair_core::{Layer, compile_template};

use super::common::{ValueRow, load_template, print_rows};

#[derive(Args)]
pub struct SampleArgs {
    /// Factory template name, user template name, or path to a template file
    template: String,

    /// Progress through the animation, 0.0 to 1.0
    #[arg(short, long)]
    progress: f64,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: SampleArgs, engine: &EngineConfig) -> anyhow::Result<()> {
    let template = load_template(&args.template)?;
    let published = Arc::new(compile_template(&template, &engine.compile_options())?);

    let mut layer = Layer::new(engine.segment_width);
    layer.show(Arc::clone(&published));
    layer.set_progress(args.progress);
    let Some(cursor) = layer.tick() else {
        anyhow::bail!("no page on layer");
    };

    let rows: Vec<ValueRow> = published
        .blend_pairs()
        .iter()
        .filter_map(|&(geo, attr)| {
            layer
                .live()
                .get(geo, attr)
                .map(|value| ValueRow { geo, attr, value })
        })
        .collect();

    if args.json {
        let report = serde_json::json!({
            "template": published.id().0,
            "progress": args.progress,
            "keyframe": cursor.keyframe,
            "offset": cursor.offset,
            "segment_width": cursor.segment_width,
            "values": rows.iter().map(ValueRow::to_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Progress {:.3}: keyframe {} + {}/{}",
        args.progress, cursor.keyframe, cursor.offset, cursor.segment_width
    );
    print_rows(&published, &rows);
    Ok(())
}
