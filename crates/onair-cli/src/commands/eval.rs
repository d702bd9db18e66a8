//! Print evaluated keyframe values.

use clap::Args;
use onair_config::EngineConfig;
use onair_core::compile_template;

use super::common::{frame_rows, load_template, print_rows};

#[derive(Args)]
pub struct EvalArgs {
    /// Factory template name, user template name, or path to a template file
    template: String,

    /// Only print this keyframe
    #[arg(short, long)]
    frame: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: EvalArgs, engine: &EngineConfig) -> anyhow::Result<()> {
    let template = load_template(&args.template)?;
    let published = compile_template(&template, &engine.compile_options())?;

    let frames: Vec<usize> = match args.frame {
        Some(frame) if frame >= published.max_keyframe() => anyhow::bail!(
            "frame {} out of range (template has {} keyframes)",
            frame,
            published.max_keyframe()
        ),
        Some(frame) => vec![frame],
        None => (0..published.max_keyframe()).collect(),
    };

    if args.json {
        let frames_json: Vec<_> = frames
            .iter()
            .map(|&frame| {
                let values: Vec<_> = frame_rows(&published, frame)
                    .iter()
                    .map(|row| row.to_json())
                    .collect();
                serde_json::json!({ "frame": frame, "values": values })
            })
            .collect();
        let report = serde_json::json!({
            "template": published.id().0,
            "max_keyframe": published.max_keyframe(),
            "frames": frames_json,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for frame in frames {
        println!("Keyframe {frame}:");
        print_rows(&published, &frame_rows(&published, frame));
        println!();
    }
    println!("(* = keyframed)");
    Ok(())
}
