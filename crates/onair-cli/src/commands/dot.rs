//! Graphviz export of a template's dependency graph.

use std::path::PathBuf;

use clap::Args;
use onair_config::EngineConfig;
use onair_core::build_graph;

use super::common::load_template;

#[derive(Args)]
pub struct DotArgs {
    /// Factory template name, user template name, or path to a template file
    template: String,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: DotArgs, engine: &EngineConfig) -> anyhow::Result<()> {
    let template = load_template(&args.template)?;
    let (graph, _, _) = build_graph(&template, &engine.compile_options())?;
    let dot = graph.to_dot();

    match args.output {
        Some(path) => {
            std::fs::write(&path, dot)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{dot}"),
    }
    Ok(())
}
