//! Template load check.

use clap::Args;
use onair_config::EngineConfig;
use onair_core::{build_graph, compile_template, plan_capacity};

use super::common::load_template;

#[derive(Args)]
pub struct CheckArgs {
    /// Factory template name, user template name, or path to a template file
    template: String,
}

pub fn run(args: CheckArgs, engine: &EngineConfig) -> anyhow::Result<()> {
    let template = load_template(&args.template)?;
    let options = engine.compile_options();

    let plan = plan_capacity(&template);
    let (graph, tracked, summary) = build_graph(&template, &options)?;

    println!("Template: {} (id {})", args.template, template.id);
    println!(
        "  Geometries:  {} x {} keyframes",
        template.geometries.len(),
        template.max_keyframe
    );
    println!(
        "  Nodes:       {} / {}",
        graph.node_count(),
        graph.node_capacity()
    );
    println!("  Edges:       {} / {}", graph.edge_count(), plan.edges);
    println!(
        "  Keyframes:   {} applied, {} dropped, {} expanding",
        summary.applied, summary.dropped, summary.expanded
    );
    println!("  Tracked:     {}", tracked.len());

    if let Some(node) = graph.find_cycle() {
        println!("  Acyclic:     no");
        anyhow::bail!("dependency cycle through {node}");
    }
    println!("  Acyclic:     yes");

    let published = compile_template(&template, &options)?;
    println!("OK: {} values published", published.values().len());
    Ok(())
}
