//! onair CLI - diagnostics for on-air graphics templates.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use onair_config::EngineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "onair")]
#[command(author, version, about = "onair template engine CLI", long_about = None)]
struct Cli {
    /// Log graph construction details (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine config file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a template's dependency graph and check it loads
    Check(commands::check::CheckArgs),

    /// Print evaluated keyframe values
    Eval(commands::eval::EvalArgs),

    /// Print interpolated values at a point in the animation
    Sample(commands::sample::SampleArgs),

    /// List factory and user templates
    Templates(commands::templates::TemplatesArgs),

    /// Render a template's dependency graph as Graphviz DOT
    Dot(commands::dot::DotArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let engine = EngineConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Check(args) => commands::check::run(args, &engine),
        Commands::Eval(args) => commands::eval::run(args, &engine),
        Commands::Sample(args) => commands::sample::run(args, &engine),
        Commands::Templates(args) => commands::templates::run(args),
        Commands::Dot(args) => commands::dot::run(args, &engine),
    }
}
