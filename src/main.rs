//! Christmas Tree - animated L-system tree
//!
//! CLI commands:
//! - run: Open the window and grow the tree (default)
//! - trace: Print the pattern and its strokes at a given depth, no window

mod config;
mod generator;
mod gui;
mod logging;
mod lsystem;
mod render;
mod segment;
mod surface;
mod turtle;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "christmas_tree")]
#[command(about = "Grows an L-system Christmas tree, one stroke at a time")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to tree.yaml config
    #[arg(short, long, default_value = "tree.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the viewer window
    Run {
        /// Stop growing after this depth
        #[arg(long)]
        max_depth: Option<u32>,
    },

    /// Print the pattern and strokes at a depth
    Trace {
        /// Number of rewriting passes
        #[arg(short, long, default_value = "1")]
        depth: u32,

        /// Use the 0 → 1[0]0, 1 → 11 rule set instead
        #[arg(long)]
        binary: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        config::Config::load(&cli.config)?
    } else {
        config::Config::default()
    }
    .with_env();

    // Initialize logging first
    logging::init_logging(&config.log_dir)?;
    tracing::info!("Christmas Tree starting up");
    tracing::debug!("Config: {:?} (from {:?})", config, cli.config);

    match cli.command.unwrap_or(Commands::Run { max_depth: None }) {
        Commands::Run { max_depth } => {
            let mut config = config;
            if max_depth.is_some() {
                config.max_depth = max_depth;
            }
            tracing::info!("Launching viewer");
            gui::run_viewer(config)?;
        }

        Commands::Trace { depth, binary, json } => {
            trace(&config, depth, binary, json)?;
        }
    }

    Ok(())
}

/// Print the pattern grown to `depth` and the strokes it walks to
fn trace(config: &config::Config, depth: u32, binary: bool, json: bool) -> anyhow::Result<()> {
    let mut system = if binary {
        lsystem::LSystem::binary_tree()
    } else {
        lsystem::LSystem::christmas_tree()
    };
    system.advance(depth);
    let strokes = turtle::strokes(system.value(), config.origin)?;
    tracing::info!(depth, strokes = strokes.len(), "Traced pattern");

    if json {
        let data = serde_json::json!({
            "axiom": system.axiom(),
            "depth": depth,
            "origin": config.origin,
            "pattern": system.value(),
            "strokes": strokes,
            "generated": chrono::Local::now().to_rfc3339(),
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("Depth {} ({} symbols):", depth, system.value().len());
    println!("{}", system.value());
    println!();
    println!("Strokes ({}):", strokes.len());
    for stroke in &strokes {
        println!(
            "  {:<6} ({}, {}) -> ({}, {})",
            format!("{:?}", stroke.kind),
            stroke.start.x,
            stroke.start.y,
            stroke.end.x,
            stroke.end.y
        );
    }
    Ok(())
}
