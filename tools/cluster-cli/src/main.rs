//! clusterd - run clustered light assignment and shading on synthetic scenes
//!
//! # Commands
//!
//! - `clusterd init` - Write a default cluster.toml
//! - `clusterd assign` - Assign lights to clusters for a number of frames and print stats
//! - `clusterd render` - Shade a synthetic floor G-buffer and save it as PNG
//!
//! # Usage
//!
//! ```bash
//! clusterd init
//! clusterd assign --config cluster.toml --frames 10 --parallel
//! RUST_LOG=debug clusterd render --width 1280 --height 720 --output floor.png
//! ```

mod assign;
mod init;
mod render;
mod scene;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// clusterd - clustered deferred shading playground
#[derive(Parser)]
#[command(name = "clusterd")]
#[command(about = "Clustered light assignment and shading on synthetic scenes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default cluster.toml
    Init(init::InitArgs),

    /// Assign lights to clusters and report per-frame stats
    Assign(assign::AssignArgs),

    /// Shade a synthetic floor and save a PNG
    Render(render::RenderArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init::execute(args),
        Commands::Assign(args) => assign::execute(args),
        Commands::Render(args) => render::execute(args),
    }
}
