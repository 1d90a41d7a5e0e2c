//! Init command - write a default cluster.toml

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::settings::{CliConfig, DEFAULT_CONFIG_FILE};

/// Arguments for the init command
#[derive(Args)]
pub struct InitArgs {
    /// Where to write the config
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        );
    }

    let content = CliConfig::default().to_toml()?;
    std::fs::write(&args.path, content)
        .with_context(|| format!("Failed to write {}", args.path.display()))?;

    println!("Created {}", args.path.display());
    Ok(())
}
