//! `GlbPack` CLI - Command-line interface for glTF to GLB packing

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "glbpack")]
#[command(version, about = "GlbPack: pack glTF files and their resources into GLB", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the `GlbPack` CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
