//! MeepleVault CLI — board-game catalog conversion and enrichment tool.
//!
//! Converts a tabular board-game dataset into per-game JSON records plus a
//! merged catalog, then fills missing fields from BoardGameGeek.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli)?;
    commands::run(cli).await
}
