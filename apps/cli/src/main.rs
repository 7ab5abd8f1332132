//! codecache CLI: hook entry points for per-file knowledge.
//!
//! Extracts file structure, caches per-file artifacts, and forwards updates
//! to the knowledge graph and issue tracker.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::{Cli, Settings};

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let settings = Settings::resolve(&cli);
    commands::init_tracing(&cli, &settings);
    commands::run(cli, settings)
}
