//! Development tasks for the stats workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{InspectSchema, Replay};
use config::XtaskConfig;
use tracing_subscriber::EnvFilter;

/// Development tasks for the stats workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for stats schemas and operation logs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Show the accessor surface a schema generates
    InspectSchema(InspectSchema),

    /// Replay an operation log against a fresh registry
    Replay(Replay),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for STATS_SCHEMA and STATS_PLAYERS)
    let _ = dotenvy::dotenv();

    // RUST_LOG wins when set; otherwise log at info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = XtaskConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Command::InspectSchema(cmd) => cmd.execute(&config),
        Command::Replay(cmd) => cmd.execute(&config),
    }
}
