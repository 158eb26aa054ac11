//! Inspect a stats schema file
//!
//! Loads a schema, builds the registry and prints the generated accessor surface.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use stats_content::SchemaLoader;
use stats_core::{MemoryStore, Scope, Stats};

use crate::config::XtaskConfig;

/// Inspect the accessors generated from a schema
#[derive(Parser)]
pub struct InspectSchema {
    /// Schema file (`.json` or `.toml`); defaults to STATS_SCHEMA or stats.json
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Field names grouped by scope
    Summary,
    /// Full accessor list as JSON
    Json,
}

impl InspectSchema {
    pub fn execute(self, config: &XtaskConfig) -> Result<()> {
        let path = self.path.unwrap_or_else(|| config.schema_path.clone());
        let stats = load_registry(&path)?;

        match self.format {
            OutputFormat::Summary => print_summary(&path, &stats),
            OutputFormat::Json => print_json(&stats)?,
        }

        Ok(())
    }
}

fn load_registry(path: &Path) -> Result<Stats<MemoryStore>> {
    let schema = SchemaLoader::load(path)?;
    Stats::in_memory(schema)
        .with_context(|| format!("Failed to build registry from {}", path.display()))
}

/// Accessor surface as `{ field, shape, stat }` objects in registry order.
fn accessor_list(stats: &Stats<MemoryStore>) -> Value {
    stats
        .accessors()
        .iter()
        .map(|accessor| {
            json!({
                "field": accessor.field(),
                "shape": accessor.shape().to_string(),
                "stat": accessor.stat_id(),
            })
        })
        .collect()
}

fn print_summary(path: &Path, stats: &Stats<MemoryStore>) {
    println!("{} {}", style("Schema:").bold().cyan(), path.display());
    println!("{} {}", style("Stats:").bold().cyan(), stats.accessors().len());
    println!();

    for scope in [Scope::Player, Scope::Table] {
        let accessors: Vec<_> = stats
            .accessors()
            .iter()
            .filter(|a| a.descriptor().scope == scope)
            .collect();
        if accessors.is_empty() {
            continue;
        }

        println!("{}", style(format!("{scope} stats:")).bold().yellow());
        for accessor in accessors {
            println!(
                "  {:<32} {:<12} {}",
                accessor.field(),
                accessor.shape(),
                style(accessor.stat_id()).dim()
            );
        }
        println!();
    }
}

fn print_json(stats: &Stats<MemoryStore>) -> Result<()> {
    let json = serde_json::to_string_pretty(&accessor_list(stats))
        .context("Failed to serialize accessors to JSON")?;
    println!("{}", json);
    Ok(())
}
