//! Replay a deferred operation log
//!
//! Builds a zero-initialized registry from a schema, replays a JSON operation
//! log onto it and prints the resulting values.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use stats_content::{LogLoader, SchemaLoader};
use stats_core::{MemoryStore, ParticipantId, StatKey, StatValue, Stats};

use crate::config::{XtaskConfig, parse_players};

/// Replay an operation log against a fresh registry
#[derive(Parser)]
pub struct Replay {
    /// Operation log exported from a deferred session (JSON)
    #[arg(short, long, value_name = "LOG")]
    log: PathBuf,

    /// Schema file; defaults to STATS_SCHEMA or stats.json
    #[arg(short, long, value_name = "PATH")]
    schema: Option<PathBuf>,

    /// Comma-separated participant ids (e.g. 5,7); defaults to STATS_PLAYERS
    #[arg(short, long, value_name = "IDS")]
    players: Option<String>,

    /// Preview the log through a deferred overlay before committing it
    #[arg(long)]
    deferred: bool,
}

impl Replay {
    pub fn execute(self, config: &XtaskConfig) -> Result<()> {
        let committed = self.run(config)?;

        println!("{}", style("=== Committed Values ===").bold().green());
        print_values(&committed);

        Ok(())
    }

    /// Replays the log and returns every committed value in accessor order.
    fn run(&self, config: &XtaskConfig) -> Result<Vec<(StatKey, StatValue)>> {
        let schema_path = self
            .schema
            .clone()
            .unwrap_or_else(|| config.schema_path.clone());
        let players = match &self.players {
            Some(raw) => parse_players(raw)?,
            None => config.players.clone(),
        };

        let schema = SchemaLoader::load(&schema_path)?;
        let log = LogLoader::load(&self.log)?;

        let mut stats = Stats::deferred(MemoryStore::new(schema))?;
        stats.init_all(&players)?;

        println!("{} {}", style("Schema:").bold().cyan(), schema_path.display());
        println!(
            "{} {} ({} operations)",
            style("Log:").bold().cyan(),
            self.log.display(),
            log.len()
        );
        println!("{} {}", style("Players:").bold().cyan(), format_players(&players));
        println!();

        if self.deferred {
            stats.enter_deferred();
            stats
                .apply_all(&log)
                .with_context(|| format!("Failed to buffer {}", self.log.display()))?;

            println!("{}", style("=== Deferred Preview ===").bold().green());
            print_values(&stats.snapshot(&players)?);
            println!();

            let buffered = stats.exit_deferred();
            tracing::info!(operations = buffered.len(), "committing buffered operations");
            stats.apply_all(&buffered)?;
        } else {
            stats
                .apply_all(&log)
                .with_context(|| format!("Failed to replay {}", self.log.display()))?;
        }

        Ok(stats.snapshot(&players)?)
    }
}

fn print_values(values: &[(StatKey, StatValue)]) {
    for (key, value) in values {
        println!("  {:<40} {}", key.to_string(), value);
    }
}

fn format_players(players: &[ParticipantId]) -> String {
    if players.is_empty() {
        return "none".to_owned();
    }
    players
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
