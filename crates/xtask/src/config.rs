//! xtask configuration read from the environment.
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use stats_core::ParticipantId;

/// Defaults shared by all commands; CLI flags take precedence.
#[derive(Clone, Debug)]
pub struct XtaskConfig {
    pub schema_path: PathBuf,
    pub players: Vec<ParticipantId>,
}

impl Default for XtaskConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from(Self::DEFAULT_SCHEMA),
            players: Vec::new(),
        }
    }
}

impl XtaskConfig {
    pub const DEFAULT_SCHEMA: &'static str = "stats.json";

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `STATS_SCHEMA` - Schema file path (default: `stats.json`)
    /// - `STATS_PLAYERS` - Comma-separated participant ids (default: none)
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("STATS_SCHEMA") {
            config.schema_path = PathBuf::from(path);
        }

        if let Ok(raw) = env::var("STATS_PLAYERS") {
            match parse_players(&raw) {
                Ok(players) => config.players = players,
                Err(err) => tracing::warn!("ignoring STATS_PLAYERS: {err:#}"),
            }
        }

        config
    }
}

/// Parses `5,7,9` into participant ids.
pub fn parse_players(raw: &str) -> Result<Vec<ParticipantId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map(ParticipantId)
                .with_context(|| format!("invalid participant id '{s}'"))
        })
        .collect()
}
