//! Deferred operation log files.
//!
//! A log exported by [`stats_core::Stats::exit_deferred`] is written as a
//! JSON array so it can be replayed later, possibly by another process.

use std::path::Path;

use anyhow::Context;
use stats_core::StatLog;

use crate::loaders::{LoadResult, read_file};

/// Loader and writer for JSON operation logs.
pub struct LogLoader;

impl LogLoader {
    /// Load an operation log from a JSON file.
    pub fn load(path: &Path) -> LoadResult<StatLog> {
        let content = read_file(path)?;
        let log: StatLog = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse operation log {}", path.display()))?;
        tracing::debug!(path = %path.display(), operations = log.len(), "loaded operation log");
        Ok(log)
    }

    /// Write an operation log as pretty-printed JSON.
    pub fn save(path: &Path, log: &StatLog) -> LoadResult<()> {
        let json = serde_json::to_string_pretty(log)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write operation log {}", path.display()))
    }
}
