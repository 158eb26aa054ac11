//! Stat schema loader.

use std::path::Path;

use anyhow::Context;
use stats_core::{SchemaDocument, StatSchema};

use crate::loaders::{LoadResult, read_file};

/// On-disk schema encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaFormat {
    /// `stats.json` layout:
    ///
    /// ```json
    /// { "table": { "cities captured": { "type": "int" } },
    ///   "player": { "number turns": { "type": "int" } } }
    /// ```
    Json,
    /// Same groups as TOML tables:
    ///
    /// ```toml
    /// [player."number turns"]
    /// type = "int"
    /// ```
    Toml,
}

impl SchemaFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => anyhow::bail!(
                "Unsupported schema file extension {:?} for {}",
                other,
                path.display()
            ),
        }
    }
}

/// Loader for stat schemas.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load a schema, choosing the format from the file extension.
    pub fn load(path: &Path) -> LoadResult<StatSchema> {
        let format = SchemaFormat::from_path(path)?;
        let content = read_file(path)?;
        let schema = Self::parse(&content, format)
            .with_context(|| format!("Failed to load stats schema {}", path.display()))?;
        tracing::debug!(path = %path.display(), stats = schema.len(), "loaded stats schema");
        Ok(schema)
    }

    /// Parse schema text in the given format.
    pub fn parse(content: &str, format: SchemaFormat) -> LoadResult<StatSchema> {
        let document: SchemaDocument = match format {
            SchemaFormat::Json => serde_json::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse schema JSON: {}", e))?,
            SchemaFormat::Toml => toml::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse schema TOML: {}", e))?,
        };
        Ok(StatSchema::try_from(document)?)
    }
}
