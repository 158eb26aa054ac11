//! Data-driven stats content and loaders.
//!
//! This crate reads the files a game ships alongside its rules:
//! - Stat schemas (`stats.json`, or the equivalent TOML layout)
//! - Deferred operation logs handed off for later replay (JSON)
//!
//! Content is consumed by the host when building a [`stats_core::Stats`]
//! registry and never appears in the registry itself.

pub mod loaders;

pub use loaders::{LoadResult, LogLoader, SchemaFormat, SchemaLoader};
