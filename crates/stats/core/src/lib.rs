//! Schema-driven typed statistics with a deferred-write overlay.
//!
//! `stats-core` turns a declarative list of table and player statistics into
//! typed accessors over a [`StatsStore`]. All reads and writes flow through the
//! store contract, so the same registry works against a host persistence
//! layer ([`BackedStore`]), an in-memory map ([`MemoryStore`]), or a
//! [`DeferredStore`] that records writes instead of committing them.
//!
//! # Architecture
//!
//! - [`StatSchema`]: immutable set of [`StatDescriptor`]s
//! - [`StatValue`] / [`StatKey`]: tagged values addressed by stat + participant
//! - [`StatsStore`]: `init` / `get` / `set` / `increment` plus deferred hooks
//! - [`TableStat`] / [`PlayerStat`]: typed views bound to one stat id
//! - [`Stats`]: registry owning one accessor per descriptor
pub mod accessor;
pub mod error;
pub mod log;
pub mod registry;
pub mod schema;
pub mod store;
pub mod value;

pub use accessor::{AccessorShape, NumericStat, PlayerStat, StatAccessor, StatType, TableStat};
pub use error::{ErrorSeverity, StatsError, StatsResult};
pub use log::{OpKind, Operation, StatLog};
pub use registry::Stats;
#[cfg(feature = "serde")]
pub use schema::{SchemaDocument, SchemaEntry};
pub use schema::{Scope, SchemaBuilder, StatDescriptor, StatSchema, ValueType, field_name};
pub use store::{
    BackedStore, DeferredMode, DeferredStore, MemoryStore, StatsBackend, StatsStore, apply_all,
};
pub use value::{ParticipantId, StatKey, StatValue};
