//! The store contract and its implementations.
//!
//! Every implementation validates keys and values against its
//! [`StatSchema`] before touching state, so accessors stay thin forwarding
//! layers:
//!
//! - [`BackedStore`]: forwards to a host persistence collaborator
//! - [`MemoryStore`]: plain map, used by tests and tooling
//! - [`DeferredStore`]: overlay that buffers writes and folds them on read
mod backed;
mod deferred;
mod memory;

pub use backed::{BackedStore, StatsBackend};
pub use deferred::{DeferredMode, DeferredStore};
pub use memory::MemoryStore;

use crate::error::{StatsError, StatsResult};
use crate::log::{OpKind, Operation, StatLog};
use crate::schema::StatSchema;
use crate::value::{StatKey, StatValue};

/// Primitive stat operations shared by every store.
///
/// # Contract
///
/// - `init` establishes a key's starting value and may be repeated
/// - `get` fails with `NotInitialized` for keys never initialized or set
/// - `set` fails with `TypeMismatch` when the value's tag is not the declared type
/// - `increment` fails with `UnsupportedOperation` on bool stats
/// - every operation fails with `ScopeMismatch` when the participant does not
///   match the declared scope, and with `UnknownStat` for undeclared ids
pub trait StatsStore {
    /// Schema this store validates against.
    fn schema(&self) -> &StatSchema;

    fn init(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()>;

    fn get(&self, key: &StatKey) -> StatsResult<StatValue>;

    fn set(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()>;

    fn increment(&mut self, key: &StatKey, delta: StatValue) -> StatsResult<()>;

    /// Starts buffering writes. No-op for stores that always commit.
    fn enter_deferred(&mut self) {}

    /// Stops buffering and hands back the buffered writes.
    ///
    /// Stores that always commit return an empty log.
    fn exit_deferred(&mut self) -> StatLog {
        StatLog::new()
    }

    fn is_deferred(&self) -> bool {
        false
    }

    /// Applies a single logged operation through `set` / `increment`.
    fn apply(&mut self, operation: &Operation) -> StatsResult<()> {
        match operation.kind {
            OpKind::Set => self.set(&operation.key, operation.value),
            OpKind::Increment => self.increment(&operation.key, operation.value),
        }
    }
}

impl<S: StatsStore + ?Sized> StatsStore for &mut S {
    fn schema(&self) -> &StatSchema {
        (**self).schema()
    }

    fn init(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        (**self).init(key, value)
    }

    fn get(&self, key: &StatKey) -> StatsResult<StatValue> {
        (**self).get(key)
    }

    fn set(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        (**self).set(key, value)
    }

    fn increment(&mut self, key: &StatKey, delta: StatValue) -> StatsResult<()> {
        (**self).increment(key, delta)
    }

    fn enter_deferred(&mut self) {
        (**self).enter_deferred()
    }

    fn exit_deferred(&mut self) -> StatLog {
        (**self).exit_deferred()
    }

    fn is_deferred(&self) -> bool {
        (**self).is_deferred()
    }
}

impl<S: StatsStore + ?Sized> StatsStore for Box<S> {
    fn schema(&self) -> &StatSchema {
        (**self).schema()
    }

    fn init(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        (**self).init(key, value)
    }

    fn get(&self, key: &StatKey) -> StatsResult<StatValue> {
        (**self).get(key)
    }

    fn set(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        (**self).set(key, value)
    }

    fn increment(&mut self, key: &StatKey, delta: StatValue) -> StatsResult<()> {
        (**self).increment(key, delta)
    }

    fn enter_deferred(&mut self) {
        (**self).enter_deferred()
    }

    fn exit_deferred(&mut self) -> StatLog {
        (**self).exit_deferred()
    }

    fn is_deferred(&self) -> bool {
        (**self).is_deferred()
    }
}

/// Replays `log` onto `target` in recorded order.
///
/// The target may be a different store from the one that recorded the log.
/// Replay stops at the first failing operation; operations before it stay
/// applied.
///
/// # Errors
///
/// Returns `StatsError::Replay` carrying the index of the failed operation
/// and the error the target reported.
pub fn apply_all<S: StatsStore + ?Sized>(log: &StatLog, target: &mut S) -> StatsResult<()> {
    tracing::debug!(operations = log.len(), "replaying stat log");
    for (index, operation) in log.iter().enumerate() {
        target
            .apply(operation)
            .map_err(|source| StatsError::Replay {
                index,
                source: Box::new(source),
            })?;
    }
    Ok(())
}
