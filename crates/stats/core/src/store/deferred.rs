//! Deferred-write overlay.
//!
//! [`DeferredStore`] wraps another store and has two modes:
//!
//! - [`DeferredMode::Direct`]: every operation forwards to the wrapped store
//! - [`DeferredMode::Buffering`]: `set` and `increment` are validated and
//!   appended to a [`StatLog`] instead of being applied; `get` folds the log
//!   over the wrapped store's value so reads see the buffered writes
//!
//! `init` always passes through, since it establishes the baseline the log is
//! folded against. Buffering is not nestable: entering while already
//! buffering keeps the current log untouched.

use crate::error::{StatsError, StatsResult};
use crate::log::{OpKind, Operation, StatLog};
use crate::schema::StatSchema;
use crate::store::StatsStore;
use crate::value::{StatKey, StatValue};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeferredMode {
    #[default]
    Direct,
    Buffering,
}

/// Overlay that records writes instead of committing them while buffering.
#[derive(Clone, Debug)]
pub struct DeferredStore<S> {
    inner: S,
    mode: DeferredMode,
    log: StatLog,
}

impl<S: StatsStore> DeferredStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            mode: DeferredMode::Direct,
            log: StatLog::new(),
        }
    }

    pub fn mode(&self) -> DeferredMode {
        self.mode
    }

    /// Wrapped store, bypassing the overlay.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwraps the overlay. Any buffered operations are discarded.
    pub fn into_inner(self) -> S {
        if !self.log.is_empty() {
            tracing::debug!(
                discarded = self.log.len(),
                "dropping deferred overlay with buffered operations"
            );
        }
        self.inner
    }

    /// Operations buffered so far in the current session.
    pub fn pending(&self) -> &StatLog {
        &self.log
    }

    fn is_buffering(&self) -> bool {
        self.mode == DeferredMode::Buffering
    }

    /// Wrapped value with every buffered operation on `key` applied in order.
    ///
    /// A buffered `Set` may provide the value of a key the wrapped store has
    /// never seen.
    fn fold(&self, key: &StatKey) -> StatsResult<StatValue> {
        let mut current = match self.inner.get(key) {
            Ok(value) => Some(value),
            Err(StatsError::NotInitialized { .. }) => None,
            Err(err) => return Err(err),
        };

        for op in self.log.for_key(key) {
            current = Some(match (op.kind, current) {
                (OpKind::Set, _) => op.value,
                (OpKind::Increment, Some(value)) => value.checked_add(op.value, key)?,
                (OpKind::Increment, None) => return Err(StatsError::not_initialized(key)),
            });
        }

        current.ok_or_else(|| StatsError::not_initialized(key))
    }
}

impl<S: StatsStore> StatsStore for DeferredStore<S> {
    fn schema(&self) -> &StatSchema {
        self.inner.schema()
    }

    fn init(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        self.inner.init(key, value)
    }

    fn get(&self, key: &StatKey) -> StatsResult<StatValue> {
        if self.is_buffering() {
            self.fold(key)
        } else {
            self.inner.get(key)
        }
    }

    fn set(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        if !self.is_buffering() {
            return self.inner.set(key, value);
        }
        self.schema().check_value(key, &value)?;
        tracing::trace!(%key, %value, "buffered set");
        self.log.push(Operation::set(key.clone(), value));
        Ok(())
    }

    fn increment(&mut self, key: &StatKey, delta: StatValue) -> StatsResult<()> {
        if !self.is_buffering() {
            return self.inner.increment(key, delta);
        }
        self.schema().check_increment(key, &delta)?;
        self.fold(key)?.checked_add(delta, key)?;
        tracing::trace!(%key, %delta, "buffered increment");
        self.log.push(Operation::increment(key.clone(), delta));
        Ok(())
    }

    fn enter_deferred(&mut self) {
        if self.is_buffering() {
            tracing::warn!(
                pending = self.log.len(),
                "enter_deferred called while already buffering; keeping current log"
            );
            return;
        }
        tracing::debug!("entering deferred stats mode");
        self.mode = DeferredMode::Buffering;
    }

    fn exit_deferred(&mut self) -> StatLog {
        if !self.is_buffering() {
            return StatLog::new();
        }
        self.mode = DeferredMode::Direct;
        let log = std::mem::take(&mut self.log);
        tracing::debug!(operations = log.len(), "leaving deferred stats mode");
        log
    }

    fn is_deferred(&self) -> bool {
        self.is_buffering()
    }
}
