//! Store backed by the host's persistence layer.

use core::fmt;
use std::sync::Arc;

use crate::error::{StatsError, StatsResult};
use crate::schema::StatSchema;
use crate::store::StatsStore;
use crate::value::{ParticipantId, StatKey, StatValue};

/// Persistence primitives supplied by the host.
///
/// Implementations only store and load values; scope, type and
/// initialization rules are enforced by [`BackedStore`] before any call
/// reaches the backend. `get_*` returns `None` for values never written.
pub trait StatsBackend {
    type Error: fmt::Display;

    fn init_table(&mut self, name: &str, value: StatValue) -> Result<(), Self::Error>;
    fn init_player(
        &mut self,
        name: &str,
        player: ParticipantId,
        value: StatValue,
    ) -> Result<(), Self::Error>;

    fn get_table(&self, name: &str) -> Result<Option<StatValue>, Self::Error>;
    fn get_player(&self, name: &str, player: ParticipantId)
    -> Result<Option<StatValue>, Self::Error>;

    fn set_table(&mut self, name: &str, value: StatValue) -> Result<(), Self::Error>;
    fn set_player(
        &mut self,
        name: &str,
        player: ParticipantId,
        value: StatValue,
    ) -> Result<(), Self::Error>;

    fn inc_table(&mut self, name: &str, delta: StatValue) -> Result<(), Self::Error>;
    fn inc_player(
        &mut self,
        name: &str,
        player: ParticipantId,
        delta: StatValue,
    ) -> Result<(), Self::Error>;
}

/// Validating adapter from [`StatsStore`] to a [`StatsBackend`].
pub struct BackedStore<B> {
    schema: Arc<StatSchema>,
    backend: B,
}

impl<B: StatsBackend> BackedStore<B> {
    pub fn new(schema: impl Into<Arc<StatSchema>>, backend: B) -> Self {
        Self {
            schema: schema.into(),
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn load(&self, key: &StatKey) -> StatsResult<StatValue> {
        let descriptor = self.schema.resolve(key)?;
        let stored = match key.participant {
            Some(player) => self.backend.get_player(&key.stat, player),
            None => self.backend.get_table(&key.stat),
        }
        .map_err(backend_error)?
        .ok_or_else(|| StatsError::not_initialized(key))?;

        if stored.value_type() != descriptor.value_type {
            return Err(StatsError::Backend(format!(
                "backend returned {} for {} stat {}",
                stored.value_type(),
                descriptor.value_type,
                key
            )));
        }
        Ok(stored)
    }
}

impl<B> fmt::Debug for BackedStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackedStore")
            .field("stats", &self.schema.len())
            .finish_non_exhaustive()
    }
}

fn backend_error(err: impl fmt::Display) -> StatsError {
    StatsError::Backend(err.to_string())
}

impl<B: StatsBackend> StatsStore for BackedStore<B> {
    fn schema(&self) -> &StatSchema {
        &self.schema
    }

    fn init(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        self.schema.check_value(key, &value)?;
        match key.participant {
            Some(player) => self.backend.init_player(&key.stat, player, value),
            None => self.backend.init_table(&key.stat, value),
        }
        .map_err(backend_error)
    }

    fn get(&self, key: &StatKey) -> StatsResult<StatValue> {
        self.load(key)
    }

    fn set(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        self.schema.check_value(key, &value)?;
        match key.participant {
            Some(player) => self.backend.set_player(&key.stat, player, value),
            None => self.backend.set_table(&key.stat, value),
        }
        .map_err(backend_error)
    }

    fn increment(&mut self, key: &StatKey, delta: StatValue) -> StatsResult<()> {
        self.schema.check_increment(key, &delta)?;
        // Backend performs the addition; overflow and missing init are
        // detected before it sees the delta.
        self.load(key)?.checked_add(delta, key)?;
        match key.participant {
            Some(player) => self.backend.inc_player(&key.stat, player, delta),
            None => self.backend.inc_table(&key.stat, delta),
        }
        .map_err(backend_error)
    }
}
