//! The stats registry.
//!
//! [`Stats`] owns a store and exactly one [`StatAccessor`] per schema
//! descriptor, keyed by its generated field name (`PLAYER_NUMBER_TURNS`,
//! `TABLE_CITIES_CAPTURED`, ...). The accessor set is a pure function of the
//! schema: the same schema always yields the same fields, shapes and order.
//!
//! ```
//! use stats_core::{ParticipantId, StatSchema, Stats, ValueType};
//!
//! let schema = StatSchema::builder()
//!     .player("turns", ValueType::Int)
//!     .table("citiesCaptured", ValueType::Int)
//!     .build()?;
//! let players = [ParticipantId(5), ParticipantId(7)];
//! let mut stats = Stats::for_test(schema, &players)?;
//!
//! stats.player_int("PLAYER_TURNS")?.inc(ParticipantId(7))?;
//! assert_eq!(stats.player_int("PLAYER_TURNS")?.get(ParticipantId(7))?, 1);
//! # Ok::<(), stats_core::StatsError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::accessor::{PlayerStat, StatAccessor, StatType, TableStat};
use crate::error::{StatsError, StatsResult};
use crate::log::StatLog;
use crate::schema::{Scope, StatSchema};
use crate::store::{DeferredStore, MemoryStore, StatsStore, apply_all};
use crate::value::{ParticipantId, StatKey, StatValue};

/// Typed facade over a [`StatsStore`].
#[derive(Debug)]
pub struct Stats<S> {
    store: S,
    accessors: Vec<StatAccessor>,
    by_field: HashMap<String, usize>,
}

impl<S: StatsStore> Stats<S> {
    /// Builds the accessor set from the store's schema.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Schema` when two descriptors map to the same
    /// field name (e.g. `"number turns"` and `"number_turns"`).
    pub fn new(store: S) -> StatsResult<Self> {
        let mut accessors: Vec<StatAccessor> = store
            .schema()
            .iter()
            .cloned()
            .map(StatAccessor::new)
            .collect();
        accessors.sort_by(|a, b| {
            a.descriptor()
                .surface_order()
                .cmp(&b.descriptor().surface_order())
        });

        let mut by_field = HashMap::with_capacity(accessors.len());
        for (index, accessor) in accessors.iter().enumerate() {
            if let Some(previous) = by_field.insert(accessor.field().to_owned(), index) {
                return Err(StatsError::Schema(format!(
                    "stats '{}' and '{}' both map to field {}",
                    accessors[previous].stat_id(),
                    accessor.stat_id(),
                    accessor.field()
                )));
            }
        }

        tracing::debug!(accessors = accessors.len(), "built stats registry");
        Ok(Self {
            store,
            accessors,
            by_field,
        })
    }

    pub fn schema(&self) -> &StatSchema {
        self.store.schema()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Accessor surface in deterministic order.
    pub fn accessors(&self) -> &[StatAccessor] {
        &self.accessors
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.accessors.iter().map(StatAccessor::field)
    }

    pub fn accessor(&self, field: &str) -> StatsResult<&StatAccessor> {
        self.by_field
            .get(field)
            .map(|&i| &self.accessors[i])
            .ok_or_else(|| StatsError::UnknownStat {
                stat: field.to_owned(),
            })
    }

    /// Looks up `field` and checks it has the requested scope and type.
    fn lookup<T: StatType>(&self, field: &str, scope: Scope) -> StatsResult<usize> {
        let index = *self
            .by_field
            .get(field)
            .ok_or_else(|| StatsError::UnknownStat {
                stat: field.to_owned(),
            })?;
        let descriptor = self.accessors[index].descriptor();
        if descriptor.scope != scope {
            return Err(StatsError::ScopeMismatch {
                stat: descriptor.id.clone(),
                declared: descriptor.scope,
                requested: scope,
            });
        }
        if descriptor.value_type != T::VALUE_TYPE {
            return Err(StatsError::TypeMismatch {
                stat: descriptor.id.clone(),
                expected: descriptor.value_type,
                actual: T::VALUE_TYPE,
            });
        }
        Ok(index)
    }

    /// Typed view of the table stat behind `field`.
    pub fn table<T: StatType>(&mut self, field: &str) -> StatsResult<TableStat<'_, S, T>> {
        let index = self.lookup::<T>(field, Scope::Table)?;
        let Self {
            store, accessors, ..
        } = self;
        Ok(TableStat::new(store, accessors[index].stat_id()))
    }

    /// Typed view of the player stat behind `field`.
    pub fn player<T: StatType>(&mut self, field: &str) -> StatsResult<PlayerStat<'_, S, T>> {
        let index = self.lookup::<T>(field, Scope::Player)?;
        let Self {
            store, accessors, ..
        } = self;
        Ok(PlayerStat::new(store, accessors[index].stat_id()))
    }

    pub fn table_int(&mut self, field: &str) -> StatsResult<TableStat<'_, S, i64>> {
        self.table(field)
    }

    pub fn table_float(&mut self, field: &str) -> StatsResult<TableStat<'_, S, f64>> {
        self.table(field)
    }

    pub fn table_bool(&mut self, field: &str) -> StatsResult<TableStat<'_, S, bool>> {
        self.table(field)
    }

    pub fn player_int(&mut self, field: &str) -> StatsResult<PlayerStat<'_, S, i64>> {
        self.player(field)
    }

    pub fn player_float(&mut self, field: &str) -> StatsResult<PlayerStat<'_, S, f64>> {
        self.player(field)
    }

    pub fn player_bool(&mut self, field: &str) -> StatsResult<PlayerStat<'_, S, bool>> {
        self.player(field)
    }

    /// Initializes every stat to its zero value; player stats for each id in
    /// `participants`.
    pub fn init_all(&mut self, participants: &[ParticipantId]) -> StatsResult<()> {
        let Self {
            store, accessors, ..
        } = self;
        for accessor in accessors.iter() {
            accessor.init_zero(store, participants)?;
        }
        tracing::debug!(
            stats = accessors.len(),
            participants = participants.len(),
            "initialized all stats"
        );
        Ok(())
    }

    /// Current value of every stat, read through the store, in accessor order.
    pub fn snapshot(
        &self,
        participants: &[ParticipantId],
    ) -> StatsResult<Vec<(StatKey, StatValue)>> {
        let mut values = Vec::new();
        for accessor in &self.accessors {
            match accessor.descriptor().scope {
                Scope::Table => {
                    let key = StatKey::table(accessor.stat_id());
                    let value = self.store.get(&key)?;
                    values.push((key, value));
                }
                Scope::Player => {
                    for &p in participants {
                        let key = StatKey::player(accessor.stat_id(), p);
                        let value = self.store.get(&key)?;
                        values.push((key, value));
                    }
                }
            }
        }
        Ok(values)
    }

    pub fn enter_deferred(&mut self) {
        self.store.enter_deferred();
    }

    pub fn exit_deferred(&mut self) -> StatLog {
        self.store.exit_deferred()
    }

    pub fn is_deferred(&self) -> bool {
        self.store.is_deferred()
    }

    /// Replays `log` onto this registry's store.
    ///
    /// While the store is buffering, the replayed operations are buffered
    /// again rather than committed.
    pub fn apply_all(&mut self, log: &StatLog) -> StatsResult<()> {
        apply_all(log, &mut self.store)
    }
}

impl Stats<MemoryStore> {
    pub fn in_memory(schema: impl Into<Arc<StatSchema>>) -> StatsResult<Self> {
        Self::new(MemoryStore::new(schema))
    }

    /// In-memory registry with every stat zero-initialized.
    pub fn for_test(
        schema: impl Into<Arc<StatSchema>>,
        participants: &[ParticipantId],
    ) -> StatsResult<Self> {
        let mut stats = Self::in_memory(schema)?;
        stats.init_all(participants)?;
        Ok(stats)
    }
}

impl<S: StatsStore> Stats<DeferredStore<S>> {
    /// Registry whose writes can be buffered with [`Stats::enter_deferred`].
    pub fn deferred(inner: S) -> StatsResult<Self> {
        Self::new(DeferredStore::new(inner))
    }
}
