//! In-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{StatsError, StatsResult};
use crate::schema::StatSchema;
use crate::store::StatsStore;
use crate::value::{StatKey, StatValue};

/// Direct `StatKey → StatValue` map with the full store contract and no
/// persistence.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    schema: Arc<StatSchema>,
    values: HashMap<StatKey, StatValue>,
}

impl MemoryStore {
    pub fn new(schema: impl Into<Arc<StatSchema>>) -> Self {
        Self {
            schema: schema.into(),
            values: HashMap::new(),
        }
    }

    /// Shared handle to the schema, for building sibling stores.
    pub fn schema_handle(&self) -> Arc<StatSchema> {
        Arc::clone(&self.schema)
    }

    /// Number of initialized keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All stored values sorted by key.
    pub fn snapshot(&self) -> Vec<(StatKey, StatValue)> {
        let mut entries: Vec<_> = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), *value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl StatsStore for MemoryStore {
    fn schema(&self) -> &StatSchema {
        &self.schema
    }

    fn init(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        self.schema.check_value(key, &value)?;
        self.values.insert(key.clone(), value);
        Ok(())
    }

    fn get(&self, key: &StatKey) -> StatsResult<StatValue> {
        self.schema.resolve(key)?;
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| StatsError::not_initialized(key))
    }

    fn set(&mut self, key: &StatKey, value: StatValue) -> StatsResult<()> {
        self.schema.check_value(key, &value)?;
        self.values.insert(key.clone(), value);
        Ok(())
    }

    fn increment(&mut self, key: &StatKey, delta: StatValue) -> StatsResult<()> {
        self.schema.check_increment(key, &delta)?;
        let slot = self
            .values
            .get_mut(key)
            .ok_or_else(|| StatsError::not_initialized(key))?;
        *slot = slot.checked_add(delta, key)?;
        Ok(())
    }
}
