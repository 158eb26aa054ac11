//! Typed accessors.
//!
//! Each stat is exposed through one of six shapes, {table, player} × {int,
//! float, bool}. The value type is a Rust type parameter (`i64`, `f64`,
//! `bool`) and the scope selects between [`TableStat`] and [`PlayerStat`].
//! Views hold nothing but a store borrow and the stat id; scope, type and
//! initialization rules are enforced by the store.

use core::fmt;
use core::marker::PhantomData;

use crate::error::{StatsError, StatsResult};
use crate::schema::{Scope, StatDescriptor, ValueType};
use crate::store::StatsStore;
use crate::value::{ParticipantId, StatKey, StatValue};

mod sealed {
    pub trait Sealed {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
}

/// Rust type carried by a stat.
pub trait StatType: sealed::Sealed + Copy + Into<StatValue> + fmt::Debug {
    const VALUE_TYPE: ValueType;

    /// Default initial value: `0`, `0.0` or `false`.
    fn zero() -> Self;

    fn from_value(value: StatValue) -> Option<Self>;
}

/// Stat types that support `increment`.
pub trait NumericStat: StatType {}

impl StatType for i64 {
    const VALUE_TYPE: ValueType = ValueType::Int;

    fn zero() -> Self {
        0
    }

    fn from_value(value: StatValue) -> Option<Self> {
        value.as_int()
    }
}

impl StatType for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn zero() -> Self {
        0.0
    }

    fn from_value(value: StatValue) -> Option<Self> {
        value.as_float()
    }
}

impl StatType for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn zero() -> Self {
        false
    }

    fn from_value(value: StatValue) -> Option<Self> {
        value.as_bool()
    }
}

impl NumericStat for i64 {}
impl NumericStat for f64 {}

fn decode<T: StatType>(stat: &str, value: StatValue) -> StatsResult<T> {
    T::from_value(value).ok_or_else(|| StatsError::TypeMismatch {
        stat: stat.to_owned(),
        expected: T::VALUE_TYPE,
        actual: value.value_type(),
    })
}

/// `(scope, value type)` pair naming one of the six accessor shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessorShape {
    pub scope: Scope,
    pub value_type: ValueType,
}

impl fmt::Display for AccessorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = match self.value_type {
            ValueType::Int => "Int",
            ValueType::Float => "Float",
            ValueType::Bool => "Bool",
        };
        let scope = match self.scope {
            Scope::Table => "Table",
            Scope::Player => "Player",
        };
        write!(f, "{ty}{scope}")
    }
}

/// Registry entry for one descriptor: its field name and shape.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatAccessor {
    field: String,
    descriptor: StatDescriptor,
}

impl StatAccessor {
    pub fn new(descriptor: StatDescriptor) -> Self {
        Self {
            field: descriptor.field_name(),
            descriptor,
        }
    }

    /// Generated field name, e.g. `TABLE_CITIES_CAPTURED`.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn stat_id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &StatDescriptor {
        &self.descriptor
    }

    pub fn shape(&self) -> AccessorShape {
        AccessorShape {
            scope: self.descriptor.scope,
            value_type: self.descriptor.value_type,
        }
    }

    /// Zero-initializes the stat, for every id in `participants` when
    /// player-scoped.
    pub(crate) fn init_zero<S: StatsStore + ?Sized>(
        &self,
        store: &mut S,
        participants: &[ParticipantId],
    ) -> StatsResult<()> {
        let zero = StatValue::zero(self.descriptor.value_type);
        match self.descriptor.scope {
            Scope::Table => store.init(&StatKey::table(self.stat_id()), zero),
            Scope::Player => participants
                .iter()
                .try_for_each(|&p| store.init(&StatKey::player(self.stat_id(), p), zero)),
        }
    }
}

/// Typed view of a table stat.
pub struct TableStat<'a, S: ?Sized, T> {
    store: &'a mut S,
    stat: &'a str,
    _value: PhantomData<T>,
}

impl<'a, S: StatsStore + ?Sized, T: StatType> TableStat<'a, S, T> {
    /// Binds a view to `store` for the stat named `stat`.
    pub fn new(store: &'a mut S, stat: &'a str) -> Self {
        Self {
            store,
            stat,
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.stat
    }

    fn key(&self) -> StatKey {
        StatKey::table(self.stat)
    }

    pub fn get(&self) -> StatsResult<T> {
        decode(self.stat, self.store.get(&self.key())?)
    }

    pub fn set(&mut self, value: T) -> StatsResult<()> {
        let key = self.key();
        self.store.set(&key, value.into())
    }

    pub fn init(&mut self, value: T) -> StatsResult<()> {
        let key = self.key();
        self.store.init(&key, value.into())
    }

    pub fn init_zero(&mut self) -> StatsResult<()> {
        self.init(T::zero())
    }
}

impl<S: StatsStore + ?Sized, T: NumericStat> TableStat<'_, S, T> {
    pub fn increment(&mut self, delta: T) -> StatsResult<()> {
        let key = self.key();
        self.store.increment(&key, delta.into())
    }
}

impl<S: StatsStore + ?Sized> TableStat<'_, S, i64> {
    /// Increments by one.
    pub fn inc(&mut self) -> StatsResult<()> {
        self.increment(1)
    }
}

impl<S: StatsStore + ?Sized> TableStat<'_, S, f64> {
    pub fn add(&mut self, delta: f64) -> StatsResult<()> {
        self.increment(delta)
    }
}

/// Typed view of a player stat. Every operation names the participant.
pub struct PlayerStat<'a, S: ?Sized, T> {
    store: &'a mut S,
    stat: &'a str,
    _value: PhantomData<T>,
}

impl<'a, S: StatsStore + ?Sized, T: StatType> PlayerStat<'a, S, T> {
    /// Binds a view to `store` for the stat named `stat`.
    pub fn new(store: &'a mut S, stat: &'a str) -> Self {
        Self {
            store,
            stat,
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.stat
    }

    fn key(&self, participant: ParticipantId) -> StatKey {
        StatKey::player(self.stat, participant)
    }

    pub fn get(&self, participant: ParticipantId) -> StatsResult<T> {
        decode(self.stat, self.store.get(&self.key(participant))?)
    }

    pub fn set(&mut self, participant: ParticipantId, value: T) -> StatsResult<()> {
        let key = self.key(participant);
        self.store.set(&key, value.into())
    }

    /// Initializes every participant in `participants` to `value`.
    pub fn init(&mut self, participants: &[ParticipantId], value: T) -> StatsResult<()> {
        self.init_map(participants, |_| value)
    }

    pub fn init_zero(&mut self, participants: &[ParticipantId]) -> StatsResult<()> {
        self.init(participants, T::zero())
    }

    /// Initializes each participant to a value computed from its id.
    pub fn init_map<F>(&mut self, participants: &[ParticipantId], mut f: F) -> StatsResult<()>
    where
        F: FnMut(ParticipantId) -> T,
    {
        for &participant in participants {
            let key = self.key(participant);
            self.store.init(&key, f(participant).into())?;
        }
        Ok(())
    }
}

impl<S: StatsStore + ?Sized, T: NumericStat> PlayerStat<'_, S, T> {
    pub fn increment(&mut self, participant: ParticipantId, delta: T) -> StatsResult<()> {
        let key = self.key(participant);
        self.store.increment(&key, delta.into())
    }
}

impl<S: StatsStore + ?Sized> PlayerStat<'_, S, i64> {
    /// Increments `participant`'s value by one.
    pub fn inc(&mut self, participant: ParticipantId) -> StatsResult<()> {
        self.increment(participant, 1)
    }
}

impl<S: StatsStore + ?Sized> PlayerStat<'_, S, f64> {
    pub fn add(&mut self, participant: ParticipantId, delta: f64) -> StatsResult<()> {
        self.increment(participant, delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StatSchema;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::new(
            StatSchema::builder()
                .player("rating", ValueType::Float)
                .table("suddenDeath", ValueType::Bool)
                .table("averagePieces", ValueType::Float)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn shape_names_follow_type_then_scope() {
        let accessor = StatAccessor::new(StatDescriptor::player("rating", ValueType::Float));
        assert_eq!(accessor.shape().to_string(), "FloatPlayer");
        assert_eq!(accessor.field(), "PLAYER_RATING");
    }

    #[test]
    fn table_float_add_accumulates() {
        let mut store = store();
        let mut stat = TableStat::<_, f64>::new(&mut store, "averagePieces");
        assert_eq!(stat.name(), "averagePieces");
        stat.init_zero().unwrap();
        stat.set(2.1).unwrap();
        stat.add(3.0).unwrap();
        stat.add(5.7).unwrap();
        assert!((stat.get().unwrap() - 10.8).abs() < 1e-9);
    }

    #[test]
    fn view_with_wrong_type_reports_mismatch() {
        let mut store = store();
        TableStat::<_, bool>::new(&mut store, "suddenDeath")
            .init_zero()
            .unwrap();
        let err = TableStat::<_, i64>::new(&mut store, "suddenDeath")
            .get()
            .unwrap_err();
        assert_eq!(
            err,
            StatsError::TypeMismatch {
                stat: "suddenDeath".into(),
                expected: ValueType::Int,
                actual: ValueType::Bool,
            }
        );
    }

    #[test]
    fn player_init_map_computes_per_participant() {
        let mut store = store();
        let ids = [ParticipantId(2), ParticipantId(3)];
        let mut rating = PlayerStat::<_, f64>::new(&mut store, "rating");
        assert_eq!(rating.name(), "rating");
        rating.init_map(&ids, |p| p.0 as f64 * 0.5).unwrap();
        assert_eq!(rating.get(ParticipantId(2)), Ok(1.0));
        assert_eq!(rating.get(ParticipantId(3)), Ok(1.5));
    }
}
