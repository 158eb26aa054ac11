//! Stat values and the keys that address them.

use core::fmt;

use crate::error::{StatsError, StatsResult};
use crate::schema::{Scope, ValueType};

/// Identifier of a match participant (a player seat).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParticipantId(pub u64);

impl From<u64> for ParticipantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scope-qualified identity of a stored value.
///
/// Table stats are addressed without a participant, player stats with one.
/// Whether that matches the declared scope is checked by the store against
/// its schema, never defaulted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatKey {
    pub stat: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub participant: Option<ParticipantId>,
}

impl StatKey {
    pub fn table(stat: impl Into<String>) -> Self {
        Self {
            stat: stat.into(),
            participant: None,
        }
    }

    pub fn player(stat: impl Into<String>, participant: ParticipantId) -> Self {
        Self {
            stat: stat.into(),
            participant: Some(participant),
        }
    }

    /// Scope this key addresses, implied by the presence of a participant.
    pub const fn scope(&self) -> Scope {
        match self.participant {
            Some(_) => Scope::Player,
            None => Scope::Table,
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.participant {
            Some(p) => write!(f, "{}[{}]", self.stat, p),
            None => write!(f, "{}", self.stat),
        }
    }
}

/// Current value of a stat.
///
/// The tag always matches the descriptor's [`ValueType`]. Arithmetic checks
/// tags before acting and never coerces between them.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl StatValue {
    /// Zero value for a type: `0`, `0.0` or `false`.
    pub const fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Int => Self::Int(0),
            ValueType::Float => Self::Float(0.0),
            ValueType::Bool => Self::Bool(false),
        }
    }

    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Adds `delta` to this value on behalf of `key`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` when the value is a bool
    /// - `TypeMismatch` when `delta` carries a different tag
    /// - `Overflow` when integer addition leaves the `i64` range
    pub fn checked_add(self, delta: StatValue, key: &StatKey) -> StatsResult<StatValue> {
        match (self, delta) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_add(b)
                .map(Self::Int)
                .ok_or_else(|| StatsError::Overflow { key: key.clone() }),
            (Self::Float(a), Self::Float(b)) => Ok(Self::Float(a + b)),
            (Self::Bool(_), _) => Err(StatsError::UnsupportedOperation {
                stat: key.stat.clone(),
                operation: "increment",
                value_type: ValueType::Bool,
            }),
            (current, delta) => Err(StatsError::TypeMismatch {
                stat: key.stat.clone(),
                expected: current.value_type(),
                actual: delta.value_type(),
            }),
        }
    }
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for StatValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}
