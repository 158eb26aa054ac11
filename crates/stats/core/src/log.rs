//! Deferred operation log.
//!
//! A [`StatLog`] is the ordered record of writes buffered by a
//! [`DeferredStore`](crate::DeferredStore). Order is significant: folding on
//! read and replay through [`apply_all`](crate::apply_all) both walk the log
//! in insertion order.

use core::fmt;

use crate::value::{StatKey, StatValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OpKind {
    Set,
    Increment,
}

/// One buffered write.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operation {
    pub kind: OpKind,
    pub key: StatKey,
    pub value: StatValue,
}

impl Operation {
    pub fn set(key: StatKey, value: StatValue) -> Self {
        Self {
            kind: OpKind::Set,
            key,
            value,
        }
    }

    pub fn increment(key: StatKey, delta: StatValue) -> Self {
        Self {
            kind: OpKind::Increment,
            key,
            value: delta,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpKind::Set => write!(f, "set {} = {}", self.key, self.value),
            OpKind::Increment => write!(f, "inc {} += {}", self.key, self.value),
        }
    }
}

/// Ordered sequence of buffered operations.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatLog {
    operations: Vec<Operation>,
}

impl StatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    pub fn as_slice(&self) -> &[Operation] {
        &self.operations
    }

    /// Operations addressing exactly `key` (same stat and participant), in order.
    pub fn for_key<'a>(&'a self, key: &'a StatKey) -> impl Iterator<Item = &'a Operation> + 'a {
        self.operations.iter().filter(move |op| op.key == *key)
    }

    pub fn into_vec(self) -> Vec<Operation> {
        self.operations
    }
}

impl From<Vec<Operation>> for StatLog {
    fn from(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

impl FromIterator<Operation> for StatLog {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for StatLog {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a StatLog {
    type Item = &'a Operation;
    type IntoIter = core::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
