//! Declarative stat descriptors.
//!
//! A [`StatSchema`] is loaded once at startup and never mutated. Stores
//! validate every key and value against it, and the registry derives its
//! accessor surface from it.

use std::collections::HashMap;

use strum::Display;

use crate::error::{StatsError, StatsResult};
use crate::value::{StatKey, StatValue};

/// Whether a stat is tracked for the whole match or per participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Scope {
    Table,
    Player,
}

impl Scope {
    /// Prefix of accessor field names for this scope.
    pub const fn field_prefix(&self) -> &'static str {
        match self {
            Self::Table => "TABLE",
            Self::Player => "PLAYER",
        }
    }

    const fn surface_rank(&self) -> u8 {
        match self {
            Self::Player => 0,
            Self::Table => 1,
        }
    }
}

/// Declared value type of a stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueType {
    Int,
    Float,
    Bool,
}

impl ValueType {
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

/// One named metric.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatDescriptor {
    pub id: String,
    pub scope: Scope,
    pub value_type: ValueType,
}

impl StatDescriptor {
    pub fn new(id: impl Into<String>, scope: Scope, value_type: ValueType) -> Self {
        Self {
            id: id.into(),
            scope,
            value_type,
        }
    }

    pub fn table(id: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(id, Scope::Table, value_type)
    }

    pub fn player(id: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(id, Scope::Player, value_type)
    }

    /// Accessor field name, e.g. `PLAYER_NUMBER_TURNS`.
    pub fn field_name(&self) -> String {
        field_name(self.scope, &self.id)
    }

    /// Ordering of the accessor surface: player before table, then int,
    /// float, bool, then by id.
    pub(crate) fn surface_order(&self) -> (u8, ValueType, &str) {
        (self.scope.surface_rank(), self.value_type, self.id.as_str())
    }
}

/// Builds the accessor field name for a stat: `<SCOPE>_<ID>`, uppercased,
/// with every character outside `[A-Za-z0-9]` replaced by `_`.
pub fn field_name(scope: Scope, id: &str) -> String {
    let mut name = String::with_capacity(scope.field_prefix().len() + 1 + id.len());
    name.push_str(scope.field_prefix());
    name.push('_');
    name.extend(id.chars().map(|c| {
        if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        }
    }));
    name
}

/// Immutable set of stat descriptors, unique by `(scope, id)`.
#[derive(Clone, Debug, Default)]
pub struct StatSchema {
    descriptors: Vec<StatDescriptor>,
    table: HashMap<String, usize>,
    player: HashMap<String, usize>,
}

impl StatSchema {
    /// Builds a schema from descriptors, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Schema` for empty ids or a repeated `(scope, id)`.
    pub fn new(descriptors: impl IntoIterator<Item = StatDescriptor>) -> StatsResult<Self> {
        let mut schema = Self::default();
        for descriptor in descriptors {
            if descriptor.id.trim().is_empty() {
                return Err(StatsError::Schema(format!(
                    "{} stat with an empty id",
                    descriptor.scope
                )));
            }
            let index = schema.descriptors.len();
            let slot = match descriptor.scope {
                Scope::Table => &mut schema.table,
                Scope::Player => &mut schema.player,
            };
            if slot.insert(descriptor.id.clone(), index).is_some() {
                return Err(StatsError::Schema(format!(
                    "duplicate {} stat '{}'",
                    descriptor.scope, descriptor.id
                )));
            }
            schema.descriptors.push(descriptor);
        }
        Ok(schema)
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn descriptors(&self) -> &[StatDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptor(&self, scope: Scope, id: &str) -> Option<&StatDescriptor> {
        let index = match scope {
            Scope::Table => self.table.get(id),
            Scope::Player => self.player.get(id),
        };
        index.map(|&i| &self.descriptors[i])
    }

    /// Finds the descriptor a key addresses.
    ///
    /// # Errors
    ///
    /// - `ScopeMismatch` if the id is only declared in the other scope
    /// - `UnknownStat` if the id is not declared at all
    pub fn resolve(&self, key: &StatKey) -> StatsResult<&StatDescriptor> {
        let requested = key.scope();
        if let Some(descriptor) = self.descriptor(requested, &key.stat) {
            return Ok(descriptor);
        }
        let other = match requested {
            Scope::Table => Scope::Player,
            Scope::Player => Scope::Table,
        };
        if self.descriptor(other, &key.stat).is_some() {
            return Err(StatsError::ScopeMismatch {
                stat: key.stat.clone(),
                declared: other,
                requested,
            });
        }
        Err(StatsError::UnknownStat {
            stat: key.stat.clone(),
        })
    }

    /// Resolves `key` and checks that `value` carries the declared tag.
    pub fn check_value(&self, key: &StatKey, value: &StatValue) -> StatsResult<&StatDescriptor> {
        let descriptor = self.resolve(key)?;
        if value.value_type() != descriptor.value_type {
            return Err(StatsError::TypeMismatch {
                stat: key.stat.clone(),
                expected: descriptor.value_type,
                actual: value.value_type(),
            });
        }
        Ok(descriptor)
    }

    /// Resolves `key` and checks that it may be incremented by `delta`.
    pub fn check_increment(
        &self,
        key: &StatKey,
        delta: &StatValue,
    ) -> StatsResult<&StatDescriptor> {
        let descriptor = self.resolve(key)?;
        if !descriptor.value_type.is_numeric() {
            return Err(StatsError::UnsupportedOperation {
                stat: key.stat.clone(),
                operation: "increment",
                value_type: descriptor.value_type,
            });
        }
        self.check_value(key, delta)
    }
}

/// Incremental construction of a [`StatSchema`] in code.
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    descriptors: Vec<StatDescriptor>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn table(mut self, id: impl Into<String>, value_type: ValueType) -> Self {
        self.descriptors.push(StatDescriptor::table(id, value_type));
        self
    }

    #[must_use]
    pub fn player(mut self, id: impl Into<String>, value_type: ValueType) -> Self {
        self.descriptors
            .push(StatDescriptor::player(id, value_type));
        self
    }

    pub fn build(self) -> StatsResult<StatSchema> {
        StatSchema::new(self.descriptors)
    }
}

/// Wire form of a schema file: `table` and `player` groups mapping stat ids
/// to entries. Unknown groups and unknown type strings are rejected.
#[cfg(feature = "serde")]
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default)]
    pub table: std::collections::BTreeMap<String, SchemaEntry>,
    #[serde(default)]
    pub player: std::collections::BTreeMap<String, SchemaEntry>,
}

/// A single stat entry. Display fields (`id`, `name`, ...) are ignored.
#[cfg(feature = "serde")]
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SchemaEntry {
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

#[cfg(feature = "serde")]
impl TryFrom<SchemaDocument> for StatSchema {
    type Error = StatsError;

    fn try_from(document: SchemaDocument) -> StatsResult<Self> {
        let table = document
            .table
            .into_iter()
            .map(|(id, entry)| StatDescriptor::table(id, entry.value_type));
        let player = document
            .player
            .into_iter()
            .map(|(id, entry)| StatDescriptor::player(id, entry.value_type));
        Self::new(player.chain(table))
    }
}

#[cfg(feature = "serde")]
impl StatSchema {
    /// Parses a `stats.json` style document.
    pub fn from_json_str(json: &str) -> StatsResult<Self> {
        let document: SchemaDocument =
            serde_json::from_str(json).map_err(|e| StatsError::Schema(e.to_string()))?;
        Self::try_from(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ParticipantId;

    fn schema() -> StatSchema {
        StatSchema::builder()
            .player("turns", ValueType::Int)
            .player("metObjective", ValueType::Bool)
            .table("citiesCaptured", ValueType::Int)
            .build()
            .unwrap()
    }

    #[test]
    fn field_names_are_uppercased_and_sanitized() {
        assert_eq!(field_name(Scope::Player, "number turns"), "PLAYER_NUMBER_TURNS");
        assert_eq!(field_name(Scope::Table, "citiesCaptured"), "TABLE_CITIESCAPTURED");
        assert_eq!(field_name(Scope::Table, "pieces/turn"), "TABLE_PIECES_TURN");
    }

    #[test]
    fn duplicate_stat_in_same_scope_is_rejected() {
        let err = StatSchema::builder()
            .table("turns", ValueType::Int)
            .table("turns", ValueType::Float)
            .build()
            .unwrap_err();
        assert!(matches!(err, StatsError::Schema(_)));
    }

    #[test]
    fn same_id_in_both_scopes_is_allowed() {
        let schema = StatSchema::builder()
            .table("turns", ValueType::Int)
            .player("turns", ValueType::Int)
            .build()
            .unwrap();
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn resolve_reports_scope_mismatch() {
        let schema = schema();
        let err = schema.resolve(&StatKey::table("turns")).unwrap_err();
        assert_eq!(
            err,
            StatsError::ScopeMismatch {
                stat: "turns".into(),
                declared: Scope::Player,
                requested: Scope::Table,
            }
        );
        let err = schema
            .resolve(&StatKey::player("citiesCaptured", ParticipantId(5)))
            .unwrap_err();
        assert!(matches!(err, StatsError::ScopeMismatch { .. }));
    }

    #[test]
    fn resolve_reports_unknown_stat() {
        let err = schema().resolve(&StatKey::table("nope")).unwrap_err();
        assert!(matches!(err, StatsError::UnknownStat { .. }));
    }

    #[test]
    fn check_increment_rejects_bool() {
        let schema = schema();
        let key = StatKey::player("metObjective", ParticipantId(5));
        assert!(matches!(
            schema.check_increment(&key, &StatValue::Bool(true)),
            Err(StatsError::UnsupportedOperation { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parses_json_document() {
        let schema = StatSchema::from_json_str(
            r#"{
                "table": { "citiesCaptured": { "id": 10, "name": "Cities", "type": "int" } },
                "player": { "turns": { "type": "int" }, "rating": { "type": "float" } }
            }"#,
        )
        .unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(
            schema
                .descriptor(Scope::Player, "rating")
                .map(|d| d.value_type),
            Some(ValueType::Float)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn rejects_unknown_group_and_type() {
        let err = StatSchema::from_json_str(r#"{ "match": {} }"#).unwrap_err();
        assert!(matches!(err, StatsError::Schema(_)));
        let err = StatSchema::from_json_str(r#"{ "table": { "x": { "type": "string" } } }"#)
            .unwrap_err();
        assert!(matches!(err, StatsError::Schema(_)));
    }
}
