//! Error infrastructure for stats-core.
//!
//! Every failure the registry can report is a contract violation by the caller
//! (wrong scope, wrong type, missing initialization) or a malformed schema.
//! None of them are retried; they surface immediately through [`StatsResult`].

use crate::schema::{Scope, ValueType};
use crate::value::StatKey;

/// Result type for all stats operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Severity level of an error, used for categorization by the host.
///
/// - **Validation**: the caller broke the store contract or supplied a bad schema
/// - **Internal**: the persistence collaborator failed underneath a valid call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Invalid input, must not be retried without changes.
    ///
    /// Examples: participant passed for a table stat, bool incremented
    Validation,

    /// Unexpected failure below the contract.
    ///
    /// Examples: backend rejected a write, backend returned a mistyped value
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error indicates a failure outside the caller's control.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Errors raised by schemas, stores, accessors and the registry.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// Participant supplied for a table stat, or omitted for a player stat.
    #[error("stat '{stat}' is {declared}-scoped but was addressed as {requested}-scoped")]
    ScopeMismatch {
        stat: String,
        declared: Scope,
        requested: Scope,
    },

    /// Value or delta tag differs from the declared type.
    #[error("stat '{stat}' holds {expected} values, got {actual}")]
    TypeMismatch {
        stat: String,
        expected: ValueType,
        actual: ValueType,
    },

    /// Operation not defined for the stat's value type.
    #[error("cannot {operation} stat '{stat}' of type {value_type}")]
    UnsupportedOperation {
        stat: String,
        operation: &'static str,
        value_type: ValueType,
    },

    /// Read or increment of a key that was never initialized.
    #[error("stat {key} has not been initialized")]
    NotInitialized { key: StatKey },

    /// Stat id or accessor field not present in the loaded schema.
    #[error("unknown stat '{stat}'")]
    UnknownStat { stat: String },

    /// Malformed schema input.
    #[error("invalid stats schema: {0}")]
    Schema(String),

    /// Integer increment would leave the `i64` range.
    #[error("increment of stat {key} overflows")]
    Overflow { key: StatKey },

    /// The persistence collaborator failed.
    #[error("stats backend error: {0}")]
    Backend(String),

    /// Replaying a deferred log stopped at the operation at `index`.
    #[error("replay failed at operation {index}: {source}")]
    Replay {
        index: usize,
        source: Box<StatsError>,
    },
}

impl StatsError {
    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        use StatsError::*;
        match self {
            Backend(_) => ErrorSeverity::Internal,
            Replay { source, .. } => source.severity(),
            ScopeMismatch { .. }
            | TypeMismatch { .. }
            | UnsupportedOperation { .. }
            | NotInitialized { .. }
            | UnknownStat { .. }
            | Schema(_)
            | Overflow { .. } => ErrorSeverity::Validation,
        }
    }

    /// Returns a stable identifier for this error variant.
    pub fn error_code(&self) -> &'static str {
        use StatsError::*;
        match self {
            ScopeMismatch { .. } => "STATS_SCOPE_MISMATCH",
            TypeMismatch { .. } => "STATS_TYPE_MISMATCH",
            UnsupportedOperation { .. } => "STATS_UNSUPPORTED_OPERATION",
            NotInitialized { .. } => "STATS_NOT_INITIALIZED",
            UnknownStat { .. } => "STATS_UNKNOWN_STAT",
            Schema(_) => "STATS_SCHEMA_ERROR",
            Overflow { .. } => "STATS_OVERFLOW",
            Backend(_) => "STATS_BACKEND_ERROR",
            Replay { .. } => "STATS_REPLAY_FAILED",
        }
    }

    pub(crate) fn not_initialized(key: &StatKey) -> Self {
        Self::NotInitialized { key: key.clone() }
    }
}
