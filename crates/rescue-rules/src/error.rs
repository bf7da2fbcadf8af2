// File: rescue-rules/src/error.rs
// Purpose: Engine error taxonomy

use thiserror::Error;

use crate::value::ValueKind;

/// Errors raised by the rule engine itself.
///
/// These are configuration or programming mistakes (a rule that names an
/// unregistered predicate, a rule string that does not parse, a predicate
/// applied to the wrong kind of value). A record that simply breaks its
/// rules is not an error; see [`crate::ValidationResult`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown predicate '{name}'")]
    UnknownPredicate { name: String },

    #[error("malformed rule spec '{spec}': {reason}")]
    MalformedRuleSpec { spec: String, reason: String },

    #[error("predicate '{predicate}' expects {expected}, got {found}")]
    PredicateTypeMismatch {
        predicate: String,
        expected: String,
        found: ValueKind,
    },

    #[error("invalid rules for {record}.{field}: {source}")]
    InvalidSpec {
        record: String,
        field: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    pub fn unknown_predicate(name: impl Into<String>) -> Self {
        Self::UnknownPredicate { name: name.into() }
    }

    pub fn malformed(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRuleSpec {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(
        predicate: impl Into<String>,
        expected: impl Into<String>,
        found: ValueKind,
    ) -> Self {
        Self::PredicateTypeMismatch {
            predicate: predicate.into(),
            expected: expected.into(),
            found,
        }
    }

    /// Attach the record and field being built to an error.
    pub fn in_field(self, record: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidSpec {
            record: record.into(),
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any `InvalidSpec` location wrappers.
    pub fn root(&self) -> &EngineError {
        match self {
            Self::InvalidSpec { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
