// File: rescue-rules/src/field.rs
// Purpose: Per-field rules and the field validator

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, Mode};
use crate::error::{EngineError, EngineResult};
use crate::parser::{self, RuleClause};
use crate::predicates::REQUIRED;
use crate::registry::{expected_kinds, Registry};
use crate::value::{FieldValue, ValueKind};

/// Reads a field's current value out of a record
pub type Extractor<R> = for<'a> fn(&'a R) -> FieldValue<'a>;

/// One failed clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub field: String,
    pub predicate: String,
    pub message: String,
}

/// A field's parsed clauses and the message each clause reports
///
/// A clause without its own `~message` reports the message of the nearest
/// following clause that has one, so in `int,range(1|3),required~Level must
/// be only (1-3)` all three clauses report the same text. Clauses with no
/// labelled successor fall back to `"<field> failed <predicate>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRules {
    name: String,
    kind: ValueKind,
    clauses: Vec<RuleClause>,
    messages: Vec<String>,
}

impl FieldRules {
    pub fn new(name: impl Into<String>, kind: ValueKind, clauses: Vec<RuleClause>) -> Self {
        let name = name.into();
        let messages = resolve_messages(&name, &clauses);
        Self {
            name,
            kind,
            clauses,
            messages,
        }
    }

    /// Parse a rule spec for a field
    pub fn parse(name: impl Into<String>, kind: ValueKind, spec: &str) -> EngineResult<Self> {
        Ok(Self::new(name, kind, parser::parse(spec)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn clauses(&self) -> &[RuleClause] {
        &self.clauses
    }

    /// The message reported when clause `index` fails
    pub fn message(&self, index: usize) -> Option<&str> {
        self.messages.get(index).map(String::as_str)
    }

    pub fn is_required(&self) -> bool {
        self.clauses.iter().any(|c| c.name == REQUIRED)
    }

    /// Dry-run every clause against the registry
    ///
    /// Catches unknown predicates, predicates that cannot take this field's
    /// kind, and unusable parameters before any record is validated.
    pub fn check(&self, registry: &Registry) -> EngineResult<()> {
        for clause in &self.clauses {
            let predicate = registry.lookup(&clause.name)?;
            if !predicate.accepts(self.kind) {
                return Err(EngineError::type_mismatch(
                    &clause.name,
                    expected_kinds(predicate.as_ref()),
                    self.kind,
                ));
            }
            predicate
                .check_params(&clause.params)
                .map_err(|reason| EngineError::malformed(clause.to_string(), reason))?;
        }
        Ok(())
    }

    fn failure(&self, index: usize) -> Failure {
        let clause = &self.clauses[index];
        Failure {
            field: self.name.clone(),
            predicate: clause.name.clone(),
            message: self.messages[index].clone(),
        }
    }
}

fn resolve_messages(field: &str, clauses: &[RuleClause]) -> Vec<String> {
    let mut next_label: Option<&str> = None;
    let mut messages: Vec<String> = clauses
        .iter()
        .rev()
        .map(|clause| {
            if let Some(message) = clause.message.as_deref() {
                next_label = Some(message);
            }
            match next_label {
                Some(message) => message.to_string(),
                None => format!("{} failed {}", field, clause.name),
            }
        })
        .collect();
    messages.reverse();
    messages
}

/// A field's rules together with how to read the field from a record
pub struct FieldSpec<R> {
    rules: FieldRules,
    extract: Extractor<R>,
}

impl<R> FieldSpec<R> {
    pub fn new(rules: FieldRules, extract: Extractor<R>) -> Self {
        Self { rules, extract }
    }

    pub fn rules(&self) -> &FieldRules {
        &self.rules
    }

    pub fn name(&self) -> &str {
        self.rules.name()
    }

    pub fn value<'a>(&self, record: &'a R) -> FieldValue<'a> {
        (self.extract)(record)
    }
}

/// Evaluates one field's value against its clauses
///
/// `required` acts as a presence gate and is evaluated before the other
/// clauses. A zero value on a required field fails with the `required`
/// message alone; on an optional field it skips the remaining clauses unless
/// `skip_empty_optional` is off. Everything else runs in declared order.
///
/// With [`FieldValidator::with_config`] predicates see the engine settings
/// (the `future` tolerance, for one); without it they use what they were
/// registered with.
pub struct FieldValidator<'r> {
    registry: &'r Registry,
    config: Option<&'r EngineConfig>,
    skip_empty_optional: bool,
}

impl<'r> FieldValidator<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            config: None,
            skip_empty_optional: true,
        }
    }

    /// Evaluate under `config`, including its `skip_empty_optional`
    pub fn with_config(mut self, config: &'r EngineConfig) -> Self {
        self.config = Some(config);
        self.skip_empty_optional = config.skip_empty_optional;
        self
    }

    pub fn skip_empty_optional(mut self, skip: bool) -> Self {
        self.skip_empty_optional = skip;
        self
    }

    pub fn validate(
        &self,
        value: &FieldValue<'_>,
        rules: &FieldRules,
        mode: Mode,
    ) -> EngineResult<Vec<Failure>> {
        let mut failures = Vec::new();
        if rules.clauses.is_empty() {
            return Ok(failures);
        }

        let is_required = rules.is_required();
        if is_required {
            for (index, clause) in rules.clauses.iter().enumerate() {
                if clause.name == REQUIRED && !self.evaluate(clause, value)? {
                    failures.push(rules.failure(index));
                    // Nothing else is meaningful on an absent value
                    return Ok(failures);
                }
            }
        } else if self.skip_empty_optional && value.is_zero() {
            tracing::trace!("Skipping empty optional field '{}'", rules.name);
            return Ok(failures);
        }

        for (index, clause) in rules.clauses.iter().enumerate() {
            if clause.name == REQUIRED {
                continue;
            }
            if !self.evaluate(clause, value)? {
                failures.push(rules.failure(index));
                if mode == Mode::FailFast {
                    break;
                }
            }
        }

        Ok(failures)
    }

    fn evaluate(&self, clause: &RuleClause, value: &FieldValue<'_>) -> EngineResult<bool> {
        let predicate = self.registry.lookup(&clause.name)?;
        if !predicate.accepts(value.kind()) {
            return Err(EngineError::type_mismatch(
                &clause.name,
                expected_kinds(predicate.as_ref()),
                value.kind(),
            ));
        }
        let outcome = match self.config {
            Some(config) => predicate.test_with_config(value, &clause.params, config),
            None => predicate.test(value, &clause.params),
        };
        outcome.map_err(|reason| EngineError::malformed(clause.to_string(), reason))
    }
}
