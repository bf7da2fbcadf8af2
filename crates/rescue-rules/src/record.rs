// File: rescue-rules/src/record.rs
// Purpose: Record declarations, cached record specs and the record validator

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{EngineConfig, Mode};
use crate::error::EngineResult;
use crate::field::{Extractor, Failure, FieldRules, FieldSpec, FieldValidator};
use crate::registry::Registry;
use crate::value::{FieldValue, ValueKind};

/// A record type whose fields carry rule specs
///
/// Implementors list their validated fields in a fixed order. Reference
/// fields (foreign keys) are never listed.
///
/// # Example
///
/// ```
/// use rescue_rules::{FieldDecl, Record};
///
/// struct Note {
///     title: String,
/// }
///
/// impl Record for Note {
///     const TYPE_NAME: &'static str = "Note";
///
///     fn fields() -> Vec<FieldDecl<Self>> {
///         vec![FieldDecl::text("title", "required~Title cannot be blank", |n| (&n.title).into())]
///     }
/// }
/// ```
pub trait Record: Sized + 'static {
    const TYPE_NAME: &'static str;

    fn fields() -> Vec<FieldDecl<Self>>;
}

/// Static declaration of one validated field
pub struct FieldDecl<R> {
    pub name: &'static str,
    pub kind: ValueKind,
    pub rules: &'static str,
    pub extract: Extractor<R>,
}

impl<R> FieldDecl<R> {
    pub fn new(name: &'static str, kind: ValueKind, rules: &'static str, extract: Extractor<R>) -> Self {
        Self {
            name,
            kind,
            rules,
            extract,
        }
    }

    pub fn text(name: &'static str, rules: &'static str, extract: Extractor<R>) -> Self {
        Self::new(name, ValueKind::Text, rules, extract)
    }

    pub fn int(name: &'static str, rules: &'static str, extract: Extractor<R>) -> Self {
        Self::new(name, ValueKind::Int, rules, extract)
    }

    pub fn float(name: &'static str, rules: &'static str, extract: Extractor<R>) -> Self {
        Self::new(name, ValueKind::Float, rules, extract)
    }

    pub fn timestamp(name: &'static str, rules: &'static str, extract: Extractor<R>) -> Self {
        Self::new(name, ValueKind::Timestamp, rules, extract)
    }
}

/// Parsed, checked description of a record type's validated fields
pub struct RecordSpec<R> {
    type_name: &'static str,
    fields: Vec<FieldSpec<R>>,
}

impl<R: Record> RecordSpec<R> {
    /// Parse every field's rules, and with `strict` dry-run them against
    /// `registry` so unknown predicates, kind mismatches and bad parameters
    /// are reported now instead of on first use.
    pub fn build(registry: &Registry, strict: bool) -> EngineResult<Self> {
        let mut fields = Vec::new();

        for decl in R::fields() {
            let rules = FieldRules::parse(decl.name, decl.kind, decl.rules)
                .map_err(|e| e.in_field(R::TYPE_NAME, decl.name))?;
            if strict {
                rules
                    .check(registry)
                    .map_err(|e| e.in_field(R::TYPE_NAME, decl.name))?;
            }
            fields.push(FieldSpec::new(rules, decl.extract));
        }

        Ok(Self {
            type_name: R::TYPE_NAME,
            fields,
        })
    }
}

impl<R> RecordSpec<R> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldSpec<R>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec<R>> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

impl<R> fmt::Debug for RecordSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSpec")
            .field("type_name", &self.type_name)
            .field(
                "fields",
                &self.fields.iter().map(|field| field.rules()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Outcome of validating one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub failures: Vec<Failure>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            ok: true,
            failures: Vec::new(),
        }
    }

    pub fn from_failures(failures: Vec<Failure>) -> Self {
        Self {
            ok: failures.is_empty(),
            failures,
        }
    }

    pub fn first(&self) -> Option<&Failure> {
        self.failures.first()
    }

    /// The message callers surface to clients
    pub fn first_message(&self) -> Option<&str> {
        self.first().map(|f| f.message.as_str())
    }

    /// Failures reported for one field
    pub fn failures_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Failure> + 'a {
        self.failures.iter().filter(move |f| f.field == field)
    }

    /// Failing field names, in order, without repeats
    pub fn failed_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !fields.contains(&failure.field.as_str()) {
                fields.push(&failure.field);
            }
        }
        fields
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.ok {
            Ok(())
        } else {
            Err(ValidationError {
                failures: self.failures,
            })
        }
    }
}

/// A failed validation as an error value
///
/// Displays the failure messages joined with `"; "`; under fail-fast that
/// is exactly the first failure's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.failures))]
pub struct ValidationError {
    pub failures: Vec<Failure>,
}

fn join_messages(failures: &[Failure]) -> String {
    failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

type SpecCache = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

/// Validates records against their cached specs
///
/// Specs are built once per record type on first use (or eagerly through
/// [`Validator::prepare`]) and shared afterwards.
pub struct Validator {
    registry: Arc<Registry>,
    config: EngineConfig,
    specs: SpecCache,
}

impl Default for Validator {
    /// Backed by the process-wide registry with default configuration
    fn default() -> Self {
        Self::new(Registry::global(), EngineConfig::default())
    }
}

impl Validator {
    pub fn new(registry: Arc<Registry>, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            specs: RwLock::new(HashMap::new()),
        }
    }

    /// A validator with its own registry holding the built-ins for `config`
    pub fn from_config(config: EngineConfig) -> Self {
        let registry = Arc::new(Registry::with_builtins(&config));
        Self::new(registry, config)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build (or fetch) the spec for `R`
    ///
    /// Call this at startup for every record type to surface rule
    /// configuration errors before serving traffic.
    pub fn prepare<R: Record>(&self) -> EngineResult<Arc<RecordSpec<R>>> {
        let key = TypeId::of::<R>();

        if let Some(spec) = self.cached::<R>(key) {
            return Ok(spec);
        }

        let mut specs = self.specs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(spec) = specs.get(&key).and_then(|s| Arc::clone(s).downcast::<RecordSpec<R>>().ok()) {
            return Ok(spec);
        }

        let spec = Arc::new(RecordSpec::<R>::build(&self.registry, self.config.strict_build)?);
        tracing::debug!("Built record spec for {} ({} fields)", R::TYPE_NAME, spec.fields().len());
        specs.insert(key, spec.clone() as Arc<dyn Any + Send + Sync>);
        Ok(spec)
    }

    fn cached<R: Record>(&self, key: TypeId) -> Option<Arc<RecordSpec<R>>> {
        let specs = self.specs.read().unwrap_or_else(PoisonError::into_inner);
        specs
            .get(&key)
            .and_then(|s| Arc::clone(s).downcast::<RecordSpec<R>>().ok())
    }

    /// Validate using the configured mode (fail-fast unless configured otherwise)
    pub fn validate<R: Record>(&self, record: &R) -> EngineResult<ValidationResult> {
        self.validate_with(record, self.config.mode)
    }

    /// Validate every field and report every failing clause
    pub fn validate_all<R: Record>(&self, record: &R) -> EngineResult<ValidationResult> {
        self.validate_with(record, Mode::CollectAll)
    }

    pub fn validate_with<R: Record>(&self, record: &R, mode: Mode) -> EngineResult<ValidationResult> {
        let spec = self.prepare::<R>()?;
        let fields = self.field_validator();
        let mut failures = Vec::new();

        for field in spec.fields() {
            let value = field.value(record);
            let found = fields.validate(&value, field.rules(), mode)?;
            if found.is_empty() {
                continue;
            }

            for failure in &found {
                tracing::debug!(
                    "{}.{} failed {}: {}",
                    R::TYPE_NAME,
                    failure.field,
                    failure.predicate,
                    failure.message
                );
            }
            failures.extend(found);

            if mode == Mode::FailFast {
                break;
            }
        }

        Ok(ValidationResult::from_failures(failures))
    }

    /// Check a single value against an ad-hoc rule spec
    pub fn validate_value(
        &self,
        field: &str,
        rules: &str,
        value: FieldValue<'_>,
        mode: Mode,
    ) -> EngineResult<ValidationResult> {
        let rules = FieldRules::parse(field, value.kind(), rules)?;
        if self.config.strict_build {
            rules.check(&self.registry)?;
        }
        let failures = self.field_validator().validate(&value, &rules, mode)?;
        Ok(ValidationResult::from_failures(failures))
    }

    fn field_validator(&self) -> FieldValidator<'_> {
        FieldValidator::new(&self.registry).with_config(&self.config)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use chrono::{DateTime, Duration, Local};
    use pretty_assertions::assert_eq;

    struct Shift {
        code: String,
        passengers: i32,
        on_duty: DateTime<Local>,
    }

    impl Record for Shift {
        const TYPE_NAME: &'static str = "Shift";

        fn fields() -> Vec<FieldDecl<Self>> {
            vec![
                FieldDecl::text("code", r"matches(^D\d{3}$)~Code must look like D000,required~Code must not be blank", |s| (&s.code).into()),
                FieldDecl::int("passengers", "required~Passengers must not be zero,positive~Passengers must be positive", |s| s.passengers.into()),
                FieldDecl::timestamp("on_duty", "today~Shift must be today", |s| s.on_duty.into()),
            ]
        }
    }

    struct Broken;

    impl Record for Broken {
        const TYPE_NAME: &'static str = "Broken";

        fn fields() -> Vec<FieldDecl<Self>> {
            vec![FieldDecl::text("name", "required,weekday", |_| FieldValue::Text("x"))]
        }
    }

    fn valid_shift() -> Shift {
        Shift {
            code: "D123".to_string(),
            passengers: 2,
            on_duty: Local::now(),
        }
    }

    #[test]
    fn test_valid_record() {
        let validator = Validator::from_config(EngineConfig::default());
        let result = validator.validate(&valid_shift()).unwrap();
        assert_eq!(result, ValidationResult::success());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_fail_fast_reports_first_field_only() {
        let validator = Validator::from_config(EngineConfig::default());
        let shift = Shift {
            code: String::new(),
            passengers: -1,
            on_duty: Local::now() - Duration::days(2),
        };

        let result = validator.validate(&shift).unwrap();
        assert!(!result.ok);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.first_message(), Some("Code must not be blank"));

        let err = result.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Code must not be blank");
    }

    #[test]
    fn test_collect_all_reports_every_field() {
        let validator = Validator::from_config(EngineConfig::default());
        let shift = Shift {
            code: "X1".to_string(),
            passengers: -1,
            on_duty: Local::now() - Duration::days(2),
        };

        let result = validator.validate_all(&shift).unwrap();
        assert_eq!(result.failed_fields(), vec!["code", "passengers", "on_duty"]);
        assert_eq!(
            result.failures_for("passengers").map(|f| f.predicate.as_str()).collect::<Vec<_>>(),
            vec!["positive"]
        );
        assert_eq!(
            result.into_result().unwrap_err().to_string(),
            "Code must look like D000; Passengers must be positive; Shift must be today"
        );
    }

    #[test]
    fn test_configured_mode_applies_to_validate() {
        let config = EngineConfig {
            mode: Mode::CollectAll,
            ..EngineConfig::default()
        };
        let validator = Validator::from_config(config);
        let shift = Shift {
            code: String::new(),
            passengers: 0,
            on_duty: Local::now(),
        };
        let result = validator.validate(&shift).unwrap();
        assert_eq!(result.failed_fields(), vec!["code", "passengers"]);
    }

    #[test]
    fn test_spec_is_cached() {
        let validator = Validator::from_config(EngineConfig::default());
        let first = validator.prepare::<Shift>().unwrap();
        let second = validator.prepare::<Shift>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.type_name(), "Shift");
        assert_eq!(first.fields().len(), 3);
        assert!(first.field("passengers").unwrap().rules().is_required());
    }

    #[test]
    fn test_prepare_reports_location_of_bad_rule() {
        let validator = Validator::from_config(EngineConfig::default());
        let err = validator.prepare::<Broken>().unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidSpec { ref record, ref field, .. } if record == "Broken" && field == "name"
        ));
        assert!(matches!(err.root(), EngineError::UnknownPredicate { .. }));
    }

    #[test]
    fn test_lenient_build_defers_unknown_predicate() {
        let config = EngineConfig {
            strict_build: false,
            ..EngineConfig::default()
        };
        let validator = Validator::from_config(config);
        assert!(validator.prepare::<Broken>().is_ok());
        assert!(matches!(
            validator.validate(&Broken),
            Err(EngineError::UnknownPredicate { .. })
        ));
    }

    #[test]
    fn test_validate_value() {
        let validator = Validator::default();
        let result = validator
            .validate_value("title", "required~Title cannot be blank", FieldValue::Text(""), Mode::FailFast)
            .unwrap();
        assert!(!result.ok);
        assert_eq!(result.first_message(), Some("Title cannot be blank"));
    }

    #[test]
    fn test_result_serializes() {
        let result = ValidationResult::from_failures(vec![Failure {
            field: "title".to_string(),
            predicate: "required".to_string(),
            message: "Title cannot be blank".to_string(),
        }]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["failures"][0]["message"], "Title cannot be blank");
    }
}
