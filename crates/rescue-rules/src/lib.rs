//! # rescue-rules
//!
//! Declarative field validation for dispatch records.
//!
//! Each record type lists its validated fields with a compact rule spec,
//! a comma-separated list of predicate clauses:
//!
//! ```text
//! clause ("," clause)*
//! clause := name ["(" param ("|" param)* ")"] ["~" message]
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{DateTime, Local};
//! use rescue_rules::{FieldDecl, Record, Validator};
//!
//! struct Incident {
//!     title: String,
//!     patients: i32,
//!     reported_at: DateTime<Local>,
//! }
//!
//! impl Record for Incident {
//!     const TYPE_NAME: &'static str = "Incident";
//!
//!     fn fields() -> Vec<FieldDecl<Self>> {
//!         vec![
//!             FieldDecl::text("title", "required~Title cannot be blank", |r| (&r.title).into()),
//!             FieldDecl::int("patients", "positive,required~Patients cannot be Zero", |r| r.patients.into()),
//!             FieldDecl::timestamp("reported_at", "today~DateTime must be present", |r| r.reported_at.into()),
//!         ]
//!     }
//! }
//!
//! let validator = Validator::default();
//! validator.prepare::<Incident>().expect("rules are well formed");
//!
//! let incident = Incident {
//!     title: String::new(),
//!     patients: 3,
//!     reported_at: Local::now(),
//! };
//! let result = validator.validate(&incident).unwrap();
//! assert_eq!(result.first_message(), Some("Title cannot be blank"));
//! ```
//!
//! ## Architecture
//!
//! - **`registry`** - named predicates, built-ins plus custom registrations
//! - **`predicates`** - `required`, `int`, `positive`, `positivedecimal`, `range`, `matches`, `today`, `future`
//! - **`parser`** - rule spec parsing and re-serialization
//! - **`field`** - per-field rules and the field validator
//! - **`record`** - record declarations, cached specs and the record validator
//! - **`config`** - engine settings, loadable from `rescue.toml`

pub mod config;
pub mod error;
pub mod field;
pub mod parser;
pub mod predicates;
pub mod record;
pub mod registry;
pub mod value;

pub use config::{EngineConfig, Mode};
pub use error::{EngineError, EngineResult};
pub use field::{Extractor, Failure, FieldRules, FieldSpec, FieldValidator};
pub use parser::{parse, RuleClause, RuleSpec};
pub use record::{FieldDecl, Record, RecordSpec, ValidationError, ValidationResult, Validator};
pub use registry::{FnPredicate, Predicate, Registry};
pub use value::{FieldValue, ValueKind};
