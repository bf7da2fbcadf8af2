//! # rescue-entity
//!
//! Dispatch records for the ambulance service: incidents, assessments,
//! duty shifts, arrivals, vehicle checks and their lookup tables.
//!
//! Every record implements [`rescue_rules::Record`], so a
//! [`Validator`] can check it. References between records are typed
//! `Option<Id<T>>` fields, described for storage in [`relations`].
//!
//! ```rust
//! use rescue_entity::{prepare_all, Incident};
//! use rescue_rules::Validator;
//!
//! let validator = Validator::default();
//! prepare_all(&validator).expect("entity rules are well formed");
//!
//! let incident = Incident::default();
//! let result = validator.validate(&incident).unwrap();
//! assert_eq!(result.first_message(), Some("Title cannot be blank"));
//! ```

pub mod id;
pub mod records;
pub mod relations;

pub use id::{Id, Model};
pub use records::*;
pub use relations::{Collection, Entity, EntityKind, EntitySchema, Reference, RelationalSchema, SchemaError};

use rescue_rules::{EngineResult, Validator};

/// Build and cache the rule specs of every dispatch record
///
/// Call once at startup so a bad rule string fails there instead of on
/// the first request.
pub fn prepare_all(validator: &Validator) -> EngineResult<()> {
    validator.prepare::<Patient>()?;
    validator.prepare::<Employee>()?;
    validator.prepare::<Ambulance>()?;
    validator.prepare::<AmbulanceOnDuty>()?;
    validator.prepare::<AmbulanceArrival>()?;
    validator.prepare::<Assessment>()?;
    validator.prepare::<Incident>()?;
    validator.prepare::<Status>()?;
    validator.prepare::<AmbulanceType>()?;
    validator.prepare::<Illness>()?;
    validator.prepare::<Urgency>()?;
    validator.prepare::<Problem>()?;
    validator.prepare::<AmbulanceCheck>()?;

    tracing::info!("Prepared rules for {} dispatch records", EntityKind::ALL.len());
    Ok(())
}
