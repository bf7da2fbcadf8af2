// File: rescue-entity/src/records/mod.rs
// Purpose: Dispatch record types and their field rules
//
// Each record lists only its validated fields. Reference fields
// (`*_id: Option<Id<_>>`) are described in `relations` and are never
// validated here.

mod ambulance;
mod incident;
mod lookup;
mod people;

pub use ambulance::{Ambulance, AmbulanceArrival, AmbulanceCheck, AmbulanceOnDuty};
pub use incident::{Assessment, Incident};
pub use lookup::{AmbulanceType, Illness, Problem, Status, Urgency};
pub use people::{Employee, Patient};
