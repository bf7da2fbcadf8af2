// File: rescue-entity/src/records/lookup.rs
// Purpose: Small lookup tables referenced by the main records

use rescue_rules::{FieldDecl, Record};
use serde::{Deserialize, Serialize};

use crate::id::Model;

/// Operational status of an ambulance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(flatten)]
    pub model: Model,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbulanceType {
    #[serde(flatten)]
    pub model: Model,
    pub name: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Illness {
    #[serde(flatten)]
    pub model: Model,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Urgency {
    #[serde(flatten)]
    pub model: Model,
    pub value: String,
}

/// Problem found during an ambulance check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(flatten)]
    pub model: Model,
    pub name: String,
}

macro_rules! unvalidated_record {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Record for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn fields() -> Vec<FieldDecl<Self>> {
                    Vec::new()
                }
            }
        )*
    };
}

unvalidated_record!(Status, AmbulanceType, Illness, Urgency, Problem);
