// File: rescue-entity/src/records/people.rs
// Purpose: Patients and employees

use rescue_rules::{FieldDecl, Record};
use serde::{Deserialize, Serialize};

use crate::id::Model;

/// A person receiving care
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(flatten)]
    pub model: Model,
    pub name: String,
    pub tel: String,
    pub email: String,
}

impl Record for Patient {
    const TYPE_NAME: &'static str = "Patient";

    fn fields() -> Vec<FieldDecl<Self>> {
        Vec::new()
    }
}

/// Staff member who records incidents, shifts and checks
///
/// `email` is unique in storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(flatten)]
    pub model: Model,
    pub name: String,
    pub tel: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Record for Employee {
    const TYPE_NAME: &'static str = "Employee";

    fn fields() -> Vec<FieldDecl<Self>> {
        Vec::new()
    }
}
