// File: rescue-entity/src/records/incident.rs
// Purpose: Incidents and patient assessments

use chrono::{DateTime, Local};
use rescue_rules::{FieldDecl, Record};
use serde::{Deserialize, Serialize};

use super::{Employee, Illness, Patient, Urgency};
use crate::id::{Id, Model};

/// A reported emergency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(flatten)]
    pub model: Model,
    pub title: String,
    pub informer: String,
    pub numberpatient: i32,
    pub location: String,
    pub datetime: DateTime<Local>,

    pub employee_id: Option<Id<Employee>>,
    pub illness_id: Option<Id<Illness>>,
    pub urgency_id: Option<Id<Urgency>>,
}

impl Record for Incident {
    const TYPE_NAME: &'static str = "Incident";

    fn fields() -> Vec<FieldDecl<Self>> {
        vec![
            FieldDecl::text("title", "required~Title cannot be blank", |r| (&r.title).into()),
            FieldDecl::text("informer", "required~Informer cannot be blank", |r| (&r.informer).into()),
            FieldDecl::int(
                "numberpatient",
                "positive~Numberpatient cannot be Negative,required~Numberpatient cannot be Zero",
                |r| r.numberpatient.into(),
            ),
            FieldDecl::text("location", "required~Location cannot be blank", |r| (&r.location).into()),
            FieldDecl::timestamp("datetime", "today~DateTime must be present", |r| r.datetime.into()),
        ]
    }
}

/// Triage of a patient at an incident
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(flatten)]
    pub model: Model,
    pub symptom: String,
    pub symptom_level: u32,
    pub datetime: DateTime<Local>,

    pub patient_id: Option<Id<Patient>>,
    pub recorder_id: Option<Id<Employee>>,
    pub incident_id: Option<Id<Incident>>,
}

impl Record for Assessment {
    const TYPE_NAME: &'static str = "Assessment";

    fn fields() -> Vec<FieldDecl<Self>> {
        vec![
            FieldDecl::text("symptom", "required~Please fill the symptom", |r| (&r.symptom).into()),
            FieldDecl::int(
                "symptom_level",
                "int,range(1|3),required~Level must be only (1-3)",
                |r| r.symptom_level.into(),
            ),
            FieldDecl::timestamp("datetime", "required,today~Please select current time", |r| r.datetime.into()),
        ]
    }
}
