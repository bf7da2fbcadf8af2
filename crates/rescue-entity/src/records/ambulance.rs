// File: rescue-entity/src/records/ambulance.rs
// Purpose: Ambulances, duty shifts, arrivals and vehicle checks

use chrono::{DateTime, Local};
use rescue_rules::{FieldDecl, Record};
use serde::{Deserialize, Serialize};

use super::{AmbulanceType, Employee, Incident, Patient, Problem, Status};
use crate::id::{Id, Model};

/// A vehicle in the fleet
///
/// `car_number` is unique in storage. `registration` follows the Thai
/// plate format: an optional leading `1`, two consonants, 1-4 digits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ambulance {
    #[serde(flatten)]
    pub model: Model,
    pub car_number: i32,
    pub registration: String,
    pub date_time: DateTime<Local>,

    pub status_id: Option<Id<Status>>,
    pub ambulance_type_id: Option<Id<AmbulanceType>>,
    pub employee_id: Option<Id<Employee>>,
}

const REGISTRATION_RULES: &str = r"matches(^[ก-ฮ]{2}\d{1}$|^[ก-ฮ]{2}\d{2}$|^[ก-ฮ]{2}\d{3}$|^[ก-ฮ]{2}\d{4}$|^1[ก-ฮ]{2}\d{1}$|^1[ก-ฮ]{2}\d{2}$|^1[ก-ฮ]{2}\d{3}$|^1[ก-ฮ]{2}\d{4}$)";

impl Record for Ambulance {
    const TYPE_NAME: &'static str = "Ambulance";

    fn fields() -> Vec<FieldDecl<Self>> {
        vec![
            FieldDecl::int("car_number", "required,positive", |r| r.car_number.into()),
            FieldDecl::text("registration", REGISTRATION_RULES, |r| (&r.registration).into()),
            FieldDecl::timestamp("date_time", "today~AmbulanceDate not true", |r| r.date_time.into()),
        ]
    }
}

/// An ambulance shift assigned to an incident
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbulanceOnDuty {
    #[serde(flatten)]
    pub model: Model,
    pub code: String,
    pub on_duty_date: DateTime<Local>,
    pub passenger: i32,

    pub ambulance_id: Option<Id<Ambulance>>,
    pub recorder_id: Option<Id<Employee>>,
    pub incident_id: Option<Id<Incident>>,
}

impl Record for AmbulanceOnDuty {
    const TYPE_NAME: &'static str = "AmbulanceOnDuty";

    fn fields() -> Vec<FieldDecl<Self>> {
        vec![
            FieldDecl::text(
                "code",
                r"matches(^[D]\d{8}$)~Code not matches 'Dxxxxxxxx' ex. D00000000,required~Code must not be blank",
                |r| (&r.code).into(),
            ),
            FieldDecl::timestamp("on_duty_date", "today~Date must be today", |r| r.on_duty_date.into()),
            FieldDecl::int(
                "passenger",
                "required~Passenger must not be zero,positive~Passenger must be greater than zero",
                |r| r.passenger.into(),
            ),
        ]
    }
}

/// Hand-over of a patient at the hospital
///
/// Each duty shift has at most one arrival, so `ambulance_on_duty_id`
/// is unique in storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbulanceArrival {
    #[serde(flatten)]
    pub model: Model,
    pub number_of_passenger: i32,
    pub distance: f32,
    pub date_time: DateTime<Local>,

    pub recorder_id: Option<Id<Employee>>,
    pub patient_id: Option<Id<Patient>>,
    pub ambulance_on_duty_id: Option<Id<AmbulanceOnDuty>>,
}

impl Record for AmbulanceArrival {
    const TYPE_NAME: &'static str = "AmbulanceArrival";

    fn fields() -> Vec<FieldDecl<Self>> {
        vec![
            FieldDecl::int(
                "number_of_passenger",
                "required,positive~Number of passenger must be greater to zero",
                |r| r.number_of_passenger.into(),
            ),
            FieldDecl::float(
                "distance",
                "required~Distance must be greater to zero,positivedecimal~Distance must be a positive decimal",
                |r| r.distance.into(),
            ),
            FieldDecl::timestamp(
                "date_time",
                "today~Ambulance Arrival must be current date",
                |r| r.date_time.into(),
            ),
        ]
    }
}

/// Routine inspection of an ambulance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbulanceCheck {
    #[serde(flatten)]
    pub model: Model,
    pub date_time: DateTime<Local>,
    pub doc_code: String,
    pub severity: i32,
    pub note: String,

    pub ambulance_id: Option<Id<Ambulance>>,
    pub recorder_id: Option<Id<Employee>>,
    pub problem_id: Option<Id<Problem>>,
}

impl Record for AmbulanceCheck {
    const TYPE_NAME: &'static str = "AmbulanceCheck";

    fn fields() -> Vec<FieldDecl<Self>> {
        vec![
            FieldDecl::timestamp("date_time", "today~Time must be current date", |r| r.date_time.into()),
            FieldDecl::text(
                "doc_code",
                r"matches(^[A-Z]{3}\d{3}$),required~DocCode must be in correct form",
                |r| (&r.doc_code).into(),
            ),
            FieldDecl::int(
                "severity",
                "int,range(1|3),required~Level must be between 1-3",
                |r| r.severity.into(),
            ),
        ]
    }
}
