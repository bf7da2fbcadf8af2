//! Validation tests for the dispatch records
//!
//! - Incident positive/negative cases, one per validated field
//! - Shift, arrival, assessment and check messages
//! - Plate and document code formats

use chrono::{Duration, Local};
use pretty_assertions::assert_eq;
use rescue_entity::*;
use rescue_rules::{EngineConfig, Mode, Validator};
use rstest::rstest;

fn validator() -> Validator {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let validator = Validator::from_config(EngineConfig::default());
    prepare_all(&validator).unwrap();
    validator
}

fn valid_incident() -> Incident {
    Incident {
        title: "มีคนได้รับบาดเจ็บ".to_string(),
        informer: "นายธนพล  ปักโคทานัง".to_string(),
        numberpatient: 3,
        location: "หน้าประตู 1 มทส".to_string(),
        datetime: Local::now(),
        ..Default::default()
    }
}

#[test]
fn test_incident_positive() {
    let result = validator().validate(&valid_incident()).unwrap();
    assert!(result.ok);
    assert!(result.into_result().is_ok());
}

#[test]
fn test_incident_title_blank() {
    let incident = Incident {
        title: String::new(),
        ..valid_incident()
    };

    let err = validator().validate(&incident).unwrap().into_result().unwrap_err();
    assert_eq!(err.to_string(), "Title cannot be blank");
}

#[rstest]
#[case::informer(Incident { informer: String::new(), ..valid_incident() }, "Informer cannot be blank")]
#[case::location(Incident { location: String::new(), ..valid_incident() }, "Location cannot be blank")]
#[case::zero_patients(Incident { numberpatient: 0, ..valid_incident() }, "Numberpatient cannot be Zero")]
#[case::negative_patients(Incident { numberpatient: -2, ..valid_incident() }, "Numberpatient cannot be Negative")]
#[case::yesterday(Incident { datetime: Local::now() - Duration::hours(25), ..valid_incident() }, "DateTime must be present")]
#[case::tomorrow(Incident { datetime: Local::now() + Duration::hours(25), ..valid_incident() }, "DateTime must be present")]
fn test_incident_negative(#[case] incident: Incident, #[case] expected: &str) {
    let result = validator().validate(&incident).unwrap();
    assert!(!result.ok);
    assert_eq!(result.first_message(), Some(expected));
}

#[test]
fn test_incident_references_are_not_validated() {
    let incident = Incident {
        employee_id: None,
        illness_id: Some(Id::new(4)),
        urgency_id: Some(Id::new(999)),
        ..valid_incident()
    };
    assert!(validator().validate(&incident).unwrap().ok);
}

#[test]
fn test_default_incident_collects_required_fields() {
    // An unset timestamp is empty and `datetime` is not required.
    let result = validator().validate_all(&Incident::default()).unwrap();
    assert_eq!(
        result.failed_fields(),
        vec!["title", "informer", "numberpatient", "location"]
    );
}

fn valid_duty() -> AmbulanceOnDuty {
    AmbulanceOnDuty {
        code: "D00000001".to_string(),
        on_duty_date: Local::now(),
        passenger: 2,
        ..Default::default()
    }
}

#[rstest]
#[case("D00000001", None)]
#[case("", Some("Code must not be blank"))]
#[case("D0000001", Some("Code not matches 'Dxxxxxxxx' ex. D00000000"))]
#[case("X00000001", Some("Code not matches 'Dxxxxxxxx' ex. D00000000"))]
#[case("D๐๐๐๐๐๐๐๑", Some("Code not matches 'Dxxxxxxxx' ex. D00000000"))]
#[case("D١٢٣٤٥٦٧٨", Some("Code not matches 'Dxxxxxxxx' ex. D00000000"))]
fn test_duty_code(#[case] code: &str, #[case] expected: Option<&str>) {
    let duty = AmbulanceOnDuty {
        code: code.to_string(),
        ..valid_duty()
    };
    assert_eq!(validator().validate(&duty).unwrap().first_message(), expected);
}

#[rstest]
#[case(2, None)]
#[case(0, Some("Passenger must not be zero"))]
#[case(-1, Some("Passenger must be greater than zero"))]
fn test_duty_passenger(#[case] passenger: i32, #[case] expected: Option<&str>) {
    let duty = AmbulanceOnDuty {
        passenger,
        ..valid_duty()
    };
    assert_eq!(validator().validate(&duty).unwrap().first_message(), expected);
}

fn valid_arrival() -> AmbulanceArrival {
    AmbulanceArrival {
        number_of_passenger: 1,
        distance: 12.5,
        date_time: Local::now(),
        ..Default::default()
    }
}

#[rstest]
#[case::no_passengers(AmbulanceArrival { number_of_passenger: 0, ..valid_arrival() }, "Number of passenger must be greater to zero")]
#[case::zero_distance(AmbulanceArrival { distance: 0.0, ..valid_arrival() }, "Distance must be greater to zero")]
#[case::negative_distance(AmbulanceArrival { distance: -3.2, ..valid_arrival() }, "Distance must be a positive decimal")]
#[case::yesterday(AmbulanceArrival { date_time: Local::now() - Duration::days(1), ..valid_arrival() }, "Ambulance Arrival must be current date")]
fn test_arrival_negative(#[case] arrival: AmbulanceArrival, #[case] expected: &str) {
    assert_eq!(validator().validate(&arrival).unwrap().first_message(), Some(expected));
}

#[test]
fn test_arrival_positive() {
    assert!(validator().validate(&valid_arrival()).unwrap().ok);
}

#[rstest]
#[case(1, None)]
#[case(3, None)]
#[case(0, Some("Level must be only (1-3)"))]
#[case(4, Some("Level must be only (1-3)"))]
fn test_assessment_level(#[case] symptom_level: u32, #[case] expected: Option<&str>) {
    let assessment = Assessment {
        symptom: "หายใจลำบาก".to_string(),
        symptom_level,
        datetime: Local::now(),
        ..Default::default()
    };
    assert_eq!(validator().validate(&assessment).unwrap().first_message(), expected);
}

#[test]
fn test_assessment_requires_time() {
    let assessment = Assessment {
        symptom: "ไข้สูง".to_string(),
        symptom_level: 2,
        ..Default::default()
    };
    assert_eq!(
        validator().validate(&assessment).unwrap().first_message(),
        Some("Please select current time")
    );
}

fn valid_ambulance() -> Ambulance {
    Ambulance {
        car_number: 7,
        registration: "กข1234".to_string(),
        date_time: Local::now(),
        ..Default::default()
    }
}

#[rstest]
#[case("กข1")]
#[case("กข1234")]
#[case("1กข12")]
#[case("")]
fn test_ambulance_registration_valid(#[case] registration: &str) {
    let ambulance = Ambulance {
        registration: registration.to_string(),
        ..valid_ambulance()
    };
    assert!(validator().validate(&ambulance).unwrap().ok, "{}", registration);
}

#[rstest]
#[case("AB1234")]
#[case("กข12345")]
#[case("2กข12")]
#[case("กข")]
#[case("กข๑๒")]
#[case("กข١٢")]
#[case("1กข١٢٣")]
fn test_ambulance_registration_invalid(#[case] registration: &str) {
    let ambulance = Ambulance {
        registration: registration.to_string(),
        ..valid_ambulance()
    };
    assert_eq!(
        validator().validate(&ambulance).unwrap().first_message(),
        Some("registration failed matches")
    );
}

#[test]
fn test_ambulance_car_number_default_messages() {
    let validator = validator();
    let zero = Ambulance {
        car_number: 0,
        ..valid_ambulance()
    };
    assert_eq!(
        validator.validate(&zero).unwrap().first_message(),
        Some("car_number failed required")
    );

    let negative = Ambulance {
        car_number: -4,
        ..valid_ambulance()
    };
    assert_eq!(
        validator.validate(&negative).unwrap().first_message(),
        Some("car_number failed positive")
    );
}

#[rstest]
#[case("ABC123", 2, None)]
#[case("", 2, Some("DocCode must be in correct form"))]
#[case("AB1234", 2, Some("DocCode must be in correct form"))]
#[case("ABC123", 5, Some("Level must be between 1-3"))]
#[case("ABC123", 0, Some("Level must be between 1-3"))]
fn test_ambulance_check(#[case] doc_code: &str, #[case] severity: i32, #[case] expected: Option<&str>) {
    let check = AmbulanceCheck {
        date_time: Local::now(),
        doc_code: doc_code.to_string(),
        severity,
        note: "ยางรั่ว".to_string(),
        ..Default::default()
    };
    assert_eq!(validator().validate(&check).unwrap().first_message(), expected);
}

#[test]
fn test_collect_all_mode_on_check() {
    let check = AmbulanceCheck {
        date_time: Local::now() - Duration::days(2),
        doc_code: "abc".to_string(),
        severity: 9,
        ..Default::default()
    };
    let result = validator().validate_with(&check, Mode::CollectAll).unwrap();
    let messages: Vec<&str> = result.failures.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Time must be current date",
            "DocCode must be in correct form",
            "Level must be between 1-3",
        ]
    );
}
