//! Schema tests for the dispatch records
//!
//! - Every record's rules build against the default registry
//! - The relational schema is self-consistent
//! - Declared references, unique columns and validated fields exist on the structs

use pretty_assertions::assert_eq;
use rescue_entity::*;
use rescue_rules::{EngineConfig, Validator};
use serde::Serialize;
use std::collections::BTreeSet;

fn json_keys<T: Default + Serialize>() -> BTreeSet<String> {
    match serde_json::to_value(T::default()).unwrap() {
        serde_json::Value::Object(map) => map.keys().cloned().collect(),
        other => panic!("expected an object, got {}", other),
    }
}

fn check_entity<T: Entity + Default + Serialize>(validator: &Validator) {
    let keys = json_keys::<T>();
    let schema = T::schema();
    assert_eq!(schema.entity.name(), T::TYPE_NAME);

    for reference in schema.references {
        assert!(keys.contains(reference.field), "{}.{}", T::TYPE_NAME, reference.field);
        assert!(reference.field.ends_with("_id"));
    }
    for column in schema.unique {
        assert!(keys.contains(*column), "{}.{}", T::TYPE_NAME, column);
    }

    let spec = validator.prepare::<T>().unwrap();
    for field in spec.fields() {
        assert!(keys.contains(field.name()), "{}.{}", T::TYPE_NAME, field.name());
        assert!(schema.reference(field.name()).is_none(), "references are never validated");
    }
}

#[test]
fn test_every_entity_matches_its_schema() {
    let validator = Validator::from_config(EngineConfig::default());
    check_entity::<Patient>(&validator);
    check_entity::<Employee>(&validator);
    check_entity::<Ambulance>(&validator);
    check_entity::<AmbulanceOnDuty>(&validator);
    check_entity::<AmbulanceArrival>(&validator);
    check_entity::<Assessment>(&validator);
    check_entity::<Incident>(&validator);
    check_entity::<Status>(&validator);
    check_entity::<AmbulanceType>(&validator);
    check_entity::<Illness>(&validator);
    check_entity::<Urgency>(&validator);
    check_entity::<Problem>(&validator);
    check_entity::<AmbulanceCheck>(&validator);
}

#[test]
fn test_prepare_all_with_global_registry() {
    let validator = Validator::default();
    assert!(prepare_all(&validator).is_ok());
}

#[test]
fn test_relational_schema_check() {
    assert_eq!(RelationalSchema.check(), Ok(()));
    assert_eq!(RelationalSchema.entities().len(), EntityKind::ALL.len());
}

#[test]
fn test_employee_collections() {
    let names: Vec<&str> = Employee::schema().collections.iter().map(|c| c.field).collect();
    assert_eq!(
        names,
        vec!["ambulances", "assessments", "incidents", "ambulance_arrivals", "ambulance_on_duties"]
    );
}

#[test]
fn test_password_is_never_serialized() {
    let employee = Employee {
        email: "staff@example.com".to_string(),
        password: "secret".to_string(),
        ..Default::default()
    };
    let json = serde_json::to_string(&employee).unwrap();
    assert!(!json.contains("secret"));
    assert!(json.contains("staff@example.com"));
}

#[test]
fn test_incident_json_round_trip() {
    let incident = Incident {
        title: "รถชน".to_string(),
        numberpatient: 2,
        urgency_id: Some(Id::new(3)),
        ..Default::default()
    };
    let json = serde_json::to_string(&incident).unwrap();
    assert!(json.contains("\"urgency_id\":3"));
    assert!(json.contains("\"employee_id\":null"));

    let back: Incident = serde_json::from_str(&json).unwrap();
    assert_eq!(back, incident);
}
