// File: rescue-entity/src/relations.rs
// Purpose: Declarative relational schema for the dispatch records
//
// References, inverse collections and unique columns are data for the
// storage layer. The validator never reads them.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::records::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Patient,
    Employee,
    Ambulance,
    AmbulanceOnDuty,
    AmbulanceArrival,
    Assessment,
    Incident,
    Status,
    AmbulanceType,
    Illness,
    Urgency,
    Problem,
    AmbulanceCheck,
}

impl EntityKind {
    pub const ALL: [EntityKind; 13] = [
        EntityKind::Patient,
        EntityKind::Employee,
        EntityKind::Ambulance,
        EntityKind::AmbulanceOnDuty,
        EntityKind::AmbulanceArrival,
        EntityKind::Assessment,
        EntityKind::Incident,
        EntityKind::Status,
        EntityKind::AmbulanceType,
        EntityKind::Illness,
        EntityKind::Urgency,
        EntityKind::Problem,
        EntityKind::AmbulanceCheck,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Patient => "Patient",
            EntityKind::Employee => "Employee",
            EntityKind::Ambulance => "Ambulance",
            EntityKind::AmbulanceOnDuty => "AmbulanceOnDuty",
            EntityKind::AmbulanceArrival => "AmbulanceArrival",
            EntityKind::Assessment => "Assessment",
            EntityKind::Incident => "Incident",
            EntityKind::Status => "Status",
            EntityKind::AmbulanceType => "AmbulanceType",
            EntityKind::Illness => "Illness",
            EntityKind::Urgency => "Urgency",
            EntityKind::Problem => "Problem",
            EntityKind::AmbulanceCheck => "AmbulanceCheck",
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        schema_of(*self)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional single-valued link to another entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub field: &'static str,
    pub target: EntityKind,
    pub unique: bool,
}

impl Reference {
    const fn to(field: &'static str, target: EntityKind) -> Self {
        Self {
            field,
            target,
            unique: false,
        }
    }

    const fn unique(field: &'static str, target: EntityKind) -> Self {
        Self {
            field,
            target,
            unique: true,
        }
    }

    /// References are always nullable; an absent id is a valid state.
    pub fn nullable(&self) -> bool {
        true
    }
}

/// Inverse view: every `source` row whose `via` reference points here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub field: &'static str,
    pub source: EntityKind,
    pub via: &'static str,
}

impl Collection {
    const fn of(field: &'static str, source: EntityKind, via: &'static str) -> Self {
        Self { field, source, via }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntitySchema {
    pub entity: EntityKind,
    pub references: &'static [Reference],
    pub collections: &'static [Collection],
    pub unique: &'static [&'static str],
}

impl EntitySchema {
    pub fn reference(&self, field: &str) -> Option<&'static Reference> {
        self.references.iter().find(|r| r.field == field)
    }

    pub fn collection(&self, field: &str) -> Option<&'static Collection> {
        self.collections.iter().find(|c| c.field == field)
    }
}

use EntityKind as K;

static SCHEMAS: [EntitySchema; 13] = [
    EntitySchema {
        entity: K::Patient,
        references: &[],
        collections: &[
            Collection::of("assessments", K::Assessment, "patient_id"),
            Collection::of("ambulance_arrivals", K::AmbulanceArrival, "patient_id"),
        ],
        unique: &[],
    },
    EntitySchema {
        entity: K::Employee,
        references: &[],
        collections: &[
            Collection::of("ambulances", K::Ambulance, "employee_id"),
            Collection::of("assessments", K::Assessment, "recorder_id"),
            Collection::of("incidents", K::Incident, "employee_id"),
            Collection::of("ambulance_arrivals", K::AmbulanceArrival, "recorder_id"),
            Collection::of("ambulance_on_duties", K::AmbulanceOnDuty, "recorder_id"),
        ],
        unique: &["email"],
    },
    EntitySchema {
        entity: K::Ambulance,
        references: &[
            Reference::to("status_id", K::Status),
            Reference::to("ambulance_type_id", K::AmbulanceType),
            Reference::to("employee_id", K::Employee),
        ],
        collections: &[],
        unique: &["car_number"],
    },
    EntitySchema {
        entity: K::AmbulanceOnDuty,
        references: &[
            Reference::to("ambulance_id", K::Ambulance),
            Reference::to("recorder_id", K::Employee),
            Reference::to("incident_id", K::Incident),
        ],
        collections: &[Collection::of("ambulance_arrivals", K::AmbulanceArrival, "ambulance_on_duty_id")],
        unique: &[],
    },
    EntitySchema {
        entity: K::AmbulanceArrival,
        references: &[
            Reference::to("recorder_id", K::Employee),
            Reference::to("patient_id", K::Patient),
            Reference::unique("ambulance_on_duty_id", K::AmbulanceOnDuty),
        ],
        collections: &[],
        unique: &["ambulance_on_duty_id"],
    },
    EntitySchema {
        entity: K::Assessment,
        references: &[
            Reference::to("patient_id", K::Patient),
            Reference::to("recorder_id", K::Employee),
            Reference::to("incident_id", K::Incident),
        ],
        collections: &[],
        unique: &[],
    },
    EntitySchema {
        entity: K::Incident,
        references: &[
            Reference::to("employee_id", K::Employee),
            Reference::to("illness_id", K::Illness),
            Reference::to("urgency_id", K::Urgency),
        ],
        collections: &[Collection::of("assessments", K::Assessment, "incident_id")],
        unique: &[],
    },
    EntitySchema {
        entity: K::Status,
        references: &[],
        collections: &[Collection::of("ambulances", K::Ambulance, "status_id")],
        unique: &[],
    },
    EntitySchema {
        entity: K::AmbulanceType,
        references: &[],
        collections: &[Collection::of("ambulances", K::Ambulance, "ambulance_type_id")],
        unique: &[],
    },
    EntitySchema {
        entity: K::Illness,
        references: &[],
        collections: &[Collection::of("incidents", K::Incident, "illness_id")],
        unique: &[],
    },
    EntitySchema {
        entity: K::Urgency,
        references: &[],
        collections: &[Collection::of("incidents", K::Incident, "urgency_id")],
        unique: &[],
    },
    EntitySchema {
        entity: K::Problem,
        references: &[],
        collections: &[],
        unique: &[],
    },
    EntitySchema {
        entity: K::AmbulanceCheck,
        references: &[
            Reference::to("ambulance_id", K::Ambulance),
            Reference::to("recorder_id", K::Employee),
            Reference::to("problem_id", K::Problem),
        ],
        collections: &[],
        unique: &[],
    },
];

/// Schema of one entity
pub fn schema_of(kind: EntityKind) -> &'static EntitySchema {
    // SCHEMAS is ordered like EntityKind::ALL
    &SCHEMAS[kind as usize]
}

/// Ties a record type to its schema entry
pub trait Entity: rescue_rules::Record {
    const KIND: EntityKind;

    fn schema() -> &'static EntitySchema {
        schema_of(Self::KIND)
    }
}

macro_rules! entity_kinds {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Entity for $ty {
                const KIND: EntityKind = EntityKind::$ty;
            }
        )*
    };
}

entity_kinds!(
    Patient,
    Employee,
    Ambulance,
    AmbulanceOnDuty,
    AmbulanceArrival,
    Assessment,
    Incident,
    Status,
    AmbulanceType,
    Illness,
    Urgency,
    Problem,
    AmbulanceCheck,
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{entity}.{collection}: {source_entity} has no reference `{via}`")]
    MissingReference {
        entity: EntityKind,
        collection: &'static str,
        source_entity: EntityKind,
        via: &'static str,
    },

    #[error("{entity}.{collection}: {source_entity}.{via} points at {found}, not {entity}")]
    WrongTarget {
        entity: EntityKind,
        collection: &'static str,
        source_entity: EntityKind,
        via: &'static str,
        found: EntityKind,
    },

    #[error("{entity}.{field} is a unique reference but not listed as a unique column")]
    UndeclaredUnique { entity: EntityKind, field: &'static str },
}

/// The whole relational schema, as handed to storage
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationalSchema;

impl RelationalSchema {
    pub fn entities(&self) -> &'static [EntitySchema] {
        &SCHEMAS
    }

    /// Every collection must name a reference on its source entity that
    /// points back at the owner, and unique references must be unique columns.
    pub fn check(&self) -> Result<(), SchemaError> {
        for schema in &SCHEMAS {
            for collection in schema.collections {
                let reference = schema_of(collection.source).reference(collection.via).ok_or(
                    SchemaError::MissingReference {
                        entity: schema.entity,
                        collection: collection.field,
                        source_entity: collection.source,
                        via: collection.via,
                    },
                )?;

                if reference.target != schema.entity {
                    return Err(SchemaError::WrongTarget {
                        entity: schema.entity,
                        collection: collection.field,
                        source_entity: collection.source,
                        via: collection.via,
                        found: reference.target,
                    });
                }
            }

            for reference in schema.references.iter().filter(|r| r.unique) {
                if !schema.unique.contains(&reference.field) {
                    return Err(SchemaError::UndeclaredUnique {
                        entity: schema.entity,
                        field: reference.field,
                    });
                }
            }
        }

        tracing::debug!("Relational schema checked: {} entities", SCHEMAS.len());
        Ok(())
    }

    /// Collections on other entities that read through `kind.field`
    pub fn inverse_of(&self, kind: EntityKind, field: &str) -> Vec<(EntityKind, &'static Collection)> {
        SCHEMAS
            .iter()
            .flat_map(|schema| schema.collections.iter().map(move |c| (schema.entity, c)))
            .filter(|(_, c)| c.source == kind && c.via == field)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_kinds() {
        for kind in EntityKind::ALL {
            assert_eq!(schema_of(kind).entity, kind);
        }
    }

    #[test]
    fn test_schema_is_consistent() {
        assert_eq!(RelationalSchema.check(), Ok(()));
    }

    #[test]
    fn test_references_are_nullable() {
        for schema in RelationalSchema.entities() {
            assert!(schema.references.iter().all(Reference::nullable));
        }
    }

    #[test]
    fn test_arrival_belongs_to_one_duty() {
        let reference = AmbulanceArrival::schema().reference("ambulance_on_duty_id").unwrap();
        assert!(reference.unique);
        assert_eq!(reference.target, EntityKind::AmbulanceOnDuty);
    }

    #[test]
    fn test_inverse_of_recorder() {
        let inverse = RelationalSchema.inverse_of(EntityKind::Assessment, "recorder_id");
        assert_eq!(inverse.len(), 1);
        assert_eq!(inverse[0].0, EntityKind::Employee);
        assert_eq!(inverse[0].1.field, "assessments");
    }
}
