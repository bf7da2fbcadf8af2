// File: rescue-entity/src/id.rs
// Purpose: Typed entity identifiers and common model columns

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Identifier of a `T` row
///
/// Reference fields hold `Option<Id<T>>`: absent, or pointing at exactly
/// one `T`. The type parameter keeps a reference and its target in
/// agreement; storage resolves the id to a row when it needs one.
pub struct Id<T> {
    value: u64,
    _target: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _target: PhantomData,
        }
    }

    pub const fn value(&self) -> u64 {
        self.value
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::new)
    }
}

/// Columns every stored record carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ambulance;

    #[test]
    fn test_id_serializes_as_number() {
        let id: Id<Ambulance> = Id::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let back: Option<Id<Ambulance>> = serde_json::from_str("42").unwrap();
        assert_eq!(back, Some(id));

        let absent: Option<Id<Ambulance>> = serde_json::from_str("null").unwrap();
        assert_eq!(absent, None);
    }

    #[test]
    fn test_id_needs_no_bounds_on_target() {
        let a: Id<Ambulance> = 7.into();
        let b = a;
        assert_eq!(a, b);
        assert_eq!(format!("{:?} {}", a, a), "Id(7) 7");
    }

    #[test]
    fn test_model_defaults() {
        let model = Model::default();
        assert_eq!(model.id, 0);
        assert!(!model.is_deleted());
    }
}
