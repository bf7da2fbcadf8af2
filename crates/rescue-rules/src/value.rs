// File: rescue-rules/src/value.rs
// Purpose: Runtime field values seen by predicates

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// The kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Int,
    Float,
    Timestamp,
    Seq,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Seq => "seq",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field's current value, borrowed from the record where possible.
///
/// Unsigned and narrower integers widen to `Int`, `f32` widens to `Float`.
/// Collections are represented by their length only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Local>),
    Seq(usize),
}

impl FieldValue<'_> {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Int(_) => ValueKind::Int,
            FieldValue::Float(_) => ValueKind::Float,
            FieldValue::Timestamp(_) => ValueKind::Timestamp,
            FieldValue::Seq(_) => ValueKind::Seq,
        }
    }

    /// Whether this is the zero value for its kind.
    ///
    /// The zero timestamp is the Unix epoch, which is what
    /// `DateTime::<Local>::default()` produces.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Int(n) => *n == 0,
            FieldValue::Float(x) => *x == 0.0,
            FieldValue::Timestamp(ts) => ts.timestamp() == 0 && ts.timestamp_subsec_nanos() == 0,
            FieldValue::Seq(len) => *len == 0,
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Text(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        FieldValue::Text(value.as_str())
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue<'_> {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<u32> for FieldValue<'_> {
    fn from(value: u32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<f32> for FieldValue<'_> {
    fn from(value: f32) -> Self {
        FieldValue::Float(f64::from(value))
    }
}

impl From<DateTime<Local>> for FieldValue<'_> {
    fn from(value: DateTime<Local>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<'a, T> From<&'a [T]> for FieldValue<'a> {
    fn from(value: &'a [T]) -> Self {
        FieldValue::Seq(value.len())
    }
}
