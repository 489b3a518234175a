//! Dynamic attribute values.
//!
//! Filters and accessors exchange values through [`Value`], so a selection
//! can hold predicates over attributes of any entity type.

use std::cmp::Ordering;
use std::fmt;

use uuid::Uuid;

use crate::error::{OrmError, OrmResult};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the value kind, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Uuid(_) => "uuid",
        }
    }

    /// Compare two values when they have a natural ordering.
    ///
    /// Values of the same kind compare; integers and floats compare with each
    /// other. Anything else (including null) is incomparable and yields `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}

// =============================================================================
// Conversions into Value
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// Conversions out of Value
// =============================================================================

fn conversion_error(expected: &'static str, actual: &Value) -> OrmError {
    OrmError::ValueConversion {
        expected,
        actual: actual.kind(),
    }
}

impl TryFrom<Value> for bool {
    type Error = OrmError;

    fn try_from(value: Value) -> OrmResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(conversion_error("bool", &other)),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = OrmError;

    fn try_from(value: Value) -> OrmResult<Self> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(conversion_error("i64", &other)),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = OrmError;

    fn try_from(value: Value) -> OrmResult<Self> {
        match value {
            Value::Int(n) => i32::try_from(n).map_err(|_| conversion_error("i32", &Value::Int(n))),
            other => Err(conversion_error("i32", &other)),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = OrmError;

    fn try_from(value: Value) -> OrmResult<Self> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(n) => Ok(n as f64),
            other => Err(conversion_error("f64", &other)),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = OrmError;

    fn try_from(value: Value) -> OrmResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(conversion_error("String", &other)),
        }
    }
}

impl TryFrom<Value> for Uuid {
    type Error = OrmError;

    fn try_from(value: Value) -> OrmResult<Self> {
        match value {
            Value::Uuid(u) => Ok(u),
            other => Err(conversion_error("Uuid", &other)),
        }
    }
}

/// Nullable conversion: `Null` becomes `None`, anything else converts.
pub fn try_optional<T>(value: Value) -> OrmResult<Option<T>>
where
    T: TryFrom<Value, Error = OrmError>,
{
    match value {
        Value::Null => Ok(None),
        other => T::try_from(other).map(Some),
    }
}
