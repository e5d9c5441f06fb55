use std::fmt;

use crate::type_code::TypeCode;

/// One owned, typed value crossing the module boundary.
///
/// The variant is the TypeCode discriminator; there is no untyped storage.
/// Dropping the value releases whatever it owns, so every decoded value is
/// released exactly once by whoever holds it last.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Bool(bool),
}

impl ArgValue {
    pub fn type_code(&self) -> TypeCode {
        match self {
            ArgValue::U64(_) => TypeCode::U64,
            ArgValue::I64(_) => TypeCode::I64,
            ArgValue::F32(_) => TypeCode::F32,
            ArgValue::F64(_) => TypeCode::F64,
            ArgValue::Str(_) => TypeCode::Str,
            ArgValue::Bool(_) => TypeCode::Bool,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ArgValue::U64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::I64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ArgValue::F32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::F64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::U64(value) => write!(f, "{}", value),
            ArgValue::I64(value) => write!(f, "{}", value),
            ArgValue::F32(value) => write!(f, "{:?}", value),
            ArgValue::F64(value) => write!(f, "{:?}", value),
            ArgValue::Str(value) => write!(f, "{:?}", value),
            ArgValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        ArgValue::U64(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::I64(value)
    }
}

impl From<f32> for ArgValue {
    fn from(value: f32) -> Self {
        ArgValue::F32(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::F64(value)
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}
