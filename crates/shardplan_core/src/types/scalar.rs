use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{PlanError, Result};

/// A constant value carried by a literal symbol or a setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Array(Vec<ScalarValue>),
}

impl ScalarValue {
    pub fn try_as_u64(&self) -> Result<u64> {
        match self {
            Self::Int(v) => u64::try_from(*v)
                .map_err(|_| PlanError::Internal(format!("Value {v} is not a valid u64"))),
            Self::UInt(v) => Ok(*v),
            other => Err(PlanError::Internal(format!(
                "Expected integer value, got {other}"
            ))),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "'{v}'"),
            Self::Array(vals) => {
                write!(f, "[")?;
                for (idx, val) in vals.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{val}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        ScalarValue::UInt(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_strings() {
        assert_eq!("'ok'", ScalarValue::from("ok").to_string());
        assert_eq!("[1, 2]", ScalarValue::Array(vec![ScalarValue::Int(1), ScalarValue::Int(2)]).to_string());
    }

    #[test]
    fn negative_not_u64() {
        assert!(ScalarValue::Int(-1).try_as_u64().is_err());
        assert_eq!(4, ScalarValue::Int(4).try_as_u64().unwrap());
    }

    #[test]
    fn u64_max_kept_unsigned() {
        let value = ScalarValue::from(u64::MAX);
        assert_eq!(ScalarValue::UInt(u64::MAX), value);
        assert_eq!(u64::MAX, value.try_as_u64().unwrap());
        assert_eq!("18446744073709551615", value.to_string());
    }
}
