pub mod convert;
pub mod scalar;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value type of a symbol or column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Type of NULL literals and of intermediate aggregate states.
    Undefined,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Ip,
    Timestamp,
    Object,
    GeoPoint,
    Array(Box<DataType>),
}

impl DataType {
    pub fn array(inner: DataType) -> Self {
        DataType::Array(Box::new(inner))
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Byte
                | DataType::Short
                | DataType::Integer
                | DataType::Long
                | DataType::Float
                | DataType::Double
        )
    }

    pub const fn is_integral(&self) -> bool {
        matches!(
            self,
            DataType::Byte | DataType::Short | DataType::Integer | DataType::Long
        )
    }

    /// If values of this type can be used as a GROUP BY key.
    pub const fn is_groupable(&self) -> bool {
        !matches!(
            self,
            DataType::Object | DataType::GeoPoint | DataType::Array(_)
        )
    }

    /// If values of this type have a total order usable for ORDER BY.
    ///
    /// Currently the same set as groupable types.
    pub const fn is_sortable(&self) -> bool {
        self.is_groupable()
    }

    /// Check if a value of this type can be converted to `to`.
    pub fn is_convertible_to(&self, to: &DataType) -> bool {
        convert::is_convertible(self, to)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Boolean => write!(f, "boolean"),
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Integer => write!(f, "integer"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Ip => write!(f, "ip"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Object => write!(f, "object"),
            Self::GeoPoint => write!(f, "geo_point"),
            Self::Array(inner) => write!(f, "{inner}_array"),
        }
    }
}
