//! Conversion table between data types.
//!
//! This only answers whether a conversion exists. Actually converting values
//! happens during execution through the `cast` function.

use super::DataType;

/// Check if values of type `have` can be converted to `want`.
pub fn is_convertible(have: &DataType, want: &DataType) -> bool {
    if have == want {
        return true;
    }

    match have {
        // NULL (and undefined states) convert to anything.
        DataType::Undefined => true,

        DataType::Byte | DataType::Short | DataType::Integer | DataType::Long => {
            want.is_numeric() || matches!(want, DataType::String | DataType::Timestamp)
        }
        DataType::Float => want.is_numeric() || matches!(want, DataType::String),
        DataType::Double => {
            want.is_numeric() || matches!(want, DataType::String | DataType::Timestamp)
        }

        DataType::String => {
            want.is_numeric()
                || matches!(
                    want,
                    DataType::Boolean | DataType::Ip | DataType::Timestamp
                )
        }

        DataType::Boolean | DataType::Ip => matches!(want, DataType::String),
        DataType::Timestamp => matches!(
            want,
            DataType::Long | DataType::Double | DataType::String
        ),

        DataType::GeoPoint => match want {
            DataType::Array(inner) => inner.as_ref() == &DataType::Double,
            _ => false,
        },

        DataType::Array(have_inner) => match want {
            DataType::Array(want_inner) => is_convertible(have_inner, want_inner),
            DataType::GeoPoint => matches!(
                have_inner.as_ref(),
                DataType::Double | DataType::Float | DataType::String
            ),
            _ => false,
        },

        // Objects only convert to themselves.
        DataType::Object => false,
    }
}
