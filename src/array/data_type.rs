//! Element type tags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The type of the elements held by a data array or a
/// [`Value`](crate::value::Value).
///
/// The numeric kinds are storable in arrays; `Nothing`, `Bool` and `String`
/// only occur as [`Value`](crate::value::Value) arms.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// No value.
    Nothing,
    /// Boolean.
    Bool,
    /// Integer in `[-2^7, 2^7-1]`.
    Int8,
    /// Integer in `[-2^15, 2^15-1]`.
    Int16,
    /// Integer in `[-2^31, 2^31-1]`.
    Int32,
    /// Integer in `[-2^63, 2^63-1]`.
    Int64,
    /// Integer in `[0, 2^8-1]`.
    UInt8,
    /// Integer in `[0, 2^16-1]`.
    UInt16,
    /// Integer in `[0, 2^32-1]`.
    UInt32,
    /// Integer in `[0, 2^64-1]`.
    UInt64,
    /// IEEE 754 single-precision floating point.
    Float,
    /// IEEE 754 double-precision floating point.
    Double,
    /// A UTF-8 encoded string.
    String,
}

/// An unsupported data type error.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported data type {_0}")]
pub struct UnsupportedDataTypeError(String);

impl DataType {
    /// Returns the identifier.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// Parse a data type from its identifier.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if `identifier` does not name a
    /// data type.
    pub fn from_identifier(identifier: &str) -> Result<Self, UnsupportedDataTypeError> {
        match identifier {
            "nothing" => Ok(Self::Nothing),
            "bool" => Ok(Self::Bool),
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "string" => Ok(Self::String),
            _ => Err(UnsupportedDataTypeError(identifier.to_string())),
        }
    }

    /// Returns the size in bytes of one element, or [`None`] for types with no
    /// fixed raw layout (`Nothing`, `String`).
    #[must_use]
    pub const fn size_in_bytes(&self) -> Option<usize> {
        match self {
            Self::Nothing | Self::String => None,
            Self::Bool | Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float => Some(4),
            Self::Int64 | Self::UInt64 | Self::Double => Some(8),
        }
    }

    /// Returns true for the numeric kinds storable in a data array.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
                | Self::Float
                | Self::Double
        )
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_identifier_round_trip() {
        for data_type in [
            DataType::Nothing,
            DataType::Bool,
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
            DataType::UInt8,
            DataType::UInt16,
            DataType::UInt32,
            DataType::UInt64,
            DataType::Float,
            DataType::Double,
            DataType::String,
        ] {
            assert_eq!(
                DataType::from_identifier(data_type.identifier()).unwrap(),
                data_type
            );
        }
        assert!(DataType::from_identifier("complex128").is_err());
    }

    #[test]
    fn data_type_sizes() {
        assert_eq!(DataType::Double.size_in_bytes(), Some(8));
        assert_eq!(DataType::Int16.size_in_bytes(), Some(2));
        assert_eq!(DataType::Nothing.size_in_bytes(), None);
        assert_eq!(DataType::String.size_in_bytes(), None);
    }

    #[test]
    fn data_type_numeric() {
        assert!(DataType::UInt32.is_numeric());
        assert!(!DataType::Bool.is_numeric());
        assert!(!DataType::String.is_numeric());
    }
}
