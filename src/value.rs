//! Polymorphic metadata values.
//!
//! A [`Value`] holds one scalar of any supported [`DataType`] together with
//! the auxiliary fields describing its provenance (uncertainty, reference,
//! encoder, checksum). The payload is a closed enum, so arms carry their data
//! and swaps and clones need no manual lifetime handling.

use derive_more::From;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::array::DataType;

/// The typed payload of a [`Value`].
#[derive(Clone, Debug, Default, PartialEq, From, Serialize, Deserialize)]
pub enum ValuePayload {
    /// No value.
    #[default]
    Nothing,
    /// A boolean.
    Bool(bool),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 32-bit unsigned integer.
    UInt32(u32),
    /// A 64-bit signed integer.
    Int64(i64),
    /// A 64-bit unsigned integer.
    UInt64(u64),
    /// A double-precision float.
    Double(f64),
    /// A string.
    String(String),
}

impl From<&str> for ValuePayload {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl ValuePayload {
    /// Return the data type of the payload.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Nothing => DataType::Nothing,
            Self::Bool(_) => DataType::Bool,
            Self::Int32(_) => DataType::Int32,
            Self::UInt32(_) => DataType::UInt32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt64(_) => DataType::UInt64,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
        }
    }
}

/// A typed read of a [`Value`] holding a different data type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("requested a {requested} value, the value holds {actual}")]
pub struct ValueTypeError {
    /// The requested data type.
    pub requested: DataType,
    /// The data type actually held.
    pub actual: DataType,
}

/// A Rust type readable out of a [`ValuePayload`].
pub trait ValueType: Sized {
    /// The payload arm this type reads.
    const DATA_TYPE: DataType;

    /// Extract the value if the payload holds this arm.
    fn from_payload(payload: &ValuePayload) -> Option<Self>;
}

macro_rules! impl_value_type {
    ($raw_type:ty, $arm:ident) => {
        impl ValueType for $raw_type {
            const DATA_TYPE: DataType = DataType::$arm;

            fn from_payload(payload: &ValuePayload) -> Option<Self> {
                match payload {
                    ValuePayload::$arm(value) => Some(value.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_value_type!(bool, Bool);
impl_value_type!(i32, Int32);
impl_value_type!(u32, UInt32);
impl_value_type!(i64, Int64);
impl_value_type!(u64, UInt64);
impl_value_type!(f64, Double);
impl_value_type!(String, String);

/// A scalar metadata value with provenance fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Value {
    payload: ValuePayload,
    /// The uncertainty of the value.
    pub uncertainty: f64,
    /// A reference to the origin of the value.
    pub reference: String,
    /// The encoder that produced the value.
    pub encoder: String,
    /// A checksum over the value.
    pub checksum: String,
}

impl Value {
    /// Create a new value from any supported payload, with empty provenance
    /// fields.
    #[must_use]
    pub fn new(payload: impl Into<ValuePayload>) -> Self {
        Self {
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// Return the data type of the held payload.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.payload.data_type()
    }

    /// Return the held payload.
    #[must_use]
    pub const fn payload(&self) -> &ValuePayload {
        &self.payload
    }

    /// Replace the payload, keeping the provenance fields.
    pub fn set(&mut self, payload: impl Into<ValuePayload>) {
        self.payload = payload.into();
    }

    /// Clear the payload back to [`DataType::Nothing`], keeping the
    /// provenance fields.
    pub fn unset(&mut self) {
        self.payload = ValuePayload::Nothing;
    }

    /// Read the payload as `T`.
    ///
    /// # Errors
    /// Returns [`ValueTypeError`] if the payload holds a different data type.
    pub fn get<T: ValueType>(&self) -> Result<T, ValueTypeError> {
        T::from_payload(&self.payload).ok_or(ValueTypeError {
            requested: T::DATA_TYPE,
            actual: self.data_type(),
        })
    }

    /// Returns true if `data_type` can be held by a value.
    #[must_use]
    pub const fn supports_type(data_type: DataType) -> bool {
        matches!(
            data_type,
            DataType::Nothing
                | DataType::Bool
                | DataType::Int32
                | DataType::UInt32
                | DataType::Int64
                | DataType::UInt64
                | DataType::Double
                | DataType::String
        )
    }

    /// Exchange payloads and provenance fields with `other`.
    ///
    /// The swap is total: both payloads move, whatever arms they hold, and
    /// all four provenance fields move with them.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Value{{[{}] ", self.data_type())?;
        match &self.payload {
            ValuePayload::Nothing => write!(f, "")?,
            ValuePayload::Bool(value) => write!(f, "{value}")?,
            ValuePayload::Int32(value) => write!(f, "{value}")?,
            ValuePayload::UInt32(value) => write!(f, "{value}")?,
            ValuePayload::Int64(value) => write!(f, "{value}")?,
            ValuePayload::UInt64(value) => write!(f, "{value}")?,
            ValuePayload::Double(value) => write!(f, "{value}")?,
            ValuePayload::String(value) => write!(f, "{value}")?,
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_set_and_get() {
        let mut value = Value::new(3.5f64);
        assert_eq!(value.data_type(), DataType::Double);
        assert_eq!(value.get::<f64>().unwrap(), 3.5);

        value.set("calibrated");
        assert_eq!(value.data_type(), DataType::String);
        assert_eq!(value.get::<String>().unwrap(), "calibrated");

        value.unset();
        assert_eq!(value.data_type(), DataType::Nothing);
    }

    #[test]
    fn value_type_mismatch() {
        let value = Value::new(42i32);
        assert_eq!(
            value.get::<u32>(),
            Err(ValueTypeError {
                requested: DataType::UInt32,
                actual: DataType::Int32,
            })
        );
    }

    #[test]
    fn value_swap_crosses_arms() {
        let mut left = Value::new("text");
        left.uncertainty = 0.25;
        left.checksum = "abc".to_string();
        let mut right = Value::new(7u64);
        right.reference = "probe".to_string();

        // Repeated swaps must keep both values intact whatever arms they hold.
        for _ in 0..3 {
            left.swap(&mut right);
            std::mem::swap(&mut left, &mut right);
        }
        left.swap(&mut right);

        assert_eq!(left.get::<u64>().unwrap(), 7);
        assert_eq!(left.reference, "probe");
        assert_eq!(left.uncertainty, 0.0);
        assert_eq!(right.get::<String>().unwrap(), "text");
        assert_eq!(right.uncertainty, 0.25);
        assert_eq!(right.checksum, "abc");
    }

    #[test]
    fn value_supported_types() {
        assert!(Value::supports_type(DataType::Bool));
        assert!(Value::supports_type(DataType::String));
        assert!(!Value::supports_type(DataType::Int16));
        assert!(!Value::supports_type(DataType::Float));
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::new(3.5f64).to_string(), "Value{[double] 3.5}");
        assert_eq!(Value::new(true).to_string(), "Value{[bool] true}");
        assert_eq!(Value::default().to_string(), "Value{[nothing] }");
    }
}
