//! Typed data arrays.
//!
//! A [`DataArray`] is the typed handle over a storage engine holding one
//! N-dimensional array: element storage, extent, per-axis
//! [`Dimension`](crate::dimension::Dimension) descriptors, and the metadata
//! describing the stored values (label, unit, calibration polynomial).
//!
//! Typed access goes through [`Element`] and [`NdContainer`]: scalars,
//! [`Vec`]s and [`ndarray::ArrayD`]s of the supported element types read and
//! write directly, with the element type checked against the stored
//! [`DataType`] at run time.

mod array_errors;
mod data_array;
pub mod data_type;
mod element;

pub use array_errors::ArrayError;
pub use data_array::{apply_polynomial, DataArray};
pub use data_type::{DataType, UnsupportedDataTypeError};
pub use element::{Element, NdContainer};

/// The shape or extent of an array: one size per axis, row-major.
pub type NdSize = Vec<u64>;

/// The number of elements in an array of `extent`. One for rank 0.
#[must_use]
pub fn num_elements(extent: &[u64]) -> u64 {
    extent.iter().product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_elements_counts() {
        assert_eq!(num_elements(&[]), 1);
        assert_eq!(num_elements(&[0, 3]), 0);
        assert_eq!(num_elements(&[2, 3, 4]), 24);
    }
}
