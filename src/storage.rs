//! Storage engines.
//!
//! [`ArrayBackend`] is the contract between
//! [`DataArray`](crate::array::DataArray) and whatever engine holds the bytes
//! of one array. The core never depends on a concrete engine; the in-memory
//! [`MemoryBackend`] is provided both as the reference implementation and for
//! tests, and persistent engines implement the same trait.

mod memory;

pub use memory::MemoryBackend;

use thiserror::Error;

use crate::{
    array::{DataType, NdSize},
    dimension::Dimension,
    region::{IncompatibleRankError, RegionBytesError, RegionOutOfBoundsError},
};

/// A storage engine error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No data has been created for the array yet.
    #[error("no data has been created for this array")]
    NoData,
    /// Data has already been created for the array.
    #[error("data has already been created for this array")]
    DataExists,
    /// The data type cannot back an array.
    #[error("data type {_0} cannot be stored in an array")]
    UnsupportedDataType(DataType),
    /// The element type of an access does not match the stored data type.
    #[error("incompatible data type {got}, expected {expected}")]
    IncompatibleDataType {
        /// The data type of the access.
        got: DataType,
        /// The stored data type.
        expected: DataType,
    },
    /// A region fell outside the stored extent.
    #[error(transparent)]
    OutOfBounds(#[from] RegionOutOfBoundsError),
    /// Size-vector ranks do not match.
    #[error(transparent)]
    IncompatibleRank(#[from] IncompatibleRankError),
    /// A buffer length does not match the accessed region.
    #[error("expected a buffer of {expected} bytes, got {got}")]
    InvalidBufferLength {
        /// The actual buffer length.
        got: usize,
        /// The length implied by the region and data type.
        expected: usize,
    },
    /// An axis index outside `1..=dimension_count()`.
    #[error("invalid axis {axis}, the array has {count} dimensions")]
    InvalidAxis {
        /// The 1-based axis index of the access.
        axis: usize,
        /// The number of dimensions attached to the array.
        count: usize,
    },
    /// An engine-specific error.
    #[error("{_0}")]
    Other(String),
}

impl From<RegionBytesError> for StorageError {
    fn from(error: RegionBytesError) -> Self {
        match error {
            RegionBytesError::OutOfBounds(error) => Self::OutOfBounds(error),
            RegionBytesError::InvalidBufferLength { got, expected } => {
                Self::InvalidBufferLength { got, expected }
            }
        }
    }
}

/// The capability contract a storage engine provides for one array.
///
/// Data access is byte-level and row-major: element buffers cross this
/// boundary as raw bytes tagged with their [`DataType`], addressed by
/// offset and count vectors. Implementations validate a whole access before
/// mutating anything, so a failed write leaves the stored bytes untouched.
///
/// All methods take `&self`; engines use interior mutability and may support
/// concurrent readers. This layer assumes at most one mutator of a given
/// array's extent or data at a time.
pub trait ArrayBackend: Send + Sync {
    /// Allocate storage for elements of `data_type` with `extent`.
    ///
    /// # Errors
    /// Returns [`StorageError`] if data already exists or `data_type` is not
    /// a numeric kind.
    fn create_data(&self, data_type: DataType, extent: &[u64]) -> Result<(), StorageError>;

    /// Returns true once data has been created.
    fn has_data(&self) -> bool;

    /// Read `count` elements at `offset` into `dest`.
    ///
    /// # Errors
    /// Returns [`StorageError`] if no data exists, the data type or buffer
    /// length mismatch, or the region is out of bounds.
    fn read(
        &self,
        data_type: DataType,
        dest: &mut [u8],
        count: &[u64],
        offset: &[u64],
    ) -> Result<(), StorageError>;

    /// Write `count` elements from `src` at `offset`.
    ///
    /// # Errors
    /// Returns [`StorageError`] if no data exists, the data type or buffer
    /// length mismatch, or the region is out of bounds.
    fn write(
        &self,
        data_type: DataType,
        src: &[u8],
        count: &[u64],
        offset: &[u64],
    ) -> Result<(), StorageError>;

    /// Return the current extent.
    ///
    /// # Errors
    /// Returns [`StorageError::NoData`] if no data exists.
    fn extent(&self) -> Result<NdSize, StorageError>;

    /// Grow or shrink the extent. The region overlapping the old extent is
    /// preserved; new cells are zero.
    ///
    /// # Errors
    /// Returns [`StorageError`] if no data exists or the rank changes.
    fn set_extent(&self, extent: &[u64]) -> Result<(), StorageError>;

    /// Return the stored data type.
    ///
    /// # Errors
    /// Returns [`StorageError::NoData`] if no data exists.
    fn data_type(&self) -> Result<DataType, StorageError>;

    /// Return the label of the stored values.
    fn label(&self) -> Option<String>;

    /// Set the label of the stored values.
    fn set_label(&self, label: Option<String>);

    /// Return the unit of the stored values.
    fn unit(&self) -> Option<String>;

    /// Set the unit of the stored values.
    fn set_unit(&self, unit: Option<String>);

    /// Return the expansion origin of the calibration polynomial.
    fn expansion_origin(&self) -> f64;

    /// Set the expansion origin of the calibration polynomial.
    fn set_expansion_origin(&self, origin: f64);

    /// Return the calibration polynomial coefficients.
    fn polynom_coefficients(&self) -> Vec<f64>;

    /// Set the calibration polynomial coefficients.
    fn set_polynom_coefficients(&self, coefficients: Vec<f64>);

    /// Return the number of dimension descriptors.
    fn dimension_count(&self) -> usize;

    /// Return the dimension descriptor at 1-based `axis`.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidAxis`] if `axis` is outside
    /// `1..=dimension_count()`.
    fn dimension(&self, axis: usize) -> Result<Dimension, StorageError>;

    /// Create or replace the dimension descriptor at 1-based `axis`.
    ///
    /// `axis` may be at most `dimension_count() + 1`, keeping axis indices
    /// contiguous.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidAxis`] if `axis` is `0` or would leave
    /// a gap.
    fn set_dimension(&self, axis: usize, dimension: Dimension) -> Result<(), StorageError>;

    /// Delete the dimension descriptor at 1-based `axis`; descriptors above
    /// it shift down by one.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidAxis`] if `axis` is outside
    /// `1..=dimension_count()`.
    fn delete_dimension(&self, axis: usize) -> Result<(), StorageError>;
}
