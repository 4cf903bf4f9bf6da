//! Data array errors.

use thiserror::Error;

use crate::{
    array::{DataType, NdSize},
    region::IncompatibleRankError,
    storage::StorageError,
};

/// A data array error.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// A storage engine error.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The element type of an access does not match the stored data type.
    #[error("incompatible data type {got}, expected {expected}")]
    IncompatibleDataType {
        /// The element type of the access.
        got: DataType,
        /// The stored data type.
        expected: DataType,
    },
    /// A region fell outside the array extent.
    #[error("region with offset {offset:?} and count {count:?} does not fit in extent {extent:?}")]
    OutOfBounds {
        /// The region offset.
        offset: NdSize,
        /// The region count.
        count: NdSize,
        /// The array extent.
        extent: NdSize,
    },
    /// Size-vector ranks do not match.
    #[error(transparent)]
    IncompatibleRank(#[from] IncompatibleRankError),
    /// A caller buffer without contiguous row-major storage.
    #[error("the buffer is not contiguous row-major")]
    NonContiguousBuffer,
    /// An axis index outside the dimension table.
    #[error("invalid axis {axis}, the array has {count} dimensions")]
    InvalidAxis {
        /// The 1-based axis index of the access.
        axis: usize,
        /// The number of dimensions attached to the array.
        count: usize,
    },
}
