//! The typed data array handle.

use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};

use crate::{
    dimension::Dimension,
    region::DataRegion,
    storage::{ArrayBackend, StorageError},
};

use super::{ArrayError, DataType, Element, NdContainer, NdSize};

/// Evaluate a calibration polynomial at `input`.
///
/// `coefficients[k]` is the coefficient of `(input - origin)^k`; an empty
/// coefficient list evaluates to zero.
#[must_use]
pub fn apply_polynomial(coefficients: &[f64], origin: f64, input: f64) -> f64 {
    let x = input - origin;
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// A typed handle over a storage engine holding one N-dimensional array.
///
/// The handle itself is stateless; everything lives in the engine, so clones
/// of a `DataArray` observe the same data. Typed access takes any
/// [`NdContainer`], so a scalar, a [`Vec`] or an [`ndarray::ArrayD`] of a
/// supported element type all work:
///
/// ```
/// # use std::sync::Arc;
/// # use ndstore::array::DataArray;
/// # use ndstore::storage::MemoryBackend;
/// let array = DataArray::new(Arc::new(MemoryBackend::new()));
/// array.set_data(&vec![1.0f64, 2.0, 3.0])?;
/// let mut single = 0.0f64;
/// array.data_at(&mut single, &[2])?;
/// assert_eq!(single, 3.0);
/// # Ok::<(), ndstore::array::ArrayError>(())
/// ```
#[derive(Debug)]
pub struct DataArray<TBackend: ?Sized> {
    backend: Arc<TBackend>,
}

impl<TBackend: ?Sized> Clone for DataArray<TBackend> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<TBackend: ArrayBackend + ?Sized> DataArray<TBackend> {
    /// Create a new data array over `backend`.
    #[must_use]
    pub fn new(backend: Arc<TBackend>) -> Self {
        Self { backend }
    }

    /// Return the underlying storage engine.
    #[must_use]
    pub fn backend(&self) -> &Arc<TBackend> {
        &self.backend
    }

    /// Allocate element storage of `data_type` with `extent`.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if data already exists or `data_type` is not
    /// numeric.
    pub fn create_data(&self, data_type: DataType, extent: &[u64]) -> Result<(), ArrayError> {
        Ok(self.backend.create_data(data_type, extent)?)
    }

    /// Allocate element storage sized and typed after `value`, then write
    /// `value` at the origin.
    ///
    /// An empty `extent` means `value.shape()`; a larger `extent` leaves the
    /// cells outside `value` zero.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if data already exists, `value` does not fit
    /// in `extent`, or `value` has no contiguous element view.
    pub fn create_data_from<TValue: NdContainer>(
        &self,
        value: &TValue,
        extent: &[u64],
    ) -> Result<(), ArrayError> {
        let elements = value.as_elements().ok_or(ArrayError::NonContiguousBuffer)?;
        let extent = if extent.is_empty() && !value.shape().is_empty() {
            value.shape()
        } else {
            extent.to_vec()
        };
        self.create_data(TValue::Elem::DATA_TYPE, &extent)?;
        let offset = vec![0; extent.len()];
        let count = Self::count_at(&value.shape(), &offset);
        self.write_elements(elements, &count, &offset)
    }

    /// Returns true once element storage has been created.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.backend.has_data()
    }

    /// Read the whole array into `value`, resizing it to the array extent.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if no data exists or the element type of
    /// `value` does not match the stored data type.
    pub fn data<TValue: NdContainer>(&self, value: &mut TValue) -> Result<(), ArrayError> {
        let extent = self.data_extent()?;
        value.resize(&extent);
        let dest = value
            .as_elements_mut()
            .ok_or(ArrayError::NonContiguousBuffer)?;
        self.read_elements(dest, &extent, &vec![0; extent.len()])
    }

    /// Read `count` elements at `offset` into `value`, resizing it to
    /// `count`.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if no data exists, the element type mismatches
    /// or the region is out of bounds.
    pub fn data_region<TValue: NdContainer>(
        &self,
        value: &mut TValue,
        count: &[u64],
        offset: &[u64],
    ) -> Result<(), ArrayError> {
        value.resize(count);
        let dest = value
            .as_elements_mut()
            .ok_or(ArrayError::NonContiguousBuffer)?;
        self.read_elements(dest, count, offset)
    }

    /// Read elements at `offset` into `value`, keeping its current shape.
    ///
    /// A scalar `value` reads the single element at `offset`.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if no data exists, the element type mismatches
    /// or the region is out of bounds.
    pub fn data_at<TValue: NdContainer>(
        &self,
        value: &mut TValue,
        offset: &[u64],
    ) -> Result<(), ArrayError> {
        let count = Self::count_at(&value.shape(), offset);
        let dest = value
            .as_elements_mut()
            .ok_or(ArrayError::NonContiguousBuffer)?;
        self.read_elements(dest, &count, offset)
    }

    /// Write the whole array from `value`, creating or resizing the element
    /// storage to `value.shape()` first.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if the element type mismatches existing data,
    /// the rank changes, or `value` has no contiguous element view.
    pub fn set_data<TValue: NdContainer>(&self, value: &TValue) -> Result<(), ArrayError> {
        if !self.has_data() {
            return self.create_data_from(value, &[]);
        }
        let elements = value.as_elements().ok_or(ArrayError::NonContiguousBuffer)?;
        let extent = value.shape();
        self.set_data_extent(&extent)?;
        self.write_elements(elements, &extent, &vec![0; extent.len()])
    }

    /// Write `value` at `offset`, leaving the extent unchanged.
    ///
    /// A scalar `value` writes the single element at `offset`.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if no data exists, the element type mismatches,
    /// `value` does not fit at `offset`, or `value` has no contiguous
    /// element view.
    pub fn set_data_at<TValue: NdContainer>(
        &self,
        value: &TValue,
        offset: &[u64],
    ) -> Result<(), ArrayError> {
        let elements = value.as_elements().ok_or(ArrayError::NonContiguousBuffer)?;
        let count = Self::count_at(&value.shape(), offset);
        self.write_elements(elements, &count, offset)
    }

    /// The region count for a buffer of `shape` addressed at `offset`. A
    /// rank-0 buffer covers one element on each addressed axis.
    fn count_at(shape: &[u64], offset: &[u64]) -> NdSize {
        if shape.is_empty() {
            vec![1; offset.len()]
        } else {
            shape.to_vec()
        }
    }

    /// Return the array extent.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if no data exists.
    pub fn data_extent(&self) -> Result<NdSize, ArrayError> {
        Ok(self.backend.extent()?)
    }

    /// Grow or shrink the array extent. The overlapping region is preserved;
    /// new cells are zero.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if no data exists or the rank changes.
    pub fn set_data_extent(&self, extent: &[u64]) -> Result<(), ArrayError> {
        Ok(self.backend.set_extent(extent)?)
    }

    /// Return the stored data type.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if no data exists.
    pub fn data_type(&self) -> Result<DataType, ArrayError> {
        Ok(self.backend.data_type()?)
    }

    /// Return the label of the stored values.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.backend.label()
    }

    /// Set the label of the stored values.
    pub fn set_label(&self, label: Option<String>) {
        self.backend.set_label(label);
    }

    /// Return the unit of the stored values.
    #[must_use]
    pub fn unit(&self) -> Option<String> {
        self.backend.unit()
    }

    /// Set the unit of the stored values.
    pub fn set_unit(&self, unit: Option<String>) {
        self.backend.set_unit(unit);
    }

    /// Return the expansion origin of the calibration polynomial.
    #[must_use]
    pub fn expansion_origin(&self) -> f64 {
        self.backend.expansion_origin()
    }

    /// Set the expansion origin of the calibration polynomial.
    pub fn set_expansion_origin(&self, origin: f64) {
        self.backend.set_expansion_origin(origin);
    }

    /// Return the calibration polynomial coefficients.
    #[must_use]
    pub fn polynom_coefficients(&self) -> Vec<f64> {
        self.backend.polynom_coefficients()
    }

    /// Set the calibration polynomial coefficients.
    pub fn set_polynom_coefficients(&self, coefficients: Vec<f64>) {
        self.backend.set_polynom_coefficients(coefficients);
    }

    /// Read the whole array and apply the calibration polynomial to every
    /// element.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if no data exists or the stored data type is
    /// not [`DataType::Double`].
    pub fn data_calibrated(&self) -> Result<ArrayD<f64>, ArrayError> {
        let mut raw = ArrayD::<f64>::zeros(IxDyn(&[0]));
        self.data(&mut raw)?;
        let coefficients = self.polynom_coefficients();
        let origin = self.expansion_origin();
        raw.mapv_inplace(|input| apply_polynomial(&coefficients, origin, input));
        Ok(raw)
    }

    /// Return the number of dimension descriptors.
    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.backend.dimension_count()
    }

    /// Return the dimension descriptor at 1-based `axis`.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidAxis`] if `axis` is outside the
    /// dimension table.
    pub fn dimension(&self, axis: usize) -> Result<Dimension, ArrayError> {
        self.backend.dimension(axis).map_err(Self::map_axis)
    }

    /// Create or replace the dimension descriptor at 1-based `axis`.
    ///
    /// `axis` may be at most `dimension_count() + 1`.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidAxis`] if `axis` is `0` or would leave a
    /// gap in the dimension table.
    pub fn set_dimension(&self, axis: usize, dimension: Dimension) -> Result<(), ArrayError> {
        self.backend
            .set_dimension(axis, dimension)
            .map_err(Self::map_axis)
    }

    /// Append a dimension descriptor after the last axis, returning its
    /// 1-based axis index.
    ///
    /// # Errors
    /// Returns [`ArrayError`] if the storage engine rejects the descriptor.
    pub fn append_dimension(&self, dimension: Dimension) -> Result<usize, ArrayError> {
        let axis = self.dimension_count() + 1;
        self.set_dimension(axis, dimension)?;
        Ok(axis)
    }

    /// Delete the dimension descriptor at 1-based `axis`; descriptors above
    /// it shift down by one.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidAxis`] if `axis` is outside the
    /// dimension table.
    pub fn delete_dimension(&self, axis: usize) -> Result<(), ArrayError> {
        self.backend.delete_dimension(axis).map_err(Self::map_axis)
    }

    fn map_axis(error: StorageError) -> ArrayError {
        match error {
            StorageError::InvalidAxis { axis, count } => ArrayError::InvalidAxis { axis, count },
            error => ArrayError::Storage(error),
        }
    }

    fn check_region(&self, count: &[u64], offset: &[u64]) -> Result<(), ArrayError> {
        let extent = self.data_extent()?;
        let region = DataRegion::new(offset.to_vec(), count.to_vec())?;
        if region.inbounds(&extent) {
            Ok(())
        } else {
            Err(ArrayError::OutOfBounds {
                offset: offset.to_vec(),
                count: count.to_vec(),
                extent,
            })
        }
    }

    fn check_data_type(&self, data_type: DataType) -> Result<(), ArrayError> {
        let stored = self.data_type()?;
        if data_type == stored {
            Ok(())
        } else {
            Err(ArrayError::IncompatibleDataType {
                got: data_type,
                expected: stored,
            })
        }
    }

    fn read_elements<T: Element>(
        &self,
        dest: &mut [T],
        count: &[u64],
        offset: &[u64],
    ) -> Result<(), ArrayError> {
        self.check_data_type(T::DATA_TYPE)?;
        self.check_region(count, offset)?;
        self.backend
            .read(T::DATA_TYPE, bytemuck::cast_slice_mut(dest), count, offset)?;
        Ok(())
    }

    fn write_elements<T: Element>(
        &self,
        src: &[T],
        count: &[u64],
        offset: &[u64],
    ) -> Result<(), ArrayError> {
        self.check_data_type(T::DATA_TYPE)?;
        self.check_region(count, offset)?;
        self.backend
            .write(T::DATA_TYPE, bytemuck::cast_slice(src), count, offset)?;
        Ok(())
    }
}
