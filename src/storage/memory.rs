//! An in-memory storage engine.

use parking_lot::RwLock;

use crate::{
    array::{num_elements, DataType, NdSize},
    dimension::Dimension,
    region::{DataRegion, IncompatibleRankError},
};

use super::{ArrayBackend, StorageError};

#[derive(Debug)]
struct DataState {
    data_type: DataType,
    element_size: usize,
    extent: NdSize,
    bytes: Vec<u8>,
}

#[derive(Debug)]
struct Inner {
    data: Option<DataState>,
    label: Option<String>,
    unit: Option<String>,
    expansion_origin: f64,
    polynom_coefficients: Vec<f64>,
    dimensions: Vec<Dimension>,
}

/// An in-memory storage engine backing a single array.
///
/// Bytes are held in a flat row-major buffer behind a [`RwLock`], so holding
/// one `MemoryBackend` behind an [`Arc`](std::sync::Arc) supports concurrent
/// readers.
#[derive(Debug)]
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    /// Create a new in-memory engine with identity calibration and no data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                data: None,
                label: None,
                unit: None,
                expansion_origin: 0.0,
                polynom_coefficients: vec![0.0, 1.0],
                dimensions: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DataState {
    fn check_data_type(&self, data_type: DataType) -> Result<(), StorageError> {
        if data_type == self.data_type {
            Ok(())
        } else {
            Err(StorageError::IncompatibleDataType {
                got: data_type,
                expected: self.data_type,
            })
        }
    }
}

fn region(offset: &[u64], count: &[u64]) -> Result<DataRegion, StorageError> {
    Ok(DataRegion::new(offset.to_vec(), count.to_vec())?)
}

impl ArrayBackend for MemoryBackend {
    fn create_data(&self, data_type: DataType, extent: &[u64]) -> Result<(), StorageError> {
        let Some(element_size) = data_type.size_in_bytes().filter(|_| data_type.is_numeric())
        else {
            return Err(StorageError::UnsupportedDataType(data_type));
        };
        let mut inner = self.inner.write();
        if inner.data.is_some() {
            return Err(StorageError::DataExists);
        }
        let len = usize::try_from(num_elements(extent)).unwrap() * element_size;
        inner.data = Some(DataState {
            data_type,
            element_size,
            extent: extent.to_vec(),
            bytes: vec![0; len],
        });
        Ok(())
    }

    fn has_data(&self) -> bool {
        self.inner.read().data.is_some()
    }

    fn read(
        &self,
        data_type: DataType,
        dest: &mut [u8],
        count: &[u64],
        offset: &[u64],
    ) -> Result<(), StorageError> {
        let inner = self.inner.read();
        let state = inner.data.as_ref().ok_or(StorageError::NoData)?;
        state.check_data_type(data_type)?;
        let subset = region(offset, count)?.extract_bytes(
            &state.bytes,
            &state.extent,
            state.element_size,
        )?;
        if dest.len() != subset.len() {
            return Err(StorageError::InvalidBufferLength {
                got: dest.len(),
                expected: subset.len(),
            });
        }
        dest.copy_from_slice(&subset);
        Ok(())
    }

    fn write(
        &self,
        data_type: DataType,
        src: &[u8],
        count: &[u64],
        offset: &[u64],
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let state = inner.data.as_mut().ok_or(StorageError::NoData)?;
        state.check_data_type(data_type)?;
        let extent = state.extent.clone();
        region(offset, count)?.store_bytes(src, &mut state.bytes, &extent, state.element_size)?;
        Ok(())
    }

    fn extent(&self) -> Result<NdSize, StorageError> {
        let inner = self.inner.read();
        let state = inner.data.as_ref().ok_or(StorageError::NoData)?;
        Ok(state.extent.clone())
    }

    fn set_extent(&self, extent: &[u64]) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let state = inner.data.as_mut().ok_or(StorageError::NoData)?;
        if extent.len() != state.extent.len() {
            return Err(IncompatibleRankError::new(extent.len(), state.extent.len()).into());
        }
        if extent == state.extent {
            return Ok(());
        }

        let len = usize::try_from(num_elements(extent)).unwrap() * state.element_size;
        let mut bytes = vec![0; len];
        let overlap: NdSize = std::iter::zip(extent, &state.extent)
            .map(|(new, old)| std::cmp::min(*new, *old))
            .collect();
        let copy = DataRegion::new_whole(&overlap);
        let subset = copy.extract_bytes(&state.bytes, &state.extent, state.element_size)?;
        copy.store_bytes(&subset, &mut bytes, extent, state.element_size)?;

        state.extent = extent.to_vec();
        state.bytes = bytes;
        Ok(())
    }

    fn data_type(&self) -> Result<DataType, StorageError> {
        let inner = self.inner.read();
        let state = inner.data.as_ref().ok_or(StorageError::NoData)?;
        Ok(state.data_type)
    }

    fn label(&self) -> Option<String> {
        self.inner.read().label.clone()
    }

    fn set_label(&self, label: Option<String>) {
        self.inner.write().label = label;
    }

    fn unit(&self) -> Option<String> {
        self.inner.read().unit.clone()
    }

    fn set_unit(&self, unit: Option<String>) {
        self.inner.write().unit = unit;
    }

    fn expansion_origin(&self) -> f64 {
        self.inner.read().expansion_origin
    }

    fn set_expansion_origin(&self, origin: f64) {
        self.inner.write().expansion_origin = origin;
    }

    fn polynom_coefficients(&self) -> Vec<f64> {
        self.inner.read().polynom_coefficients.clone()
    }

    fn set_polynom_coefficients(&self, coefficients: Vec<f64>) {
        self.inner.write().polynom_coefficients = coefficients;
    }

    fn dimension_count(&self) -> usize {
        self.inner.read().dimensions.len()
    }

    fn dimension(&self, axis: usize) -> Result<Dimension, StorageError> {
        let inner = self.inner.read();
        if axis == 0 || axis > inner.dimensions.len() {
            return Err(StorageError::InvalidAxis {
                axis,
                count: inner.dimensions.len(),
            });
        }
        Ok(inner.dimensions[axis - 1].clone())
    }

    fn set_dimension(&self, axis: usize, dimension: Dimension) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if axis == 0 || axis > inner.dimensions.len() + 1 {
            return Err(StorageError::InvalidAxis {
                axis,
                count: inner.dimensions.len(),
            });
        }
        if axis == inner.dimensions.len() + 1 {
            inner.dimensions.push(dimension);
        } else {
            inner.dimensions[axis - 1] = dimension;
        }
        Ok(())
    }

    fn delete_dimension(&self, axis: usize) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if axis == 0 || axis > inner.dimensions.len() {
            return Err(StorageError::InvalidAxis {
                axis,
                count: inner.dimensions.len(),
            });
        }
        inner.dimensions.remove(axis - 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::SetDimension;

    #[test]
    fn memory_create_and_round_trip() {
        let backend = MemoryBackend::new();
        assert!(!backend.has_data());
        assert!(matches!(backend.extent(), Err(StorageError::NoData)));

        backend.create_data(DataType::UInt8, &[2, 3]).unwrap();
        assert!(backend.has_data());
        assert_eq!(backend.extent().unwrap(), vec![2, 3]);
        assert_eq!(backend.data_type().unwrap(), DataType::UInt8);
        assert!(matches!(
            backend.create_data(DataType::UInt8, &[2, 3]),
            Err(StorageError::DataExists)
        ));

        backend
            .write(DataType::UInt8, &[1, 2, 3, 4, 5, 6], &[2, 3], &[0, 0])
            .unwrap();
        let mut out = [0u8; 2];
        backend
            .read(DataType::UInt8, &mut out, &[2, 1], &[0, 1])
            .unwrap();
        assert_eq!(out, [2, 5]);
    }

    #[test]
    fn memory_rejects_value_only_types() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.create_data(DataType::String, &[4]),
            Err(StorageError::UnsupportedDataType(DataType::String))
        ));
    }

    #[test]
    fn memory_write_validates_before_mutating() {
        let backend = MemoryBackend::new();
        backend.create_data(DataType::UInt8, &[4]).unwrap();
        backend
            .write(DataType::UInt8, &[1, 2, 3, 4], &[4], &[0])
            .unwrap();
        assert!(matches!(
            backend.write(DataType::UInt8, &[9, 9], &[2], &[3]),
            Err(StorageError::OutOfBounds(_))
        ));
        assert!(matches!(
            backend.write(DataType::UInt16, &[0, 0], &[1], &[0]),
            Err(StorageError::IncompatibleDataType { .. })
        ));
        let mut out = [0u8; 4];
        backend.read(DataType::UInt8, &mut out, &[4], &[0]).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn memory_set_extent_preserves_overlap() {
        let backend = MemoryBackend::new();
        backend.create_data(DataType::UInt8, &[2, 2]).unwrap();
        backend
            .write(DataType::UInt8, &[1, 2, 3, 4], &[2, 2], &[0, 0])
            .unwrap();

        backend.set_extent(&[2, 3]).unwrap();
        let mut out = [0u8; 6];
        backend
            .read(DataType::UInt8, &mut out, &[2, 3], &[0, 0])
            .unwrap();
        assert_eq!(out, [1, 2, 0, 3, 4, 0]);

        backend.set_extent(&[1, 2]).unwrap();
        let mut out = [0u8; 2];
        backend
            .read(DataType::UInt8, &mut out, &[1, 2], &[0, 0])
            .unwrap();
        assert_eq!(out, [1, 2]);

        assert!(matches!(
            backend.set_extent(&[4]),
            Err(StorageError::IncompatibleRank(_))
        ));
    }

    #[test]
    fn memory_dimension_table() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.dimension_count(), 0);
        assert!(matches!(
            backend.dimension(1),
            Err(StorageError::InvalidAxis { axis: 1, count: 0 })
        ));

        let first = Dimension::Set(SetDimension::new(vec!["a".into()]));
        let second = Dimension::Set(SetDimension::new(vec!["b".into()]));
        backend.set_dimension(1, first).unwrap();
        backend.set_dimension(2, second.clone()).unwrap();
        assert!(matches!(
            backend.set_dimension(4, second.clone()),
            Err(StorageError::InvalidAxis { axis: 4, count: 2 })
        ));
        assert_eq!(backend.dimension_count(), 2);

        backend.delete_dimension(1).unwrap();
        assert_eq!(backend.dimension_count(), 1);
        assert_eq!(backend.dimension(1).unwrap(), second);
        assert!(backend.dimension(2).is_err());
    }
}
