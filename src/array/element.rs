//! Element types and the buffer adapter.
//!
//! [`Element`] associates each supported Rust scalar type with its
//! [`DataType`] tag. [`NdContainer`] is the small capability set the typed
//! read/write surface needs from a caller's buffer: its element type, its
//! shape, a raw view of its contiguous row-major storage, and a resize used
//! before a read fills it. Unsupported element types are simply types without
//! an [`Element`] impl, so they are rejected at compile time.

use bytemuck::Pod;
use ndarray::{ArrayD, IxDyn};

use super::{DataType, NdSize};

/// A fixed-size element type storable in a data array.
pub trait Element: Pod {
    /// The type tag of this element type.
    const DATA_TYPE: DataType;
}

/// A multidimensional buffer usable with the typed read/write surface.
///
/// The element view is fallible: buffers whose storage is not contiguous
/// row-major (such as a transposed [`ndarray::ArrayD`]) return [`None`] and
/// the store surfaces an error instead of touching them. The scalar impls
/// treat a bare value as a rank-0 buffer with a single element.
pub trait NdContainer {
    /// The element type of the buffer.
    type Elem: Element;

    /// Return the current shape, one size per axis. Empty for rank 0.
    fn shape(&self) -> NdSize;

    /// Borrow the element storage, or [`None`] if it is not contiguous
    /// row-major.
    fn as_elements(&self) -> Option<&[Self::Elem]>;

    /// Mutably borrow the element storage, or [`None`] if it is not
    /// contiguous row-major.
    fn as_elements_mut(&mut self) -> Option<&mut [Self::Elem]>;

    /// Reshape the buffer to `extent` ahead of a read; previous contents need
    /// not be preserved.
    fn resize(&mut self, extent: &[u64]);
}

macro_rules! impl_element {
    ($raw_type:ty, $data_type:expr) => {
        impl Element for $raw_type {
            const DATA_TYPE: DataType = $data_type;
        }

        impl NdContainer for $raw_type {
            type Elem = $raw_type;

            fn shape(&self) -> NdSize {
                vec![]
            }

            fn as_elements(&self) -> Option<&[$raw_type]> {
                Some(std::slice::from_ref(self))
            }

            fn as_elements_mut(&mut self) -> Option<&mut [$raw_type]> {
                Some(std::slice::from_mut(self))
            }

            fn resize(&mut self, _extent: &[u64]) {}
        }
    };
}

impl_element!(i8, DataType::Int8);
impl_element!(i16, DataType::Int16);
impl_element!(i32, DataType::Int32);
impl_element!(i64, DataType::Int64);
impl_element!(u8, DataType::UInt8);
impl_element!(u16, DataType::UInt16);
impl_element!(u32, DataType::UInt32);
impl_element!(u64, DataType::UInt64);
impl_element!(f32, DataType::Float);
impl_element!(f64, DataType::Double);

impl<T: Element> NdContainer for Vec<T> {
    type Elem = T;

    fn shape(&self) -> NdSize {
        vec![self.len() as u64]
    }

    fn as_elements(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }

    fn as_elements_mut(&mut self) -> Option<&mut [T]> {
        Some(self.as_mut_slice())
    }

    fn resize(&mut self, extent: &[u64]) {
        let len = usize::try_from(extent.iter().product::<u64>()).unwrap();
        self.resize(len, T::zeroed());
    }
}

impl<T: Element> NdContainer for ArrayD<T> {
    type Elem = T;

    fn shape(&self) -> NdSize {
        self.shape().iter().map(|&size| size as u64).collect()
    }

    fn as_elements(&self) -> Option<&[T]> {
        self.as_slice()
    }

    fn as_elements_mut(&mut self) -> Option<&mut [T]> {
        self.as_slice_mut()
    }

    fn resize(&mut self, extent: &[u64]) {
        let shape: Vec<usize> = extent
            .iter()
            .map(|&size| usize::try_from(size).unwrap())
            .collect();
        *self = Self::from_elem(IxDyn(&shape), T::zeroed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_is_rank_zero() {
        let mut value = 3.5f64;
        assert!(value.shape().is_empty());
        assert_eq!(NdContainer::as_elements(&value).unwrap(), &[3.5]);
        value.resize(&[]);
        assert_eq!(value, 3.5);
    }

    #[test]
    fn vec_shape_and_resize() {
        let mut value = vec![1i32, 2, 3];
        assert_eq!(NdContainer::shape(&value), vec![3]);
        NdContainer::resize(&mut value, &[5]);
        assert_eq!(value, vec![1, 2, 3, 0, 0]);
    }

    #[test]
    fn ndarray_shape_and_view() {
        let mut value = ArrayD::<u16>::zeros(IxDyn(&[2, 3]));
        assert_eq!(NdContainer::shape(&value), vec![2, 3]);
        assert_eq!(value.as_elements().unwrap().len(), 6);
        value.resize(&[4]);
        assert_eq!(NdContainer::shape(&value), vec![4]);
    }

    #[test]
    fn ndarray_non_contiguous_has_no_element_view() {
        let mut value = ArrayD::<f64>::zeros(IxDyn(&[2, 3])).reversed_axes();
        assert!(value.as_elements().is_none());
        assert!(value.as_elements_mut().is_none());
    }

    #[test]
    fn element_tags() {
        assert_eq!(<f32 as Element>::DATA_TYPE, DataType::Float);
        assert_eq!(<u64 as Element>::DATA_TYPE, DataType::UInt64);
    }
}
