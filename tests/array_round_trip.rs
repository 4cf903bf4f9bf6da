#![allow(missing_docs)]

use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};
use ndstore::array::{DataArray, DataType, Element, NdContainer};
use ndstore::storage::{ArrayBackend, MemoryBackend};

fn round_trip<T: Element + PartialEq + std::fmt::Debug>(values: Vec<T>) {
    let array = DataArray::new(Arc::new(MemoryBackend::new()));
    array.set_data(&values).unwrap();
    assert_eq!(array.data_type().unwrap(), T::DATA_TYPE);
    assert_eq!(array.data_extent().unwrap(), vec![values.len() as u64]);

    let mut read = Vec::<T>::new();
    array.data(&mut read).unwrap();
    assert_eq!(read, values);
}

#[test]
fn round_trip_all_element_types() {
    round_trip(vec![-1i8, 0, 1]);
    round_trip(vec![-300i16, 300]);
    round_trip(vec![-70000i32, 70000]);
    round_trip(vec![i64::MIN, i64::MAX]);
    round_trip(vec![0u8, 255]);
    round_trip(vec![0u16, 65535]);
    round_trip(vec![0u32, u32::MAX]);
    round_trip(vec![0u64, u64::MAX]);
    round_trip(vec![-1.5f32, 1.5]);
    round_trip(vec![-1.5f64, 1.5]);
}

#[test]
fn rank_zero_array() {
    let array = DataArray::new(Arc::new(MemoryBackend::new()));
    array.set_data(&42i32).unwrap();
    assert_eq!(array.data_extent().unwrap(), Vec::<u64>::new());

    let mut read = 0i32;
    array.data(&mut read).unwrap();
    assert_eq!(read, 42);
}

#[test]
fn partial_reads_and_writes() {
    let array = DataArray::new(Arc::new(MemoryBackend::new()));
    array.create_data(DataType::Double, &[4, 4]).unwrap();

    let row = vec![1.0f64, 2.0, 3.0, 4.0];
    let mut shaped = ArrayD::from_shape_vec(IxDyn(&[1, 4]), row).unwrap();
    array.set_data_at(&shaped, &[2, 0]).unwrap();

    let mut column = Vec::<f64>::new();
    array.data_region(&mut column, &[4, 1], &[0, 2]).unwrap();
    assert_eq!(column, vec![0.0, 0.0, 3.0, 0.0]);

    NdContainer::resize(&mut shaped, &[2, 2]);
    array.data_at(&mut shaped, &[2, 1]).unwrap();
    assert_eq!(
        shaped,
        ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![2.0, 3.0, 0.0, 0.0]).unwrap()
    );
}

#[test]
fn growing_preserves_written_data() {
    let array = DataArray::new(Arc::new(MemoryBackend::new()));
    array
        .set_data(&ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1u32, 2, 3, 4]).unwrap())
        .unwrap();

    array.set_data_extent(&[3, 3]).unwrap();
    let mut read = ArrayD::<u32>::zeros(IxDyn(&[0]));
    array.data(&mut read).unwrap();
    assert_eq!(
        read,
        ArrayD::from_shape_vec(IxDyn(&[3, 3]), vec![1, 2, 0, 3, 4, 0, 0, 0, 0]).unwrap()
    );
}

#[test]
fn works_through_a_trait_object() {
    let backend: Arc<dyn ArrayBackend> = Arc::new(MemoryBackend::new());
    let array = DataArray::new(backend);
    array.set_data(&vec![10i64, 20, 30]).unwrap();

    let clone = array.clone();
    clone.set_data_at(&99i64, &[1]).unwrap();

    let mut read = Vec::<i64>::new();
    array.data(&mut read).unwrap();
    assert_eq!(read, vec![10, 99, 30]);
}
