//! Translating tagged positions into array regions.
//!
//! Tags describe regions in real-world coordinates; arrays are indexed by
//! element. This module resolves the former into the latter: positions go
//! through the per-axis [`Dimension`] descriptors of the referenced array
//! (scaling units on the way), extents become element counts, and axes the
//! tag does not constrain are covered whole. [`retrieve_data`] then reads the
//! resolved region out of a referenced array in one call.

use ndarray::{ArrayD, IxDyn};
use thiserror::Error;

use crate::{
    array::{ArrayError, DataArray, Element},
    dimension::{Dimension, DimensionError},
    region::{DataRegion, IncompatibleRankError, RegionOutOfBoundsError},
    storage::ArrayBackend,
    tag::{MultiTag, Tag},
};

/// An error resolving a tagged region against a data array.
#[derive(Debug, Error)]
pub enum DataAccessError {
    /// A position could not be resolved by a dimension descriptor.
    #[error(transparent)]
    Dimension(#[from] DimensionError),
    /// The referenced data array failed.
    #[error(transparent)]
    Array(#[from] ArrayError),
    /// The resolved region does not fit in the array extent.
    #[error(transparent)]
    OutOfBounds(#[from] RegionOutOfBoundsError),
    /// The tag position has more axes than the array.
    #[error(transparent)]
    Rank(#[from] IncompatibleRankError),
    /// A reference or position index outside the tag.
    #[error("invalid index {index}, the tag has {count} entries")]
    InvalidIndex {
        /// The requested index.
        index: usize,
        /// The number of entries in the tag.
        count: usize,
    },
}

/// Convert a position into an index along `dimension`.
///
/// # Errors
/// Returns [`DataAccessError`] if the units are incompatible or the position
/// falls outside the dimension.
pub fn position_to_index(
    position: f64,
    unit: Option<&str>,
    dimension: &Dimension,
) -> Result<u64, DataAccessError> {
    Ok(dimension.position_to_index(position, unit)?)
}

/// Returns true if `position` addresses an element of `array`.
///
/// False if the rank differs or any coordinate reaches the extent.
///
/// # Errors
/// Returns [`DataAccessError`] if the array has no data.
pub fn position_in_data<TBackend: ArrayBackend + ?Sized>(
    array: &DataArray<TBackend>,
    position: &[u64],
) -> Result<bool, DataAccessError> {
    let extent = array.data_extent()?;
    Ok(position.len() == extent.len()
        && std::iter::zip(position, &extent).all(|(p, e)| p < e))
}

/// Returns true if the region at `offset` spanning `count` fits in `array`.
///
/// # Errors
/// Returns [`DataAccessError`] if the array has no data or the ranks of
/// `offset` and `count` differ.
pub fn position_and_extent_in_data<TBackend: ArrayBackend + ?Sized>(
    array: &DataArray<TBackend>,
    offset: &[u64],
    count: &[u64],
) -> Result<bool, DataAccessError> {
    let extent = array.data_extent()?;
    let region = DataRegion::new(offset.to_vec(), count.to_vec())?;
    Ok(region.inbounds(&extent))
}

/// Resolve the region of `array` covered by `tag`.
///
/// # Errors
/// Returns [`DataAccessError`] if a position cannot be resolved, the tag has
/// more axes than the array, or the region falls outside the array.
pub fn get_offset_and_count<TBackend: ArrayBackend + ?Sized>(
    tag: &Tag<TBackend>,
    array: &DataArray<TBackend>,
) -> Result<DataRegion, DataAccessError> {
    resolve_region(array, tag.position(), tag.extent(), tag.units())
}

/// Resolve the region of `array` covered by entry `index` of `tag`.
///
/// # Errors
/// Returns [`DataAccessError`] if `index` is outside the tag positions, a
/// position cannot be resolved, or the region falls outside the array.
pub fn get_offset_and_count_at<TBackend: ArrayBackend + ?Sized>(
    tag: &MultiTag<TBackend>,
    array: &DataArray<TBackend>,
    index: usize,
) -> Result<DataRegion, DataAccessError> {
    let position = tag.position(index).ok_or(DataAccessError::InvalidIndex {
        index,
        count: tag.position_count(),
    })?;
    resolve_region(array, position, tag.extent(index), tag.units())
}

/// Read the region of reference `reference_index` covered by `tag`.
///
/// # Errors
/// Returns [`DataAccessError`] if the reference index is invalid, the region
/// cannot be resolved, or the element type does not match the stored data.
pub fn retrieve_data<T: Element, TBackend: ArrayBackend + ?Sized>(
    tag: &Tag<TBackend>,
    reference_index: usize,
) -> Result<ArrayD<T>, DataAccessError> {
    let array = reference(tag.reference(reference_index), reference_index, tag.reference_count())?;
    let region = get_offset_and_count(tag, array)?;
    read_region(array, &region)
}

/// Read the region of reference `reference_index` covered by entry
/// `position_index` of `tag`.
///
/// # Errors
/// Returns [`DataAccessError`] if either index is invalid, the region cannot
/// be resolved, or the element type does not match the stored data.
pub fn retrieve_data_at<T: Element, TBackend: ArrayBackend + ?Sized>(
    tag: &MultiTag<TBackend>,
    position_index: usize,
    reference_index: usize,
) -> Result<ArrayD<T>, DataAccessError> {
    let array = reference(tag.reference(reference_index), reference_index, tag.reference_count())?;
    let region = get_offset_and_count_at(tag, array, position_index)?;
    read_region(array, &region)
}

fn reference<'a, TBackend: ?Sized>(
    array: Option<&'a DataArray<TBackend>>,
    index: usize,
    count: usize,
) -> Result<&'a DataArray<TBackend>, DataAccessError> {
    array.ok_or(DataAccessError::InvalidIndex { index, count })
}

/// The unit attached to `axis`, with `""` and `"none"` meaning no unit.
fn axis_unit(units: &[String], axis: usize) -> Option<&str> {
    units
        .get(axis)
        .map(String::as_str)
        .filter(|unit| !unit.is_empty() && *unit != "none")
}

/// The shared resolver behind [`get_offset_and_count`] and
/// [`get_offset_and_count_at`].
///
/// Tagged axes map their position through the dimension descriptor at that
/// axis; an extent coordinate spans from the position index to the index of
/// `position + extent`, at least one element. Untagged trailing axes are
/// covered whole.
fn resolve_region<TBackend: ArrayBackend + ?Sized>(
    array: &DataArray<TBackend>,
    position: &[f64],
    extent: Option<&[f64]>,
    units: &[String],
) -> Result<DataRegion, DataAccessError> {
    let array_extent = array.data_extent()?;
    if position.len() > array_extent.len() {
        return Err(IncompatibleRankError::new(position.len(), array_extent.len()).into());
    }

    let mut offsets = Vec::with_capacity(array_extent.len());
    let mut counts = Vec::with_capacity(array_extent.len());
    for (axis, &size) in array_extent.iter().enumerate() {
        let Some(&coordinate) = position.get(axis) else {
            offsets.push(0);
            counts.push(size);
            continue;
        };
        let unit = axis_unit(units, axis);
        let dimension = array.dimension(axis + 1)?;
        let start = dimension.position_to_index(coordinate, unit)?;
        let count = match extent.and_then(|extent| extent.get(axis)) {
            Some(&span) => {
                let end = dimension.position_to_index(coordinate + span, unit)?;
                end.saturating_sub(start).max(1)
            }
            None => 1,
        };
        offsets.push(start);
        counts.push(count);
    }

    let region = DataRegion::new(offsets, counts)?;
    if region.inbounds(&array_extent) {
        Ok(region)
    } else {
        Err(RegionOutOfBoundsError {
            offset: region.offset().to_vec(),
            count: region.count().to_vec(),
            extent: array_extent,
        }
        .into())
    }
}

fn read_region<T: Element, TBackend: ArrayBackend + ?Sized>(
    array: &DataArray<TBackend>,
    region: &DataRegion,
) -> Result<ArrayD<T>, DataAccessError> {
    let mut out = ArrayD::from_elem(IxDyn(&[0]), T::zeroed());
    array.data_region(&mut out, region.count(), region.offset())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{RangeDimension, SampledDimension, SetDimension};
    use crate::storage::MemoryBackend;
    use std::sync::Arc;

    fn voltage_trace() -> DataArray<MemoryBackend> {
        let array = DataArray::new(Arc::new(MemoryBackend::new()));
        array
            .set_data(&(1..=10).map(f64::from).collect::<Vec<f64>>())
            .unwrap();
        let time = SampledDimension {
            unit: Some("s".to_string()),
            ..SampledDimension::new(0.001)
        };
        array.append_dimension(time.into()).unwrap();
        array
    }

    #[test]
    fn tagged_segment_of_a_sampled_trace() {
        let array = voltage_trace();
        let dimension = array.dimension(1).unwrap();
        assert_eq!(
            position_to_index(0.005, Some("s"), &dimension).unwrap(),
            5
        );

        let mut tag = Tag::new(vec![0.003]);
        tag.set_extent(Some(vec![0.004]));
        tag.set_units(vec!["s".to_string()]);
        tag.add_reference(array);

        let region = get_offset_and_count(&tag, tag.reference(0).unwrap()).unwrap();
        assert_eq!(region.offset(), &[3]);
        assert_eq!(region.count(), &[4]);

        let segment: ArrayD<f64> = retrieve_data(&tag, 0).unwrap();
        assert_eq!(
            segment,
            ArrayD::from_shape_vec(IxDyn(&[4]), vec![4.0, 5.0, 6.0, 7.0]).unwrap()
        );
    }

    #[test]
    fn tag_units_scale_into_dimension_units() {
        let array = voltage_trace();
        let mut tag = Tag::new(vec![3.0]);
        tag.set_extent(Some(vec![4.0]));
        tag.set_units(vec!["ms".to_string()]);
        tag.add_reference(array);

        let segment: ArrayD<f64> = retrieve_data(&tag, 0).unwrap();
        assert_eq!(
            segment,
            ArrayD::from_shape_vec(IxDyn(&[4]), vec![4.0, 5.0, 6.0, 7.0]).unwrap()
        );
    }

    #[test]
    fn untagged_axes_are_covered_whole() {
        let array = DataArray::new(Arc::new(MemoryBackend::new()));
        array
            .set_data(
                &ArrayD::from_shape_vec(IxDyn(&[4, 3]), (0..12).map(f64::from).collect()).unwrap(),
            )
            .unwrap();
        array
            .append_dimension(RangeDimension::new(vec![0.0, 10.0, 20.0, 30.0]).into())
            .unwrap();

        let mut tag = Tag::new(vec![10.0]);
        tag.add_reference(array);

        let region = get_offset_and_count(&tag, tag.reference(0).unwrap()).unwrap();
        assert_eq!(region.offset(), &[1, 0]);
        assert_eq!(region.count(), &[1, 3]);

        let row: ArrayD<f64> = retrieve_data(&tag, 0).unwrap();
        assert_eq!(
            row,
            ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![3.0, 4.0, 5.0]).unwrap()
        );
    }

    #[test]
    fn multi_tag_positions_resolve_independently() {
        let array = voltage_trace();
        let mut tag = MultiTag::new(vec![vec![0.001], vec![0.006]]);
        tag.set_extents(Some(vec![vec![0.002], vec![0.002]]));
        tag.set_units(vec!["s".to_string()]);
        tag.add_reference(array);

        let first: ArrayD<f64> = retrieve_data_at(&tag, 0, 0).unwrap();
        assert_eq!(
            first,
            ArrayD::from_shape_vec(IxDyn(&[2]), vec![2.0, 3.0]).unwrap()
        );
        let second: ArrayD<f64> = retrieve_data_at(&tag, 1, 0).unwrap();
        assert_eq!(
            second,
            ArrayD::from_shape_vec(IxDyn(&[2]), vec![7.0, 8.0]).unwrap()
        );
    }

    #[test]
    fn extent_shorter_than_one_sample_covers_one_element() {
        let array = voltage_trace();
        let mut tag = Tag::new(vec![0.002]);
        tag.set_extent(Some(vec![0.0001]));
        tag.set_units(vec!["s".to_string()]);
        tag.add_reference(array);

        let region = get_offset_and_count(&tag, tag.reference(0).unwrap()).unwrap();
        assert_eq!(region.offset(), &[2]);
        assert_eq!(region.count(), &[1]);
    }

    #[test]
    fn resolution_failures() {
        let array = voltage_trace();

        // More position axes than the array has.
        let mut wide = Tag::new(vec![0.0, 0.0]);
        wide.add_reference(array.clone());
        assert!(matches!(
            get_offset_and_count(&wide, wide.reference(0).unwrap()),
            Err(DataAccessError::Rank(_))
        ));

        // A region reaching past the end of the trace.
        let mut long = Tag::new(vec![0.008]);
        long.set_extent(Some(vec![0.005]));
        long.set_units(vec!["s".to_string()]);
        long.add_reference(array.clone());
        assert!(matches!(
            get_offset_and_count(&long, long.reference(0).unwrap()),
            Err(DataAccessError::OutOfBounds(_))
        ));

        // A reference index outside the tag.
        let mut tag = Tag::new(vec![0.001]);
        tag.add_reference(array);
        assert!(matches!(
            retrieve_data::<f64, _>(&tag, 1),
            Err(DataAccessError::InvalidIndex { index: 1, count: 1 })
        ));

        // A labelled axis rejects positions carrying a unit.
        let labelled = DataArray::new(Arc::new(MemoryBackend::new()));
        labelled.set_data(&vec![1.0f64, 2.0]).unwrap();
        labelled
            .append_dimension(SetDimension::new(vec!["a".into(), "b".into()]).into())
            .unwrap();
        let mut bad = Tag::new(vec![1.0]);
        bad.set_units(vec!["s".to_string()]);
        bad.add_reference(labelled);
        assert!(matches!(
            get_offset_and_count(&bad, bad.reference(0).unwrap()),
            Err(DataAccessError::Dimension(_))
        ));
    }

    #[test]
    fn multi_tag_position_index_outside_the_tag() {
        let array = voltage_trace();
        let mut tag = MultiTag::new(vec![vec![0.001]]);
        tag.set_units(vec!["s".to_string()]);
        tag.add_reference(array);

        assert!(matches!(
            get_offset_and_count_at(&tag, tag.reference(0).unwrap(), 1),
            Err(DataAccessError::InvalidIndex { index: 1, count: 1 })
        ));
        assert!(matches!(
            retrieve_data_at::<f64, _>(&tag, 2, 0),
            Err(DataAccessError::InvalidIndex { index: 2, count: 1 })
        ));
    }

    #[test]
    fn positions_in_data() {
        let array = DataArray::new(Arc::new(MemoryBackend::new()));
        array
            .set_data(&ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0u8; 6]).unwrap())
            .unwrap();

        assert!(position_in_data(&array, &[1, 2]).unwrap());
        assert!(!position_in_data(&array, &[1, 3]).unwrap());
        assert!(!position_in_data(&array, &[1]).unwrap());

        assert!(position_and_extent_in_data(&array, &[1, 1], &[1, 2]).unwrap());
        assert!(!position_and_extent_in_data(&array, &[1, 2], &[1, 2]).unwrap());
    }
}
