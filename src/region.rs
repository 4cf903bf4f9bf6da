//! Rectangular regions of N-dimensional arrays.
//!
//! A [`DataRegion`] pairs an offset vector with an element count vector, one
//! entry per axis. It is the unit of sub-array addressing throughout this
//! library: storage engines validate regions before touching any bytes, and
//! the region resolver produces them from tags.
//!
//! This module also provides the row-major byte copies behind sub-region reads
//! and writes: a region can iterate the contiguous element runs it covers
//! within an enclosing extent and extract or store the corresponding bytes.

use itertools::izip;
use thiserror::Error;

use crate::array::{num_elements, NdSize};

/// A rectangular region of an array: an offset and a count per axis.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct DataRegion {
    /// The first element covered on each axis.
    offset: NdSize,
    /// The number of elements covered on each axis.
    count: NdSize,
}

/// Two size vectors whose ranks were required to match but do not.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("incompatible rank {_0}, expected {_1}")]
pub struct IncompatibleRankError(usize, usize);

impl IncompatibleRankError {
    /// Create a new incompatible rank error.
    #[must_use]
    pub const fn new(got: usize, expected: usize) -> Self {
        Self(got, expected)
    }
}

/// A region that does not fit within an array extent.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("region with offset {offset:?} and count {count:?} does not fit in extent {extent:?}")]
pub struct RegionOutOfBoundsError {
    /// The region offset.
    pub offset: NdSize,
    /// The region count.
    pub count: NdSize,
    /// The enclosing array extent.
    pub extent: NdSize,
}

/// An error extracting or storing the bytes of a region.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegionBytesError {
    /// The region does not fit within the array extent.
    #[error(transparent)]
    OutOfBounds(#[from] RegionOutOfBoundsError),
    /// A buffer length does not match the region or array it stands for.
    #[error("expected a buffer of {expected} bytes, got {got}")]
    InvalidBufferLength {
        /// The actual buffer length.
        got: usize,
        /// The length implied by the extent or region.
        expected: usize,
    },
}

impl DataRegion {
    /// Create a new region from an offset and a count of equal rank.
    ///
    /// # Errors
    /// Returns [`IncompatibleRankError`] if the lengths of `offset` and
    /// `count` do not match.
    pub fn new(offset: NdSize, count: NdSize) -> Result<Self, IncompatibleRankError> {
        if offset.len() == count.len() {
            Ok(Self { offset, count })
        } else {
            Err(IncompatibleRankError::new(offset.len(), count.len()))
        }
    }

    /// Create the region covering the whole of `extent`.
    #[must_use]
    pub fn new_whole(extent: &[u64]) -> Self {
        Self {
            offset: vec![0; extent.len()],
            count: extent.to_vec(),
        }
    }

    /// Return the region offset.
    #[must_use]
    pub fn offset(&self) -> &[u64] {
        &self.offset
    }

    /// Return the region count.
    #[must_use]
    pub fn count(&self) -> &[u64] {
        &self.count
    }

    /// Return the rank (number of axes) of the region.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.offset.len()
    }

    /// Return the exclusive end of the region on each axis.
    #[must_use]
    pub fn end_exc(&self) -> NdSize {
        std::iter::zip(&self.offset, &self.count)
            .map(|(offset, count)| offset + count)
            .collect()
    }

    /// Return the number of elements covered by the region.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        num_elements(&self.count)
    }

    /// Returns true if the region fits within `extent` on every axis.
    ///
    /// False if the ranks differ or any axis violates
    /// `offset[i] + count[i] <= extent[i]`.
    #[must_use]
    pub fn inbounds(&self, extent: &[u64]) -> bool {
        self.rank() == extent.len()
            && izip!(&self.offset, &self.count, extent).all(|(o, c, e)| o + c <= *e)
    }

    /// Iterate the contiguous element runs of this region within an array of
    /// `extent`, as `(linearised start index, run length)` pairs.
    ///
    /// Runs coalesce trailing axes that the region covers completely, so a
    /// region spanning the whole array yields a single run.
    ///
    /// # Errors
    /// Returns [`RegionOutOfBoundsError`] if the region does not fit in
    /// `extent`.
    pub fn iter_contiguous_runs<'a>(
        &'a self,
        extent: &'a [u64],
    ) -> Result<ContiguousRuns<'a>, RegionOutOfBoundsError> {
        if self.inbounds(extent) {
            Ok(ContiguousRuns::new(self, extent))
        } else {
            Err(RegionOutOfBoundsError {
                offset: self.offset.clone(),
                count: self.count.clone(),
                extent: extent.to_vec(),
            })
        }
    }

    /// Extract the bytes of this region from the row-major `bytes` of an array
    /// with `extent` and `element_size`.
    ///
    /// # Errors
    /// Returns [`RegionBytesError`] if the region does not fit in `extent` or
    /// `bytes` does not match `extent` and `element_size`.
    ///
    /// # Panics
    /// Panics if a byte count does not fit in [`usize`].
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        extent: &[u64],
        element_size: usize,
    ) -> Result<Vec<u8>, RegionBytesError> {
        let expected = checked_len(extent, element_size);
        if bytes.len() != expected {
            return Err(RegionBytesError::InvalidBufferLength {
                got: bytes.len(),
                expected,
            });
        }
        let mut out = vec![0u8; checked_len(&self.count, element_size)];
        let mut out_offset = 0;
        for (start, length) in self.iter_contiguous_runs(extent)? {
            let byte_start = usize::try_from(start).unwrap() * element_size;
            let byte_length = usize::try_from(length).unwrap() * element_size;
            out[out_offset..out_offset + byte_length]
                .copy_from_slice(&bytes[byte_start..byte_start + byte_length]);
            out_offset += byte_length;
        }
        Ok(out)
    }

    /// Store `subset_bytes` into this region of the row-major `bytes` of an
    /// array with `extent` and `element_size`.
    ///
    /// Either the whole region is written or nothing is: all validation
    /// happens before the first byte is copied.
    ///
    /// # Errors
    /// Returns [`RegionBytesError`] if the region does not fit in `extent` or
    /// either buffer length is inconsistent.
    ///
    /// # Panics
    /// Panics if a byte count does not fit in [`usize`].
    pub fn store_bytes(
        &self,
        subset_bytes: &[u8],
        bytes: &mut [u8],
        extent: &[u64],
        element_size: usize,
    ) -> Result<(), RegionBytesError> {
        let expected_array = checked_len(extent, element_size);
        if bytes.len() != expected_array {
            return Err(RegionBytesError::InvalidBufferLength {
                got: bytes.len(),
                expected: expected_array,
            });
        }
        let expected_subset = checked_len(&self.count, element_size);
        if subset_bytes.len() != expected_subset {
            return Err(RegionBytesError::InvalidBufferLength {
                got: subset_bytes.len(),
                expected: expected_subset,
            });
        }
        let mut subset_offset = 0;
        for (start, length) in self.iter_contiguous_runs(extent)? {
            let byte_start = usize::try_from(start).unwrap() * element_size;
            let byte_length = usize::try_from(length).unwrap() * element_size;
            bytes[byte_start..byte_start + byte_length]
                .copy_from_slice(&subset_bytes[subset_offset..subset_offset + byte_length]);
            subset_offset += byte_length;
        }
        Ok(())
    }
}

/// The number of bytes implied by an extent and element size.
fn checked_len(extent: &[u64], element_size: usize) -> usize {
    usize::try_from(num_elements(extent)).unwrap() * element_size
}

/// Iterates over the contiguous element runs of a [`DataRegion`] within an
/// array extent.
///
/// The iterator item is a tuple: (linearised start index, run length).
pub struct ContiguousRuns<'a> {
    offset: &'a [u64],
    /// Per-axis run starts still to visit; trailing coalesced axes are 1.
    outer_count: NdSize,
    extent: &'a [u64],
    run_elements: u64,
    next: Option<NdSize>,
    remaining: u64,
}

impl<'a> ContiguousRuns<'a> {
    /// The caller (`iter_contiguous_runs`) has validated bounds and rank.
    fn new(region: &'a DataRegion, extent: &'a [u64]) -> Self {
        debug_assert!(region.inbounds(extent));
        let mut contiguous = true;
        let mut run_elements = 1;
        let mut outer_count = vec![1; extent.len()];
        for (&offset, &count, &size, outer) in izip!(
            region.offset.iter().rev(),
            region.count.iter().rev(),
            extent.iter().rev(),
            outer_count.iter_mut().rev(),
        ) {
            if contiguous {
                run_elements *= count;
                contiguous = offset == 0 && count == size;
            } else {
                *outer = count;
            }
        }
        let remaining = num_elements(&outer_count);
        let next = if region.num_elements() == 0 {
            None
        } else {
            Some(region.offset.clone())
        };
        Self {
            offset: &region.offset,
            outer_count,
            extent,
            run_elements,
            next,
            remaining,
        }
    }

    /// Return the run length (fixed on each iteration).
    #[must_use]
    pub fn run_elements(&self) -> u64 {
        self.run_elements
    }
}

impl Iterator for ContiguousRuns<'_> {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.next.take()?;
        let linear = izip!(&indices, self.extent).fold(0, |acc, (i, e)| acc * e + i);
        self.remaining -= 1;

        let mut next = indices;
        let mut carry = true;
        for (index, &offset, &count) in
            izip!(next.iter_mut(), self.offset, &self.outer_count).rev()
        {
            *index += 1;
            if *index < offset + count {
                carry = false;
                break;
            }
            *index = offset;
        }
        if !carry {
            self.next = Some(next);
        }
        Some((linear, self.run_elements))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl std::iter::FusedIterator for ContiguousRuns<'_> {}
