//! Tags: regions of interest over data arrays.
//!
//! A [`Tag`] marks a single region in real-world coordinates, a [`MultiTag`]
//! marks many. Both carry a position (and optionally an extent) per axis in
//! physical units, plus the referenced arrays the region applies to. The
//! translation from positions to element indices lives in
//! [`data_access`](crate::data_access).

use crate::array::DataArray;

/// A tag marking one region of interest.
///
/// The region starts at `position` and spans `extent` (when set) on each
/// axis, both expressed in the units of `units`. Axes beyond the position
/// rank of a referenced array are untagged and covered whole.
#[derive(Debug)]
pub struct Tag<TBackend: ?Sized> {
    position: Vec<f64>,
    extent: Option<Vec<f64>>,
    units: Vec<String>,
    references: Vec<DataArray<TBackend>>,
}

impl<TBackend: ?Sized> Clone for Tag<TBackend> {
    fn clone(&self) -> Self {
        Self {
            position: self.position.clone(),
            extent: self.extent.clone(),
            units: self.units.clone(),
            references: self.references.clone(),
        }
    }
}

impl<TBackend: ?Sized> Tag<TBackend> {
    /// Create a new tag at `position`, with no extent, units or references.
    #[must_use]
    pub fn new(position: Vec<f64>) -> Self {
        Self {
            position,
            extent: None,
            units: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Return the tagged position, one coordinate per axis.
    #[must_use]
    pub fn position(&self) -> &[f64] {
        &self.position
    }

    /// Set the tagged position.
    pub fn set_position(&mut self, position: Vec<f64>) {
        self.position = position;
    }

    /// Return the tagged extent, if one is set.
    #[must_use]
    pub fn extent(&self) -> Option<&[f64]> {
        self.extent.as_deref()
    }

    /// Set or clear the tagged extent.
    pub fn set_extent(&mut self, extent: Option<Vec<f64>>) {
        self.extent = extent;
    }

    /// Return the units of the position and extent coordinates, one per axis.
    #[must_use]
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Set the units of the position and extent coordinates.
    ///
    /// An empty string or `"none"` on an axis means the coordinate carries no
    /// unit.
    pub fn set_units(&mut self, units: Vec<String>) {
        self.units = units;
    }

    /// Append a referenced data array.
    pub fn add_reference(&mut self, reference: DataArray<TBackend>) {
        self.references.push(reference);
    }

    /// Return the referenced data array at `index`, if any.
    #[must_use]
    pub fn reference(&self, index: usize) -> Option<&DataArray<TBackend>> {
        self.references.get(index)
    }

    /// Return the number of referenced data arrays.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }
}

/// A tag marking many regions of interest at once.
///
/// Each entry of `positions` (and of `extents`, when set) describes one
/// region the way a [`Tag`] position and extent do.
#[derive(Debug)]
pub struct MultiTag<TBackend: ?Sized> {
    positions: Vec<Vec<f64>>,
    extents: Option<Vec<Vec<f64>>>,
    units: Vec<String>,
    references: Vec<DataArray<TBackend>>,
}

impl<TBackend: ?Sized> Clone for MultiTag<TBackend> {
    fn clone(&self) -> Self {
        Self {
            positions: self.positions.clone(),
            extents: self.extents.clone(),
            units: self.units.clone(),
            references: self.references.clone(),
        }
    }
}

impl<TBackend: ?Sized> MultiTag<TBackend> {
    /// Create a new multi tag over `positions`, with no extents, units or
    /// references.
    #[must_use]
    pub fn new(positions: Vec<Vec<f64>>) -> Self {
        Self {
            positions,
            extents: None,
            units: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Return the number of tagged positions.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Return the tagged position at `index`, if any.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<&[f64]> {
        self.positions.get(index).map(Vec::as_slice)
    }

    /// Return the tagged extent at `index`, if extents are set.
    #[must_use]
    pub fn extent(&self, index: usize) -> Option<&[f64]> {
        self.extents
            .as_ref()
            .and_then(|extents| extents.get(index))
            .map(Vec::as_slice)
    }

    /// Set or clear the tagged extents, one per position.
    pub fn set_extents(&mut self, extents: Option<Vec<Vec<f64>>>) {
        self.extents = extents;
    }

    /// Return the units of the position and extent coordinates, one per axis.
    #[must_use]
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Set the units of the position and extent coordinates.
    ///
    /// An empty string or `"none"` on an axis means the coordinate carries no
    /// unit.
    pub fn set_units(&mut self, units: Vec<String>) {
        self.units = units;
    }

    /// Append a referenced data array.
    pub fn add_reference(&mut self, reference: DataArray<TBackend>) {
        self.references.push(reference);
    }

    /// Return the referenced data array at `index`, if any.
    #[must_use]
    pub fn reference(&self, index: usize) -> Option<&DataArray<TBackend>> {
        self.references.get(index)
    }

    /// Return the number of referenced data arrays.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }
}
