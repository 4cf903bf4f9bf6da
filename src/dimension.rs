//! Dimension descriptors.
//!
//! Each axis of a data array may carry a descriptor mapping physical
//! positions or labels to integer indices along that axis. Three variants
//! exist: [`SetDimension`] (labelled indices), [`SampledDimension`] (regular
//! sampling) and [`RangeDimension`] (explicit ascending ticks).
//!
//! Descriptors are plain value types: they are stored whole in a storage
//! engine's dimension table, addressed by 1-based axis index, and are not
//! shared.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units;

/// The kind of a dimension descriptor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DimensionType {
    /// Labelled indices.
    Set,
    /// Regular sampling.
    Sampled,
    /// Explicit ascending ticks.
    Range,
}

/// An error resolving a position against a dimension descriptor.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DimensionError {
    /// The query unit is not convertible to the dimension unit, or the
    /// descriptor variant does not support the query.
    #[error("incompatible dimension: {_0}")]
    IncompatibleDimension(String),
    /// The position resolves to an index outside the dimension.
    #[error("position {position} resolves outside the dimension")]
    OutOfBounds {
        /// The queried position, scaled to the dimension unit.
        position: f64,
    },
}

impl From<units::UnitError> for DimensionError {
    fn from(error: units::UnitError) -> Self {
        Self::IncompatibleDimension(error.to_string())
    }
}

/// Compute the factor scaling a query position into the dimension unit.
///
/// A missing query unit means the position is already given in the dimension
/// unit; a query unit against a unitless dimension is incompatible.
fn scale_for(query_unit: Option<&str>, dimension_unit: Option<&str>) -> Result<f64, DimensionError> {
    match (query_unit, dimension_unit) {
        (None, _) => Ok(1.0),
        (Some(query), Some(dimension)) => Ok(units::scaling(query, dimension)?),
        (Some(query), None) => Err(DimensionError::IncompatibleDimension(format!(
            "a position in {query:?} was queried against a dimension without a unit"
        ))),
    }
}

/// A dimension whose indices are identified by labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDimension {
    /// The axis labels, one per index.
    pub labels: Vec<String>,
}

impl SetDimension {
    /// Create a new set dimension from its labels.
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Return the index carrying `label`, if any.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<u64> {
        self.labels
            .iter()
            .position(|candidate| candidate == label)
            .map(|index| index as u64)
    }

    /// Convert a position into an index.
    ///
    /// A set dimension has no physical unit, so `unit` must be [`None`]; the
    /// position is rounded (half away from zero) and checked against the
    /// label count. Label queries go through [`index_of`](Self::index_of)
    /// instead.
    ///
    /// # Errors
    /// Returns [`DimensionError`] if a unit is given or the index falls
    /// outside the labels.
    pub fn position_to_index(
        &self,
        position: f64,
        unit: Option<&str>,
    ) -> Result<u64, DimensionError> {
        if unit.is_some() {
            return Err(DimensionError::IncompatibleDimension(
                "a set dimension has no unit".to_string(),
            ));
        }
        let index = position.round();
        if !index.is_finite()
            || index < 0.0
            || (!self.labels.is_empty() && index >= self.labels.len() as f64)
        {
            return Err(DimensionError::OutOfBounds { position });
        }
        Ok(index as u64)
    }
}

/// A dimension sampled at a regular interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampledDimension {
    /// The sampling interval, must be positive.
    pub sampling_interval: f64,
    /// The position of index 0, in the dimension unit.
    pub offset: f64,
    /// The physical unit of positions along this axis.
    pub unit: Option<String>,
    /// A label for the axis.
    pub label: Option<String>,
}

impl SampledDimension {
    /// Create a new sampled dimension with zero offset and no unit.
    #[must_use]
    pub fn new(sampling_interval: f64) -> Self {
        Self {
            sampling_interval,
            offset: 0.0,
            unit: None,
            label: None,
        }
    }

    /// Return the position of `index`, in the dimension unit.
    #[must_use]
    pub fn position_at(&self, index: u64) -> f64 {
        index as f64 * self.sampling_interval + self.offset
    }

    /// Convert a position into an index: `round((position·scale − offset) /
    /// interval)`, with `scale` the SI factor from the query unit into the
    /// dimension unit.
    ///
    /// Rounding is half away from zero, so a position exactly halfway between
    /// two samples resolves to the later one.
    ///
    /// # Errors
    /// Returns [`DimensionError`] if the units are not mutually convertible,
    /// the sampling interval is not positive, or the index would be negative
    /// or not finite.
    pub fn position_to_index(
        &self,
        position: f64,
        unit: Option<&str>,
    ) -> Result<u64, DimensionError> {
        if self.sampling_interval <= 0.0 {
            return Err(DimensionError::IncompatibleDimension(
                "the sampling interval must be positive".to_string(),
            ));
        }
        let scale = scale_for(unit, self.unit.as_deref())?;
        let scaled = position * scale;
        let index = ((scaled - self.offset) / self.sampling_interval).round();
        if !index.is_finite() || index < 0.0 {
            return Err(DimensionError::OutOfBounds { position: scaled });
        }
        Ok(index as u64)
    }
}

/// A dimension described by explicit ascending tick positions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeDimension {
    /// The tick positions, strictly ascending, in the dimension unit.
    pub ticks: Vec<f64>,
    /// The physical unit of positions along this axis.
    pub unit: Option<String>,
    /// A label for the axis.
    pub label: Option<String>,
}

impl RangeDimension {
    /// Create a new range dimension from its ticks.
    #[must_use]
    pub fn new(ticks: Vec<f64>) -> Self {
        Self {
            ticks,
            unit: None,
            label: None,
        }
    }

    /// Convert a position into the index of its nearest lower tick: the `i`
    /// with `ticks[i] <= position` and either `i` is the last tick or
    /// `ticks[i + 1] > position`.
    ///
    /// # Errors
    /// Returns [`DimensionError`] if the units are not mutually convertible
    /// or the position lies below the first or above the last tick.
    pub fn position_to_index(
        &self,
        position: f64,
        unit: Option<&str>,
    ) -> Result<u64, DimensionError> {
        let scale = scale_for(unit, self.unit.as_deref())?;
        let scaled = position * scale;
        let below = self.ticks.partition_point(|tick| *tick <= scaled);
        if below == 0 {
            return Err(DimensionError::OutOfBounds { position: scaled });
        }
        // below > 0, so the last tick exists and is <= scaled when below == len
        if below == self.ticks.len() && scaled > self.ticks[below - 1] {
            return Err(DimensionError::OutOfBounds { position: scaled });
        }
        Ok((below - 1) as u64)
    }
}

/// A dimension descriptor: one of the three closed variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Dimension {
    /// Labelled indices.
    Set(SetDimension),
    /// Regular sampling.
    Sampled(SampledDimension),
    /// Explicit ascending ticks.
    Range(RangeDimension),
}

impl Dimension {
    /// Return the kind of this descriptor.
    #[must_use]
    pub const fn dimension_type(&self) -> DimensionType {
        match self {
            Self::Set(_) => DimensionType::Set,
            Self::Sampled(_) => DimensionType::Sampled,
            Self::Range(_) => DimensionType::Range,
        }
    }

    /// Return the unit of the dimension, if it has one.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::Set(_) => None,
            Self::Sampled(dimension) => dimension.unit.as_deref(),
            Self::Range(dimension) => dimension.unit.as_deref(),
        }
    }

    /// Convert a position into an index according to this descriptor.
    ///
    /// # Errors
    /// Returns [`DimensionError`] on unit incompatibilities or out-of-range
    /// positions; see the variant methods for the per-variant rules.
    pub fn position_to_index(
        &self,
        position: f64,
        unit: Option<&str>,
    ) -> Result<u64, DimensionError> {
        match self {
            Self::Set(dimension) => dimension.position_to_index(position, unit),
            Self::Sampled(dimension) => dimension.position_to_index(position, unit),
            Self::Range(dimension) => dimension.position_to_index(position, unit),
        }
    }
}

impl From<SetDimension> for Dimension {
    fn from(dimension: SetDimension) -> Self {
        Self::Set(dimension)
    }
}

impl From<SampledDimension> for Dimension {
    fn from(dimension: SampledDimension) -> Self {
        Self::Sampled(dimension)
    }
}

impl From<RangeDimension> for Dimension {
    fn from(dimension: RangeDimension) -> Self {
        Self::Range(dimension)
    }
}
