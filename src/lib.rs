//! A rust library for typed access to N-dimensional scientific data arrays.
//!
//! Data arrays pair element storage with the metadata that gives the numbers
//! meaning: per-axis [`dimension`] descriptors mapping physical positions to
//! element indices, SI [`units`], and a calibration polynomial. [`tag`]s mark
//! regions of interest in real-world coordinates, and [`data_access`]
//! resolves them into element regions and reads them back out. Storage is
//! pluggable behind [`storage::ArrayBackend`]; an in-memory engine is
//! provided.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use ndstore::array::DataArray;
//! use ndstore::dimension::SampledDimension;
//! use ndstore::storage::MemoryBackend;
//! use ndstore::tag::Tag;
//!
//! let array = DataArray::new(Arc::new(MemoryBackend::new()));
//! array.set_data(&vec![1.0f64, 2.0, 3.0, 4.0, 5.0])?;
//! array.append_dimension(
//!     SampledDimension {
//!         unit: Some("s".to_string()),
//!         ..SampledDimension::new(0.001)
//!     }
//!     .into(),
//! )?;
//!
//! let mut tag = Tag::new(vec![0.001]);
//! tag.set_extent(Some(vec![0.002]));
//! tag.set_units(vec!["s".to_string()]);
//! tag.add_reference(array);
//!
//! let segment: ndarray::ArrayD<f64> = ndstore::data_access::retrieve_data(&tag, 0)?;
//! assert_eq!(segment.as_slice().unwrap(), &[2.0, 3.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]

pub mod array;
pub mod data_access;
pub mod dimension;
pub mod region;
pub mod storage;
pub mod tag;
pub mod units;
pub mod value;
