//! Region shapes and spatial indexing for Bastion.
//!
//! This crate defines [`Shape`], the tagged volume every region occupies,
//! and [`SpatialIndex`], which narrows a point query down to the handful
//! of regions that might contain it.
//!
//! # Shapes
//!
//! - [`Cuboid`]: axis-aligned box, inclusive on every face
//! - [`Polygon`]: vertical prism over a 2D polygon, edges inclusive
//! - [`Shape::Global`]: unbounded, contains every position
//!
//! # Indexing
//!
//! Shapes are filed by bounding-box footprint into square columns of the
//! (x, z) plane. Global and oversized shapes are returned for every query.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bounds;
pub mod error;
pub mod index;
pub mod shape;

#[cfg(test)]
pub(crate) mod compliance;

pub use bounds::BoundingBox;
pub use error::ShapeError;
pub use index::{Candidates, SpatialIndex, DEFAULT_CELL_SHIFT, DEFAULT_MAX_CELLS_PER_ENTRY};
pub use shape::{Cuboid, Polygon, Shape};
