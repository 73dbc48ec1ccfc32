//! pipcheck - point-in-polygon classification for GeoJSON polygons
//!
//! This library provides the crossing-number predicate, containment helpers
//! built on it, and the spatial join and grid tools used by the binaries.

pub mod error;
pub mod grid;
pub mod models;
pub mod pip;
pub mod tag;

pub use error::{PipError, Result};
pub use models::{Areal, BBox, Classification, MultiPolygon, Polygon, PolygonFeature, Ring};
pub use pip::{boolean_point_in_polygon, classify, PipOptions, PipService};
