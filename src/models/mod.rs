//! Core data models for point-in-polygon evaluation.

pub mod feature;
pub mod geometry;

pub use feature::{
    areal_from_geometry, coord_from_position, feature_collection_from_str, point_from_geojson,
    point_from_geometry, PolygonFeature,
};
pub use geometry::{Areal, BBox, Classification, MultiPolygon, Polygon, Ring};
