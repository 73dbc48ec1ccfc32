//! Point-in-Polygon (PIP) classification.
//!
//! The crossing-number predicate lives in [`predicate`]; [`contains`] adds the
//! bbox short-circuit, multipolygon composition and boolean options, and the
//! index/service pair answers lookups against many polygons through an R-tree.

mod contains;
mod index;
pub mod predicate;
mod service;

pub use contains::{
    boolean_point_in_polygon, boolean_point_in_polygon_geojson, classify_areal, classify_feature,
    classify_multi, PipOptions,
};
pub use index::{PolygonIndex, PolygonMatch};
pub use predicate::classify;
pub use service::PipService;
