//! Containment checks layered over the predicate: bbox rejection,
//! multipolygon composition and the `ignore_boundary` option.

use geo::Coord;
use geojson::Feature;
use serde::{Deserialize, Serialize};

use super::predicate::classify_validated;
use crate::error::Result;
use crate::models::{
    point_from_geojson, Areal, BBox, Classification, MultiPolygon, Polygon, PolygonFeature,
};

/// Options for boolean containment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipOptions {
    /// Report points on the boundary as not contained
    #[serde(default)]
    pub ignore_boundary: bool,
}

impl PipOptions {
    pub fn ignore_boundary(ignore_boundary: bool) -> Self {
        Self { ignore_boundary }
    }
}

/// Classify against every polygon of a multipolygon.
///
/// A boundary hit on any polygon is decisive; otherwise the point is inside
/// if any polygon contains it. An empty multipolygon contains nothing.
pub fn classify_multi(point: Coord<f64>, multi: &MultiPolygon) -> Result<Classification> {
    multi.polygons().iter().try_for_each(Polygon::validate)?;
    Ok(compose_validated(point, multi.polygons()))
}

/// Classify against a polygon or multipolygon, rejecting early when a
/// bbox is supplied and the point falls outside it.
///
/// Rings are validated even when the bbox rejects the point.
pub fn classify_areal(
    point: Coord<f64>,
    areal: &Areal,
    bbox: Option<&BBox>,
) -> Result<Classification> {
    areal.validate()?;
    if let Some(bbox) = bbox {
        if !bbox.contains(point) {
            return Ok(Classification::Outside);
        }
    }
    Ok(compose_validated(point, areal.polygons()))
}

/// Classify against a feature, using its bbox when present.
pub fn classify_feature(point: Coord<f64>, feature: &PolygonFeature) -> Result<Classification> {
    classify_areal(point, &feature.geometry, feature.bbox.as_ref())
}

/// True if the feature contains the point, per `options`.
pub fn boolean_point_in_polygon(
    point: Coord<f64>,
    feature: &PolygonFeature,
    options: PipOptions,
) -> Result<bool> {
    classify_feature(point, feature).map(|c| c.contains(options.ignore_boundary))
}

/// Same as [`boolean_point_in_polygon`] for raw GeoJSON features.
pub fn boolean_point_in_polygon_geojson(
    point: &Feature,
    polygon: &Feature,
    options: PipOptions,
) -> Result<bool> {
    let point = point_from_geojson(point)?;
    let polygon = PolygonFeature::from_geojson(polygon)?;
    boolean_point_in_polygon(point, &polygon, options)
}

/// Polygons must already be validated.
pub(crate) fn compose_validated(point: Coord<f64>, polygons: &[Polygon]) -> Classification {
    let mut result = Classification::Outside;
    for polygon in polygons {
        match classify_validated(point, polygon) {
            Classification::Boundary => return Classification::Boundary,
            Classification::Inside => result = Classification::Inside,
            Classification::Outside => {}
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipError;
    use crate::models::Ring;
    use geojson::GeoJson;

    fn pt(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn rect(west: f64, south: f64, east: f64, north: f64) -> Polygon {
        Polygon::new(vec![Ring::from(vec![
            [west, south],
            [west, north],
            [east, north],
            [east, south],
            [west, south],
        ])])
    }

    #[test]
    fn test_bbox_rejects_point_the_geometry_contains() {
        // Geometry covers (15,15) but the attached bbox does not
        let feature = PolygonFeature::new(rect(0.0, 0.0, 20.0, 20.0))
            .with_bbox(BBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(
            classify_feature(pt(15.0, 15.0), &feature).unwrap(),
            Classification::Outside
        );
        let unboxed = PolygonFeature::new(rect(0.0, 0.0, 20.0, 20.0));
        assert_eq!(
            classify_feature(pt(15.0, 15.0), &unboxed).unwrap(),
            Classification::Inside
        );
    }

    #[test]
    fn test_bbox_edge_is_not_rejected() {
        let feature = PolygonFeature::new(rect(0.0, 0.0, 10.0, 10.0))
            .with_bbox(BBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(
            classify_feature(pt(10.0, 10.0), &feature).unwrap(),
            Classification::Boundary
        );
    }

    #[test]
    fn test_bbox_does_not_hide_malformed_ring() {
        let open = Polygon::new(vec![Ring::from(vec![
            [0.0, 0.0],
            [0.0, 10.0],
            [10.0, 10.0],
            [10.0, 0.0],
            [1.0, 0.0],
        ])]);
        let feature = PolygonFeature::new(open).with_bbox(BBox::new(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(
            classify_feature(pt(50.0, 50.0), &feature),
            Err(PipError::MalformedRing { ring: 0, .. })
        ));
    }

    #[test]
    fn test_multi_inside_wins_over_outside() {
        let multi =
            MultiPolygon::new(vec![rect(20.0, 20.0, 30.0, 30.0), rect(0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(
            classify_multi(pt(5.0, 5.0), &multi).unwrap(),
            Classification::Inside
        );
        assert_eq!(
            classify_multi(pt(15.0, 15.0), &multi).unwrap(),
            Classification::Outside
        );
    }

    #[test]
    fn test_multi_boundary_is_decisive() {
        // (10,5) is inside the second polygon and on the first one's edge
        let multi =
            MultiPolygon::new(vec![rect(0.0, 0.0, 10.0, 10.0), rect(5.0, 0.0, 15.0, 10.0)]);
        assert_eq!(
            classify_multi(pt(10.0, 5.0), &multi).unwrap(),
            Classification::Boundary
        );

        let reversed =
            MultiPolygon::new(vec![rect(5.0, 0.0, 15.0, 10.0), rect(0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(
            classify_multi(pt(10.0, 5.0), &reversed).unwrap(),
            Classification::Boundary
        );
    }

    #[test]
    fn test_multi_validates_every_polygon() {
        let broken =
            Polygon::new(vec![Ring::from(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])]);
        // The first polygon alone would answer Boundary
        let multi = MultiPolygon::new(vec![rect(0.0, 0.0, 10.0, 10.0), broken]);
        assert!(classify_multi(pt(0.0, 0.0), &multi).is_err());
    }

    #[test]
    fn test_empty_multi_is_outside() {
        let multi = MultiPolygon::default();
        assert_eq!(
            classify_multi(pt(0.0, 0.0), &multi).unwrap(),
            Classification::Outside
        );
    }

    #[test]
    fn test_ignore_boundary() {
        let feature = PolygonFeature::new(rect(0.0, 0.0, 10.0, 10.0));
        let ignore = PipOptions::ignore_boundary(true);
        assert!(boolean_point_in_polygon(pt(0.0, 5.0), &feature, PipOptions::default()).unwrap());
        assert!(!boolean_point_in_polygon(pt(0.0, 5.0), &feature, ignore).unwrap());
        assert!(boolean_point_in_polygon(pt(5.0, 5.0), &feature, ignore).unwrap());
    }

    #[test]
    fn test_options_deserialize_default() {
        let options: PipOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.ignore_boundary);
    }

    #[test]
    fn test_geojson_features() {
        let parse = |text: &str| match text.parse::<GeoJson>().unwrap() {
            GeoJson::Feature(f) => f,
            other => panic!("not a feature: {:?}", other),
        };
        let point = parse(
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[-77,44]}}"#,
        );
        let polygon = parse(
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[-81,41],[-81,47],[-72,47],[-72,41],[-81,41]]]}}"#,
        );
        assert!(boolean_point_in_polygon_geojson(&point, &polygon, PipOptions::default()).unwrap());
    }
}
