//! Extraction of points and polygons from GeoJSON features.

use geo::Coord;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

use super::geometry::{Areal, BBox, MultiPolygon, Polygon, Ring};
use crate::error::{PipError, Result};

/// A polygon or multipolygon feature prepared for containment checks
#[derive(Debug, Clone)]
pub struct PolygonFeature {
    pub geometry: Areal,
    /// Caller-supplied bbox used to short-circuit far-away points
    pub bbox: Option<BBox>,
    pub properties: JsonObject,
}

impl PolygonFeature {
    pub fn new(geometry: impl Into<Areal>) -> Self {
        Self {
            geometry: geometry.into(),
            bbox: None,
            properties: JsonObject::new(),
        }
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_properties(mut self, properties: JsonObject) -> Self {
        self.properties = properties;
        self
    }

    /// Extract from a GeoJSON feature.
    ///
    /// The bbox comes from the feature's `bbox` member, or failing that
    /// from the geometry's.
    pub fn from_geojson(feature: &Feature) -> Result<Self> {
        let geometry = feature.geometry.as_ref().ok_or(PipError::MissingInput {
            what: "polygon geometry",
        })?;

        let bbox = feature
            .bbox
            .as_deref()
            .or(geometry.bbox.as_deref())
            .and_then(BBox::from_slice);

        Ok(Self {
            geometry: areal_from_geometry(geometry)?,
            bbox,
            properties: feature.properties.clone().unwrap_or_default(),
        })
    }

    /// The properties value stored under `key`
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

/// Convert a GeoJSON Polygon or MultiPolygon geometry.
pub fn areal_from_geometry(geometry: &Geometry) -> Result<Areal> {
    match &geometry.value {
        Value::Polygon(rings) => Ok(Areal::Polygon(polygon_from_rings(rings)?)),
        Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| polygon_from_rings(rings))
                .collect::<Result<Vec<_>>>()?;
            Ok(Areal::MultiPolygon(MultiPolygon::new(polygons)))
        }
        other => Err(PipError::InvalidGeometry {
            expected: "Polygon or MultiPolygon",
            found: type_name(other).to_string(),
        }),
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Polygon> {
    let rings = rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|position| coord_from_position(position))
                .collect::<Result<Vec<_>>>()
                .map(Ring::new)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(rings))
}

/// Read the first two numbers of a position; extra ordinates are ignored.
pub fn coord_from_position(position: &[f64]) -> Result<Coord<f64>> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(PipError::InvalidGeometry {
            expected: "position with two coordinates",
            found: format!("{} coordinates", position.len()),
        }),
    }
}

/// Extract the coordinate of a Point feature.
pub fn point_from_geojson(feature: &Feature) -> Result<Coord<f64>> {
    let geometry = feature.geometry.as_ref().ok_or(PipError::MissingInput {
        what: "point geometry",
    })?;
    point_from_geometry(geometry)
}

pub fn point_from_geometry(geometry: &Geometry) -> Result<Coord<f64>> {
    match &geometry.value {
        Value::Point(position) => coord_from_position(position),
        other => Err(PipError::InvalidGeometry {
            expected: "Point",
            found: type_name(other).to_string(),
        }),
    }
}

/// Parse GeoJSON text into a feature collection.
///
/// A lone Feature or bare Geometry is wrapped into a one-element collection.
pub fn feature_collection_from_str(text: &str) -> Result<FeatureCollection> {
    let geojson: GeoJson = text.parse()?;
    let features = match geojson {
        GeoJson::FeatureCollection(collection) => return Ok(collection),
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: geometry.bbox.clone(),
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };
    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
