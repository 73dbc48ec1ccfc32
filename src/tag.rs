//! Spatial join: copy a polygon property onto the points inside it.

use geojson::{FeatureCollection, JsonObject};
use rayon::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::models::{point_from_geojson, PolygonFeature};
use crate::pip::{PipOptions, PipService};

/// Tag each point with the `field` property of the first polygon that
/// contains it, storing the value under `out_field`.
///
/// Polygons are searched in collection order and boundary points count as
/// contained. A point that already carries `out_field` is left alone, as is
/// a polygon lacking `field`. Both inputs are left untouched; the tagged
/// points are returned as a new collection.
pub fn tag(
    points: &FeatureCollection,
    polygons: &FeatureCollection,
    field: &str,
    out_field: &str,
) -> Result<FeatureCollection> {
    let features = polygons
        .features
        .iter()
        .map(PolygonFeature::from_geojson)
        .collect::<Result<Vec<_>>>()?;
    let service = PipService::from_features(features, PipOptions::default())?;

    let mut tagged = points.clone();
    tagged.features.par_iter_mut().try_for_each(|feature| -> Result<()> {
        let point = point_from_geojson(feature)?;
        let properties = feature.properties.get_or_insert_with(JsonObject::new);
        if properties.contains_key(out_field) {
            return Ok(());
        }
        if let Some(polygon) = service.first_containing(point, |p| p.property(field).is_some()) {
            if let Some(value) = polygon.property(field) {
                properties.insert(out_field.to_string(), value.clone());
            }
        }
        Ok(())
    })?;

    let count = tagged
        .features
        .iter()
        .filter(|f| f.contains_property(out_field))
        .count();
    info!(
        "Tagged {}/{} points with '{}' from {} polygons",
        count,
        tagged.features.len(),
        field,
        polygons.features.len()
    );

    Ok(tagged)
}
