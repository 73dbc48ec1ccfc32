//! Triangular grid over a bounding box, optionally masked by a polygon.

use geo::{Area, BooleanOps, Coord, Intersects, LineString};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use tracing::{debug, info};

use super::units::{distance, Units};
use crate::error::{PipError, Result};
use crate::models::{Areal, BBox};

/// Upper bound on `columns * rows`
const MAX_CELLS: f64 = 10_000_000.0;

/// Options for [`triangle_grid`]
#[derive(Debug, Clone, Default)]
pub struct TriangleGridOptions {
    /// Units of `cell_side`
    pub units: Units,
    /// Copied onto every triangle
    pub properties: JsonObject,
    /// Keep only triangles overlapping this area
    pub mask: Option<Areal>,
}

/// Build a grid of triangles, two per cell, covering `bbox`.
///
/// `cell_side` is measured along the bbox's south and west edges in
/// `options.units` and converted to degrees. The cell diagonal alternates
/// with the parity of the cell's column and row. With a mask, only triangles
/// whose overlap with the mask has positive area are kept; sharing an edge or
/// a vertex is not enough.
pub fn triangle_grid(
    bbox: BBox,
    cell_side: f64,
    options: &TriangleGridOptions,
) -> Result<FeatureCollection> {
    if !(cell_side.is_finite() && cell_side > 0.0) {
        return Err(PipError::InvalidGrid(format!(
            "cell side must be positive, got {}",
            cell_side
        )));
    }
    if !bbox.to_array().iter().all(|v| v.is_finite())
        || bbox.west >= bbox.east
        || bbox.south >= bbox.north
    {
        return Err(PipError::InvalidGrid(format!(
            "bbox must have west < east and south < north, got {:?}",
            bbox.to_array()
        )));
    }
    let mask = match &options.mask {
        Some(mask) => {
            mask.validate()?;
            Some(geo::MultiPolygon::from(mask))
        }
        None => None,
    };

    let (west, south, east, north) = (bbox.west, bbox.south, bbox.east, bbox.north);
    let south_west = Coord { x: west, y: south };
    let width = distance(south_west, Coord { x: east, y: south }, options.units);
    let height = distance(south_west, Coord { x: west, y: north }, options.units);
    if !(width > 0.0 && height > 0.0) {
        return Err(PipError::InvalidGrid(format!(
            "bbox {:?} has no measurable extent",
            bbox.to_array()
        )));
    }
    let cell_width = cell_side / width * (bbox.east - bbox.west);
    let cell_height = cell_side / height * (bbox.north - bbox.south);
    debug!("Cell size {} x {} degrees", cell_width, cell_height);

    // A step below one ulp of the coordinates would never advance the loop
    let x_extent = bbox.west.abs().max(bbox.east.abs());
    let y_extent = bbox.south.abs().max(bbox.north.abs());
    if !(cell_width > f64::EPSILON * x_extent && cell_height > f64::EPSILON * y_extent) {
        return Err(PipError::InvalidGrid(format!(
            "cell side {} is too small to step across {:?}",
            cell_side,
            bbox.to_array()
        )));
    }
    let columns = ((bbox.east - bbox.west) / cell_width).floor() + 1.0;
    let rows = ((bbox.north - bbox.south) / cell_height).floor() + 1.0;
    if columns * rows > MAX_CELLS {
        return Err(PipError::InvalidGrid(format!(
            "{} x {} cells exceeds the limit of {}",
            columns, rows, MAX_CELLS
        )));
    }

    let mut features = Vec::new();
    let mut xi = 0usize;
    let mut x = bbox.west;
    while x <= bbox.east {
        let mut yi = 0usize;
        let mut y = bbox.south;
        while y <= bbox.north {
            for triangle in cell_triangles(x, y, cell_width, cell_height, xi, yi) {
                let keep = match &mask {
                    Some(mask) => overlaps(mask, &triangle),
                    None => true,
                };
                if keep {
                    features.push(to_feature(&triangle, &options.properties));
                }
            }
            y += cell_height;
            yi += 1;
        }
        x += cell_width;
        xi += 1;
    }

    info!("Generated {} triangles", features.len());

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn cell_triangles(
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    xi: usize,
    yi: usize,
) -> [[Coord<f64>; 4]; 2] {
    let sw = Coord { x, y };
    let nw = Coord { x, y: y + h };
    let ne = Coord { x: x + w, y: y + h };
    let se = Coord { x: x + w, y };

    match (xi % 2, yi % 2) {
        (0, 1) => [[sw, ne, se, sw], [sw, nw, ne, sw]],
        (1, 0) => [[sw, nw, ne, sw], [sw, ne, se, sw]],
        _ => [[sw, nw, se, sw], [nw, ne, se, nw]],
    }
}

/// True if the triangle and the mask share a region of positive area
fn overlaps(mask: &geo::MultiPolygon<f64>, triangle: &[Coord<f64>; 4]) -> bool {
    let cell = geo::Polygon::new(LineString::from(triangle.to_vec()), vec![]);
    mask.intersects(&cell) && mask.intersection(&cell).unsigned_area() > 0.0
}

fn to_feature(triangle: &[Coord<f64>; 4], properties: &JsonObject) -> Feature {
    let ring = triangle.iter().map(|c| vec![c.x, c.y]).collect();
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(properties.clone()),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Polygon, Ring};
    use serde_json::json;

    fn grid_bbox() -> BBox {
        BBox::new(0.0, 0.0, 1.0, 1.0)
    }

    fn degrees() -> TriangleGridOptions {
        TriangleGridOptions {
            units: Units::Degrees,
            ..Default::default()
        }
    }

    fn masked(ring: Vec<[f64; 2]>) -> TriangleGridOptions {
        TriangleGridOptions {
            mask: Some(Areal::Polygon(Polygon::new(vec![Ring::from(ring)]))),
            ..degrees()
        }
    }

    fn exterior(feature: &Feature) -> Vec<[f64; 2]> {
        match &feature.geometry.as_ref().unwrap().value {
            Value::Polygon(rings) => rings[0].iter().map(|p| [p[0], p[1]]).collect(),
            other => panic!("unexpected geometry: {:?}", other),
        }
    }

    #[test]
    fn test_two_triangles_per_cell() {
        // 0.4 degree cells: columns at 0, 0.4, 0.8
        let grid = triangle_grid(grid_bbox(), 0.4, &degrees()).unwrap();
        assert_eq!(grid.features.len(), 18);
    }

    #[test]
    fn test_triangles_are_closed() {
        let grid = triangle_grid(grid_bbox(), 0.4, &degrees()).unwrap();
        for feature in &grid.features {
            match &feature.geometry.as_ref().unwrap().value {
                Value::Polygon(rings) => {
                    assert_eq!(rings.len(), 1);
                    assert_eq!(rings[0].len(), 4);
                    assert_eq!(rings[0].first(), rings[0].last());
                }
                other => panic!("unexpected geometry: {:?}", other),
            }
        }
    }

    #[test]
    fn test_diagonal_alternates() {
        let even = cell_triangles(0.0, 0.0, 1.0, 1.0, 0, 0);
        let odd_row = cell_triangles(0.0, 0.0, 1.0, 1.0, 0, 1);
        let odd_col = cell_triangles(0.0, 0.0, 1.0, 1.0, 1, 0);
        let both_odd = cell_triangles(0.0, 0.0, 1.0, 1.0, 1, 1);
        assert_eq!(even, both_odd);
        assert_ne!(even, odd_row);
        assert_eq!(odd_row[0], odd_col[1]);
        assert_eq!(odd_row[1], odd_col[0]);
    }

    #[test]
    fn test_properties_copied() {
        let mut properties = JsonObject::new();
        properties.insert("kind".to_string(), json!("tri"));
        let options = TriangleGridOptions {
            properties,
            ..degrees()
        };
        let grid = triangle_grid(grid_bbox(), 0.4, &options).unwrap();
        assert!(grid
            .features
            .iter()
            .all(|f| f.property("kind") == Some(&json!("tri"))));
    }

    #[test]
    fn test_mask_keeps_overlapping_triangles() {
        let options = masked(vec![[0.1, 0.1], [0.1, 0.3], [0.3, 0.3], [0.3, 0.1], [0.1, 0.1]]);
        let grid = triangle_grid(grid_bbox(), 0.4, &options).unwrap();
        assert_eq!(grid.features.len(), 2);
    }

    #[test]
    fn test_mask_crossing_without_shared_vertices() {
        // A strip across the bottom row; no vertex of either shape lies in the other
        let options = masked(vec![
            [-1.0, 0.15],
            [-1.0, 0.25],
            [2.0, 0.25],
            [2.0, 0.15],
            [-1.0, 0.15],
        ]);
        let grid = triangle_grid(grid_bbox(), 0.4, &options).unwrap();
        assert_eq!(grid.features.len(), 6);
        for feature in &grid.features {
            assert!(exterior(feature).iter().all(|c| c[1] < 0.5));
        }
    }

    #[test]
    fn test_mask_sharing_only_edges_is_dropped() {
        // Mask exactly covering the first cell, built from the grid's own coordinates
        let full = triangle_grid(grid_bbox(), 0.4, &degrees()).unwrap();
        let corners: Vec<[f64; 2]> = full.features[..2].iter().flat_map(exterior).collect();
        let east = corners.iter().map(|c| c[0]).fold(f64::MIN, f64::max);
        let north = corners.iter().map(|c| c[1]).fold(f64::MIN, f64::max);
        let options = masked(vec![
            [0.0, 0.0],
            [0.0, north],
            [east, north],
            [east, 0.0],
            [0.0, 0.0],
        ]);

        let grid = triangle_grid(grid_bbox(), 0.4, &options).unwrap();
        assert_eq!(grid.features.len(), 2);
        assert_eq!(exterior(&grid.features[0]), exterior(&full.features[0]));
        assert_eq!(exterior(&grid.features[1]), exterior(&full.features[1]));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            triangle_grid(grid_bbox(), 0.0, &degrees()),
            Err(PipError::InvalidGrid(_))
        ));
        assert!(matches!(
            triangle_grid(BBox::new(1.0, 0.0, 0.0, 1.0), 0.4, &degrees()),
            Err(PipError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_rejects_step_that_cannot_advance() {
        // Far below one ulp of 100 degrees
        assert!(matches!(
            triangle_grid(BBox::new(100.0, 10.0, 101.0, 11.0), 1e-15, &degrees()),
            Err(PipError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_rejects_too_many_cells() {
        assert!(matches!(
            triangle_grid(grid_bbox(), 1e-5, &degrees()),
            Err(PipError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_malformed_mask() {
        let options = masked(vec![[0.1, 0.1], [0.1, 0.3], [0.3, 0.3], [0.3, 0.1]]);
        assert!(matches!(
            triangle_grid(grid_bbox(), 0.4, &options),
            Err(PipError::MalformedRing { .. })
        ));
    }
}
