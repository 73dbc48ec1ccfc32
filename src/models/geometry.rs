//! Ring-based polygon shapes consumed by the predicate.

use geo::{BoundingRect, Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::error::{PipError, Result, RingDefect};

/// Where a point sits relative to a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Inside,
    Outside,
    /// Exactly on an edge or vertex
    Boundary,
}

impl Classification {
    /// Translate to a containment flag.
    ///
    /// `Boundary` counts as contained unless `ignore_boundary` is set.
    pub fn contains(self, ignore_boundary: bool) -> bool {
        match self {
            Classification::Inside => true,
            Classification::Outside => false,
            Classification::Boundary => !ignore_boundary,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Inside => write!(f, "inside"),
            Classification::Outside => write!(f, "outside"),
            Classification::Boundary => write!(f, "boundary"),
        }
    }
}

/// Axis-aligned box in `[west, south, east, north]` order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Parse a GeoJSON bbox member. Only 2-D boxes are accepted.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [west, south, east, north] => Some(Self::new(*west, *south, *east, *north)),
            _ => None,
        }
    }

    /// True if the point is inside or on the edge of the box
    pub fn contains(&self, point: Coord<f64>) -> bool {
        !(point.x < self.west
            || point.y < self.south
            || point.x > self.east
            || point.y > self.north)
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.west.min(other.west),
            self.south.min(other.south),
            self.east.max(other.east),
            self.north.max(other.north),
        )
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        b.to_array()
    }
}

impl From<geo::Rect<f64>> for BBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        BBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// One closed loop of a polygon boundary.
///
/// Construction does not close or check the coordinates; [`Ring::validate`]
/// does, and the predicate calls it before walking any edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring(LineString<f64>);

impl Ring {
    pub fn new(coords: Vec<Coord<f64>>) -> Self {
        Self(LineString::new(coords))
    }

    pub fn coords(&self) -> &[Coord<f64>] {
        &self.0 .0
    }

    pub fn len(&self) -> usize {
        self.0 .0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0 .0.is_empty()
    }

    /// Check closure and minimum length. `index` names the ring in the error.
    pub fn validate(&self, index: usize) -> Result<()> {
        let coords = self.coords();
        if coords.len() < 4 {
            return Err(PipError::MalformedRing {
                ring: index,
                reason: RingDefect::TooFewPoints(coords.len()),
            });
        }
        // Exact equality, no tolerance
        if coords.first() != coords.last() {
            return Err(PipError::MalformedRing {
                ring: index,
                reason: RingDefect::NotClosed,
            });
        }
        Ok(())
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.0.bounding_rect().map(BBox::from)
    }

    pub fn reversed(&self) -> Ring {
        let mut coords = self.coords().to_vec();
        coords.reverse();
        Ring::new(coords)
    }
}

impl From<Vec<Coord<f64>>> for Ring {
    fn from(coords: Vec<Coord<f64>>) -> Self {
        Ring::new(coords)
    }
}

impl From<Vec<[f64; 2]>> for Ring {
    fn from(coords: Vec<[f64; 2]>) -> Self {
        Ring::new(coords.into_iter().map(Coord::from).collect())
    }
}

impl From<LineString<f64>> for Ring {
    fn from(line: LineString<f64>) -> Self {
        Self(line)
    }
}

/// Ordered rings: ring 0 is the outer boundary, the rest are holes.
///
/// Neither hole containment nor winding order is checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn exterior(&self) -> Option<&Ring> {
        self.rings.first()
    }

    /// Validate every ring, reporting the first defect.
    pub fn validate(&self) -> Result<()> {
        if self.rings.is_empty() {
            return Err(PipError::MissingInput {
                what: "polygon ring",
            });
        }
        self.rings
            .iter()
            .enumerate()
            .try_for_each(|(index, ring)| ring.validate(index))
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.rings
            .iter()
            .filter_map(Ring::bbox)
            .reduce(|a, b| a.union(&b))
    }
}

impl From<&Polygon> for geo::Polygon<f64> {
    fn from(polygon: &Polygon) -> Self {
        let mut rings = polygon.rings.iter().map(|ring| ring.0.clone());
        let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
        geo::Polygon::new(exterior, rings.collect())
    }
}

impl From<&geo::Polygon<f64>> for Polygon {
    fn from(polygon: &geo::Polygon<f64>) -> Self {
        let rings = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|line| Ring::from(line.clone()))
            .collect();
        Polygon::new(rings)
    }
}

/// Independent polygons evaluated together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon(pub Vec<Polygon>);

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self(polygons)
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.0
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.0
            .iter()
            .filter_map(Polygon::bbox)
            .reduce(|a, b| a.union(&b))
    }
}

impl From<&geo::MultiPolygon<f64>> for MultiPolygon {
    fn from(multi: &geo::MultiPolygon<f64>) -> Self {
        MultiPolygon::new(multi.iter().map(Polygon::from).collect())
    }
}

/// Either areal geometry accepted by the containment wrapper
#[derive(Debug, Clone, PartialEq)]
pub enum Areal {
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl Areal {
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Areal::Polygon(p) => std::slice::from_ref(p),
            Areal::MultiPolygon(mp) => mp.polygons(),
        }
    }

    /// Validate every ring of every polygon. An empty multipolygon is valid.
    pub fn validate(&self) -> Result<()> {
        self.polygons().iter().try_for_each(Polygon::validate)
    }

    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Areal::Polygon(p) => p.bbox(),
            Areal::MultiPolygon(mp) => mp.bbox(),
        }
    }
}

impl From<&Areal> for geo::MultiPolygon<f64> {
    fn from(areal: &Areal) -> Self {
        geo::MultiPolygon::new(areal.polygons().iter().map(geo::Polygon::from).collect())
    }
}

impl From<Polygon> for Areal {
    fn from(p: Polygon) -> Self {
        Areal::Polygon(p)
    }
}

impl From<MultiPolygon> for Areal {
    fn from(mp: MultiPolygon) -> Self {
        Areal::MultiPolygon(mp)
    }
}
