//! Spatial index for fast candidate lookup across many polygons.

use std::sync::Arc;

use geo::Coord;
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info};

use super::contains::compose_validated;
use crate::error::Result;
use crate::models::{Classification, PolygonFeature};

/// Wrapper for R-tree indexing of polygon features
#[derive(Clone)]
pub struct IndexedPolygon {
    pub feature: Arc<PolygonFeature>,
    /// Position in the source collection
    pub position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPolygon {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedPolygon {
    /// Uses the feature's own bbox when it has one. `AABB::from_corners`
    /// reorders an inverted bbox, so lookups still check the bbox itself.
    fn new(feature: PolygonFeature, position: usize) -> Option<Self> {
        let bbox = feature.bbox.or_else(|| feature.geometry.bbox())?;
        Some(Self {
            feature: Arc::new(feature),
            position,
            envelope: AABB::from_corners([bbox.west, bbox.south], [bbox.east, bbox.north]),
        })
    }
}

/// A feature that contains or touches a looked-up point
#[derive(Debug, Clone)]
pub struct PolygonMatch {
    pub position: usize,
    pub feature: Arc<PolygonFeature>,
    pub classification: Classification,
}

/// R-tree over polygon features, preserving their collection order
pub struct PolygonIndex {
    tree: RTree<IndexedPolygon>,
    len: usize,
}

impl PolygonIndex {
    /// Build the index. Every ring of every feature is validated up front,
    /// so lookups never fail.
    pub fn build(features: Vec<PolygonFeature>) -> Result<Self> {
        info!("Building spatial index for {} polygons...", features.len());

        for feature in &features {
            feature.geometry.validate()?;
        }
        let len = features.len();

        // Features without coordinates can contain nothing
        let indexed: Vec<IndexedPolygon> = features
            .into_iter()
            .enumerate()
            .filter_map(|(position, feature)| IndexedPolygon::new(feature, position))
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Ok(Self { tree, len })
    }

    /// Every feature that does not classify the point as `Outside`, in
    /// collection order.
    pub fn lookup(&self, point: Coord<f64>) -> Vec<PolygonMatch> {
        let query_envelope = AABB::from_point([point.x, point.y]);

        let mut matches: Vec<PolygonMatch> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ip| ip.feature.bbox.map_or(true, |bbox| bbox.contains(point)))
            .filter_map(|ip| {
                let classification = compose_validated(point, ip.feature.geometry.polygons());
                (classification != Classification::Outside).then(|| PolygonMatch {
                    position: ip.position,
                    feature: Arc::clone(&ip.feature),
                    classification,
                })
            })
            .collect();
        matches.sort_by_key(|m| m.position);

        debug!(
            "Lookup at ({}, {}): {} matching polygons",
            point.x,
            point.y,
            matches.len()
        );
        matches
    }

    /// Number of features given to [`PolygonIndex::build`]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all indexed features, in no particular order
    pub fn features(&self) -> impl Iterator<Item = &Arc<PolygonFeature>> {
        self.tree.iter().map(|ip| &ip.feature)
    }
}
