//! PIP service answering containment queries against a polygon set.

use std::sync::Arc;

use geo::Coord;
use tracing::debug;

use super::{PipOptions, PolygonIndex, PolygonMatch};
use crate::error::Result;
use crate::models::PolygonFeature;

/// Point-in-Polygon lookup service
pub struct PipService {
    index: PolygonIndex,
    options: PipOptions,
}

impl PipService {
    /// Create a new PIP service from a spatial index
    pub fn new(index: PolygonIndex, options: PipOptions) -> Self {
        Self { index, options }
    }

    /// Index the features and wrap them in a service
    pub fn from_features(features: Vec<PolygonFeature>, options: PipOptions) -> Result<Self> {
        Ok(Self::new(PolygonIndex::build(features)?, options))
    }

    /// Features containing the point, in collection order.
    pub fn containing(&self, point: Coord<f64>) -> Vec<PolygonMatch> {
        self.containing_with(point, self.options)
    }

    /// Same as [`PipService::containing`] with per-call options.
    pub fn containing_with(&self, point: Coord<f64>, options: PipOptions) -> Vec<PolygonMatch> {
        let mut matches = self.index.lookup(point);
        matches.retain(|m| m.classification.contains(options.ignore_boundary));

        debug!(
            "PIP lookup at ({}, {}): {} containing polygons (ignore_boundary={})",
            point.x,
            point.y,
            matches.len(),
            options.ignore_boundary
        );

        matches
    }

    /// The first feature, in collection order, that contains the point
    /// and satisfies `accept`.
    pub fn first_containing<F>(&self, point: Coord<f64>, accept: F) -> Option<Arc<PolygonFeature>>
    where
        F: Fn(&PolygonFeature) -> bool,
    {
        self.containing(point)
            .into_iter()
            .find(|m| accept(&m.feature))
            .map(|m| m.feature)
    }

    pub fn options(&self) -> PipOptions {
        self.options
    }

    /// Get the spatial index (for stats/debugging)
    pub fn index(&self) -> &PolygonIndex {
        &self.index
    }
}
