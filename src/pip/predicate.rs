//! Crossing-number point-in-polygon predicate.
//!
//! Every ring of a polygon, outer boundary and holes alike, feeds the same
//! crossing counter, so holes drop out through even-odd parity without any
//! special casing. Points exactly on an edge or vertex are reported as
//! [`Classification::Boundary`]. All comparisons are exact; no epsilon is
//! applied, so coordinates produced by arithmetic may land a hair off an edge.

use std::ops::ControlFlow;

use geo::Coord;

use crate::error::Result;
use crate::models::{Classification, Polygon, Ring};

/// Marker for a traversal that stopped on an edge or vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnBoundary;

/// How one directed edge relates to the rightward ray from the query point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeHit {
    Crosses,
    Misses,
    Touches,
}

/// Classify `point` against `polygon`.
///
/// Fails with `MissingInput` when the polygon has no rings and with
/// `MalformedRing` when any ring is open or too short. Rings are validated
/// before any edge is walked, so a malformed ring is reported even if the
/// point sits on an earlier ring's boundary.
pub fn classify(point: Coord<f64>, polygon: &Polygon) -> Result<Classification> {
    polygon.validate()?;
    Ok(classify_validated(point, polygon))
}

/// Classify against a polygon whose rings have already been validated.
pub(crate) fn classify_validated(point: Coord<f64>, polygon: &Polygon) -> Classification {
    let crossings = polygon
        .rings()
        .iter()
        .try_fold(0usize, |k, ring| {
            ControlFlow::<OnBoundary, usize>::Continue(k + ring_crossings(point, ring)?)
        });

    match crossings {
        ControlFlow::Break(OnBoundary) => Classification::Boundary,
        ControlFlow::Continue(k) if k % 2 == 1 => Classification::Inside,
        ControlFlow::Continue(_) => Classification::Outside,
    }
}

/// Count the ray crossings contributed by one ring.
pub fn ring_crossings(point: Coord<f64>, ring: &Ring) -> ControlFlow<OnBoundary, usize> {
    ring.coords()
        .windows(2)
        .try_fold(0usize, |k, edge| match edge_hit(point, edge[0], edge[1]) {
            EdgeHit::Crosses => ControlFlow::Continue(k + 1),
            EdgeHit::Misses => ControlFlow::Continue(k),
            EdgeHit::Touches => ControlFlow::Break(OnBoundary),
        })
}

fn edge_hit(point: Coord<f64>, current: Coord<f64>, next: Coord<f64>) -> EdgeHit {
    // Translate so the query point is the origin
    let (u1, v1) = (current.x - point.x, current.y - point.y);
    let (u2, v2) = (next.x - point.x, next.y - point.y);

    // Entirely above or below the ray
    if (v1 < 0.0 && v2 < 0.0) || (v1 > 0.0 && v2 > 0.0) {
        return EdgeHit::Misses;
    }

    // Side of the edge's line the origin is on, scaled by the vertical span
    let f = u1 * v2 - u2 * v1;

    if v2 > 0.0 && v1 <= 0.0 {
        // upward
        if f > 0.0 {
            return EdgeHit::Crosses;
        } else if f == 0.0 {
            return EdgeHit::Touches;
        }
    } else if v1 > 0.0 && v2 <= 0.0 {
        // downward
        if f < 0.0 {
            return EdgeHit::Crosses;
        } else if f == 0.0 {
            return EdgeHit::Touches;
        }
    } else if (v2 == 0.0 && v1 < 0.0) || (v1 == 0.0 && v2 < 0.0) {
        if f == 0.0 {
            return EdgeHit::Touches;
        }
    } else if v1 == 0.0 && v2 == 0.0 {
        // Horizontal edge at the query height, either direction
        if (u2 <= 0.0 && u1 >= 0.0) || (u1 <= 0.0 && u2 >= 0.0) {
            return EdgeHit::Touches;
        }
    }

    EdgeHit::Misses
}
