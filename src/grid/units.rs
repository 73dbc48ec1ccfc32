//! Length units for grid cell sizes.

use geo::{Coord, Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters, matching geo's haversine
pub const EARTH_RADIUS: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Kilometers,
    Meters,
    Miles,
    NauticalMiles,
    Degrees,
    Radians,
}

impl Units {
    /// How many of this unit make up one radian of arc
    pub fn per_radian(self) -> f64 {
        match self {
            Units::Kilometers => EARTH_RADIUS / 1000.0,
            Units::Meters => EARTH_RADIUS,
            Units::Miles => EARTH_RADIUS / 1609.344,
            Units::NauticalMiles => EARTH_RADIUS / 1852.0,
            Units::Degrees => 180.0 / std::f64::consts::PI,
            Units::Radians => 1.0,
        }
    }
}

/// Great-circle distance between two lon/lat coordinates, in `units`.
pub(crate) fn distance(from: Coord<f64>, to: Coord<f64>, units: Units) -> f64 {
    let meters = Haversine.distance(Point::from(from), Point::from(to));
    meters / EARTH_RADIUS * units.per_radian()
}
