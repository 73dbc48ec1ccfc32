//! Grid generation over a bounding box.

mod triangle;
mod units;

pub use triangle::{triangle_grid, TriangleGridOptions};
pub use units::Units;
