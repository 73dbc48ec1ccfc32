//! Error types for point-in-polygon evaluation.

use thiserror::Error;

/// Why a ring was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingDefect {
    /// First and last coordinates differ.
    NotClosed,
    /// Fewer than four coordinates.
    TooFewPoints(usize),
}

impl std::fmt::Display for RingDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RingDefect::NotClosed => write!(f, "first and last coordinates must be the same"),
            RingDefect::TooFewPoints(n) => {
                write!(f, "ring has {} coordinates, at least 4 required", n)
            }
        }
    }
}

/// Errors produced while classifying points against polygons.
#[derive(Error, Debug)]
pub enum PipError {
    #[error("{what} is required")]
    MissingInput { what: &'static str },

    #[error("malformed ring {ring}: {reason}")]
    MalformedRing { ring: usize, reason: RingDefect },

    #[error("invalid geometry: expected {expected}, found {found}")]
    InvalidGeometry {
        expected: &'static str,
        found: String,
    },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// Result alias for point-in-polygon operations.
pub type Result<T> = std::result::Result<T, PipError>;
