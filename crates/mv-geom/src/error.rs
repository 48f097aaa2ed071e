//! Geometry error type.

use thiserror::Error;

use mv_core::MoveError;

/// Errors produced by `mv-geom`.  Every variant describes a corrupt or
/// unusable geometry, so all of them surface as `MoveError::GeometryFault`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeomError {
    #[error("ring has {0} distinct vertices, need at least 3")]
    DegenerateRing(usize),

    #[error("line string needs at least 2 coordinates, got {0}")]
    ShortLine(usize),

    #[error("non-finite coordinate at vertex {0}")]
    NonFinite(usize),

    #[error("ring {ring} self-intersects between edges {a} and {b}")]
    SelfIntersection { ring: usize, a: usize, b: usize },

    #[error("rings {0} and {1} intersect")]
    RingsIntersect(usize, usize),

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

pub type GeomResult<T> = Result<T, GeomError>;

impl From<GeomError> for MoveError {
    fn from(e: GeomError) -> Self {
        MoveError::GeometryFault(e.to_string())
    }
}
