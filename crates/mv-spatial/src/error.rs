//! Spatial-subsystem error type.

use thiserror::Error;

use mv_core::{MoveError, NodeId};
use mv_geom::GeomError;

use crate::IntPoint;

/// Errors produced by `mv-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("graph has no vertices")]
    EmptyGraph,

    /// A point that must lie inside the governing region does not.
    #[error("location {0} is outside the region")]
    OutsideRegion(mv_core::Point),

    #[error("no grid path from cell {from} to cell {to}")]
    NoGridPath { from: IntPoint, to: IntPoint },

    /// Wavefront propagation gave up before labelling the source cell.
    #[error("wavefront propagation exhausted after {rounds} rounds")]
    Exhausted { rounds: usize },

    #[error(transparent)]
    Geometry(#[from] GeomError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

impl From<SpatialError> for MoveError {
    fn from(e: SpatialError) -> Self {
        match e {
            SpatialError::NoRoute { .. }
            | SpatialError::NodeNotFound(_)
            | SpatialError::EmptyGraph
            | SpatialError::OutsideRegion(_)
            | SpatialError::NoGridPath { .. } => MoveError::Unreachable,
            SpatialError::Exhausted { rounds } => MoveError::Exhausted { rounds },
            SpatialError::Geometry(g) => g.into(),
        }
    }
}
