//! DistanceStepper and TopologySelector: resolving what a movement call
//! runs with from the agent's state and the call's optional overrides.

use std::sync::Arc;

use mv_core::{MoveError, MoveResult, Point};
use mv_geom::Shape;
use mv_spatial::{Extent, NetworkGraph};

use crate::cache::GeometryCache;
use crate::topology::Topology;

/// The `on` argument of `goto`: what the agent should move on instead of
/// its default topology.
#[derive(Clone)]
pub enum On {
    /// Move along this network only.
    Graph(Arc<NetworkGraph>),
    /// Use this topology as is.
    Topology(Arc<dyn Topology>),
    /// Cast this shape to a topology.  Casting can fail.
    Shape(Arc<Shape>),
}

impl std::fmt::Debug for On {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            On::Graph(g) => write!(f, "Graph({} nodes)", g.node_count()),
            On::Topology(t) => write!(f, "Topology({})", t.id()),
            On::Shape(s) => write!(f, "Shape({}, {})", s.id, s.geometry.kind()),
        }
    }
}

/// Distance budget of one call: the explicit speed wins over the agent's
/// persisted speed.  The value is used as a raw distance; no per-tick
/// scaling is applied here.
#[inline]
pub fn resolve_speed(speed: Option<f64>, persisted: f64) -> f64 {
    speed.unwrap_or(persisted)
}

/// Heading of one call: the explicit heading replaces the current one.
#[inline]
pub fn resolve_heading(heading: Option<f64>, current: f64) -> f64 {
    heading.unwrap_or(current)
}

/// The call's target, or `InvalidArgument` if it has no usable location.
pub fn resolve_target(target: Option<Point>) -> MoveResult<Point> {
    match target {
        Some(p) if p.is_finite() => Ok(p),
        Some(p) => Err(MoveError::InvalidArgument(format!("target {p} is not a finite location"))),
        None => Err(MoveError::InvalidArgument("missing target".into())),
    }
}

/// Topology a call runs on.
///
/// No `on` selects `default`; a graph is wrapped in a graph topology; a
/// topology is used as is; a shape is cast.  `None` means the cast failed.
pub fn select_topology(
    default: &Arc<dyn Topology>,
    on:      Option<&On>,
    cache:   &GeometryCache,
    extent:  Extent,
) -> Option<Arc<dyn Topology>> {
    match on {
        None => Some(Arc::clone(default)),
        Some(On::Graph(graph)) => Some(cache.graph_topology(graph, extent)),
        Some(On::Topology(t)) => Some(Arc::clone(t)),
        Some(On::Shape(shape)) => cache.shape_topology(shape, extent),
    }
}
