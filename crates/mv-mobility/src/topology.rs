//! Topologies: the spatial collaborator every movement action queries.
//!
//! A topology answers three questions for a given environment: where does a
//! heading and a distance lead, how far apart are two points, and which path
//! joins them.  Routing topologies take the engine's [`Router`] as a trait
//! object so that one engine can serve any topology.

use std::sync::Arc;

use mv_core::{MoveError, MoveResult, Point, TopologyId, normalize_heading};
use mv_geom::{LineString, Polygon};
use mv_spatial::follow;
use mv_spatial::{CorridorGraph, DijkstraRouter, Extent, NetworkGraph, Path, PathEdge, PathOwner, Router};

/// Spatial queries for one environment.
///
/// Implementations are immutable after construction and shared between
/// agents (and threads) behind an `Arc`.
pub trait Topology: Send + Sync {
    /// Stable identity; paths record it so a cached path is only reused on
    /// the topology that computed it.
    fn id(&self) -> TopologyId;

    /// Environment extent movement results are clamped into.
    fn extent(&self) -> Extent;

    /// Point reached from `from` after `distance` units along `heading`
    /// (degrees), or `None` if the topology offers no such point.
    ///
    /// With `clamp`, the point is clamped into [`extent`](Self::extent).
    fn destination(&self, from: Point, heading: f64, distance: f64, clamp: bool) -> Option<Point>;

    /// Distance between `a` and `b` measured in this topology.
    fn distance_between(&self, a: Point, b: Point) -> Option<f64> {
        Some(a.distance(b))
    }

    /// A walkable path from `source` to `target`, owned by this topology.
    fn path_between(&self, router: &dyn Router, source: Point, target: Point) -> MoveResult<Path>;
}

// ── Continuous space ──────────────────────────────────────────────────────────

/// Open continuous space: straight lines everywhere.
pub struct ContinuousTopology {
    id:     TopologyId,
    extent: Extent,
}

impl ContinuousTopology {
    pub fn new(extent: Extent) -> Self {
        Self { id: TopologyId::fresh(), extent }
    }
}

impl Topology for ContinuousTopology {
    fn id(&self) -> TopologyId {
        self.id
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn destination(&self, from: Point, heading: f64, distance: f64, clamp: bool) -> Option<Point> {
        let p = from.offset(heading, distance);
        if !p.is_finite() {
            return None;
        }
        Some(if clamp { self.extent.clamp(p) } else { p })
    }

    fn path_between(&self, _router: &dyn Router, source: Point, target: Point) -> MoveResult<Path> {
        if !(source.is_finite() && target.is_finite()) {
            return Err(MoveError::Unreachable);
        }
        Ok(Path::straight(source, target).owned_by(PathOwner::Topology(self.id)))
    }
}

// ── Line network ──────────────────────────────────────────────────────────────

/// Movement restricted to a line network.
pub struct GraphTopology {
    id:     TopologyId,
    graph:  Arc<NetworkGraph>,
    extent: Extent,
}

impl GraphTopology {
    pub fn new(graph: Arc<NetworkGraph>, extent: Extent) -> Self {
        Self { id: TopologyId::fresh(), graph, extent }
    }

    pub fn graph(&self) -> &Arc<NetworkGraph> {
        &self.graph
    }
}

/// Smallest angle between two headings, in `[0, 180]`.
fn angular_gap(a: f64, b: f64) -> f64 {
    let d = normalize_heading(a - b);
    d.min(360.0 - d)
}

impl Topology for GraphTopology {
    fn id(&self) -> TopologyId {
        self.id
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    /// Leave the node nearest `from` by the edge best aligned with
    /// `heading` and walk `distance` along it.  Network positions already
    /// lie inside the environment, so `clamp` changes nothing.
    fn destination(&self, from: Point, heading: f64, distance: f64, _clamp: bool) -> Option<Point> {
        let node = self.graph.snap_to_node(from)?;
        let start = self.graph.node_pos[node.index()];
        let bearing = |line: &LineString| start.heading_to(line.coords()[1]);
        let edge = self.graph.out_edges(node).min_by(|&a, &b| {
            let ga = angular_gap(heading, bearing(self.graph.edge_line(a)));
            let gb = angular_gap(heading, bearing(self.graph.edge_line(b)));
            ga.total_cmp(&gb)
        })?;
        let line = self.graph.edge_line(edge);
        Some(follow::advance(line.coords(), start, line.last(), distance, self.extent).location)
    }

    /// Shortest network distance between the nodes nearest `a` and `b`,
    /// plus the straight legs from `a` and `b` onto those nodes.
    fn distance_between(&self, a: Point, b: Point) -> Option<f64> {
        let from = self.graph.snap_to_node(a)?;
        let to = self.graph.snap_to_node(b)?;
        let route = DijkstraRouter.route(self.graph.csr(), from, to).ok()?;
        let legs = a.distance(self.graph.node_pos[from.index()]) + b.distance(self.graph.node_pos[to.index()]);
        Some(route.total_weight + legs)
    }

    fn path_between(&self, router: &dyn Router, source: Point, target: Point) -> MoveResult<Path> {
        let path = self.graph.path_between(router, source, target)?;
        Ok(path.owned_by(PathOwner::Topology(self.id)))
    }
}

// ── Polygonal region ──────────────────────────────────────────────────────────

/// Continuous movement confined to one polygon.
///
/// Destinations outside the polygon do not exist.  Paths cross the polygon
/// through its triangulated corridor graph and are returned as a single
/// polyline through the portal crossings.
pub struct RegionTopology {
    id:       TopologyId,
    polygon:  Polygon,
    corridor: Arc<CorridorGraph>,
    extent:   Extent,
}

impl RegionTopology {
    /// Triangulate `polygon` up front; fails on an invalid polygon.
    pub fn new(polygon: Polygon, extent: Extent) -> MoveResult<Self> {
        let corridor = Arc::new(CorridorGraph::build(&polygon)?);
        Ok(Self { id: TopologyId::fresh(), polygon, corridor, extent })
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }
}

impl Topology for RegionTopology {
    fn id(&self) -> TopologyId {
        self.id
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn destination(&self, from: Point, heading: f64, distance: f64, clamp: bool) -> Option<Point> {
        let raw = from.offset(heading, distance);
        let p = if clamp { self.extent.clamp(raw) } else { raw };
        (p.is_finite() && self.polygon.contains(p)).then_some(p)
    }

    fn path_between(&self, router: &dyn Router, source: Point, target: Point) -> MoveResult<Path> {
        let corridor_path = self.corridor.path_between(router, source, target)?;
        let waypoints = self.corridor.waypoints(&corridor_path, source, target);
        let path = if waypoints.len() < 2 {
            Path::straight(source, target)
        } else {
            Path::new(source, target, vec![PathEdge::new(LineString::new(waypoints)?)])
        };
        Ok(path.owned_by(PathOwner::Topology(self.id)))
    }
}
