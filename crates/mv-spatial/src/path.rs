//! Computed paths and the record of what an agent actually walked.
//!
//! A [`Path`] is immutable once built and is shared behind an `Arc`: agents
//! cache it between ticks and several agents may follow the same one.  The
//! traversal position therefore lives outside it, in a per-agent
//! [`PathCursor`](crate::PathCursor).

use std::fmt;
use std::sync::Arc;

use mv_core::{EdgeId, PathId, Point, ShapeId, TopologyId};
use mv_geom::{LineString, Segment};

use crate::{CorridorGraph, NetworkGraph, Walk};

// ── PathEdge ──────────────────────────────────────────────────────────────────

/// One edge of a path: its geometry and its traversal weight.
#[derive(Clone, Debug, PartialEq)]
pub struct PathEdge {
    pub line: LineString,

    /// Cost of the whole edge.  Equal to the line's length unless the owning
    /// graph supplied its own weights.
    pub weight: f64,

    /// Edge in the owning graph, if the path has one.
    pub edge: Option<EdgeId>,
}

impl PathEdge {
    /// An edge weighted by its own length.
    pub fn new(line: LineString) -> Self {
        let weight = line.length();
        Self { line, weight, edge: None }
    }

    pub fn weighted(line: LineString, weight: f64, edge: EdgeId) -> Self {
        Self { line, weight, edge: Some(edge) }
    }

    /// Factor applied to planar distance when walking this edge:
    /// `weight / perimeter`, or `1.0` for a zero-length edge.
    #[inline]
    pub fn scale(&self) -> f64 {
        let perimeter = self.line.length();
        if perimeter > mv_core::point::EPSILON && self.weight.is_finite() {
            self.weight / perimeter
        } else {
            1.0
        }
    }
}

// ── Owner / graph back-reference ──────────────────────────────────────────────

/// What produced a path.  Used to decide whether a cached path is still
/// valid for a new request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathOwner {
    /// A topology's `path_between`.
    Topology(TopologyId),
    /// A pathfinder running over the grid or graph derived from a shape.
    Shape(ShapeId),
    /// Supplied directly by the caller.
    Caller,
}

/// Back-reference from a path to the graph it was computed on.
#[derive(Clone)]
pub enum GraphRef {
    Network(Arc<NetworkGraph>),
    Corridor(Arc<CorridorGraph>),
}

impl fmt::Debug for GraphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphRef::Network(g) => write!(f, "Network({} nodes)", g.node_count()),
            GraphRef::Corridor(g) => write!(f, "Corridor({} faces)", g.face_count()),
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// An ordered sequence of edge geometries between a start and a goal vertex.
#[derive(Clone, Debug)]
pub struct Path {
    pub id:    PathId,
    pub start: Point,
    pub end:   Point,
    pub edges: Vec<PathEdge>,
    pub owner: PathOwner,
    pub graph: Option<GraphRef>,
}

impl Path {
    /// A caller-owned path over `edges`.
    pub fn new(start: Point, end: Point, edges: Vec<PathEdge>) -> Self {
        Self { id: PathId::fresh(), start, end, edges, owner: PathOwner::Caller, graph: None }
    }

    /// A single straight edge from `start` to `end`.
    pub fn straight(start: Point, end: Point) -> Self {
        Self::new(start, end, vec![PathEdge::new(LineString::straight(start, end))])
    }

    /// A path along one polyline, from its first to its last coordinate.
    pub fn along(line: LineString) -> Self {
        let (start, end) = (line.first(), line.last());
        Self::new(start, end, vec![PathEdge::new(line)])
    }

    pub fn owned_by(mut self, owner: PathOwner) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_graph(mut self, graph: GraphRef) -> Self {
        self.graph = Some(graph);
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total weight of all edges.
    pub fn weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Total planar length of all edges.
    pub fn length(&self) -> f64 {
        self.edges.iter().map(|e| e.line.length()).sum()
    }

    /// `true` if this path was produced by `owner` and ends at `end`.
    pub fn serves(&self, owner: PathOwner, end: Point) -> bool {
        self.owner == owner && self.end.approx_eq(end)
    }
}

// ── TraveledPath ──────────────────────────────────────────────────────────────

/// The exact sub-path an agent walked during one action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraveledPath {
    pub segments: Vec<Segment>,

    /// Path edge each segment was walked along, index-aligned with
    /// `segments`.  `None` for legs off any graph edge.
    pub edges: Vec<Option<EdgeId>>,
}

impl TraveledPath {
    /// Build from the sequence of points the agent stood on, with no edge
    /// attribution.  See [`from_walk`](Self::from_walk).
    pub fn from_trail(trail: &[Point]) -> Self {
        Self::from_legs(trail, &[])
    }

    /// Build from a walk, keeping the path edge behind every leg.
    pub fn from_walk(walk: &Walk) -> Self {
        Self::from_legs(&walk.trail, &walk.via)
    }

    /// Consecutive duplicate points are dropped; a trail that never moved
    /// yields one zero-length segment so start and end are still recorded.
    fn from_legs(trail: &[Point], via: &[Option<EdgeId>]) -> Self {
        let mut segments = Vec::with_capacity(trail.len().saturating_sub(1));
        let mut edges = Vec::with_capacity(segments.capacity());
        for (k, w) in trail.windows(2).enumerate() {
            if !w[0].approx_eq(w[1]) {
                segments.push(Segment::new(w[0], w[1]));
                edges.push(via.get(k + 1).copied().flatten());
            }
        }
        if segments.is_empty() {
            if let Some(&p) = trail.first() {
                segments.push(Segment::new(p, trail.last().copied().unwrap_or(p)));
                edges.push(None);
            }
        }
        Self { segments, edges }
    }

    /// Segments walked along `edge`, in walking order.
    pub fn on_edge(&self, edge: EdgeId) -> impl Iterator<Item = &Segment> + '_ {
        self.segments
            .iter()
            .zip(&self.edges)
            .filter(move |(_, e)| **e == Some(edge))
            .map(|(s, _)| s)
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|s| s.a)
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|s| s.b)
    }

    pub fn length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }
}
