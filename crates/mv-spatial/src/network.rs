//! Line-network graphs and edge-by-edge walking.
//!
//! # Data layout
//!
//! Adjacency is a [`WeightedCsr`]: the outgoing edges of `NodeId n` occupy
//! the contiguous `EdgeId` range `node_out_start[n] .. node_out_start[n+1]`.
//! `edge_line` is sorted the same way and holds each edge's geometry,
//! oriented from its source node to its destination node.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `[x, y]` to the nearest `NodeId`.  Used to
//! snap free locations (agent, target) onto the network.

use std::sync::Arc;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use mv_core::{EdgeId, NodeId, Point};
use mv_geom::LineString;

use crate::corridor::coord_key;
use crate::follow::{self, Extent, Walk};
use crate::router::RawEdge;
use crate::{GraphRef, Path, PathCursor, PathEdge, Router, SpatialError, SpatialResult, WeightedCsr};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NetworkGraph ──────────────────────────────────────────────────────────────

/// Weighted line network in CSR format plus a spatial index for snapping.
///
/// Do not construct directly; use [`NetworkGraphBuilder`] or
/// [`NetworkGraph::from_lines`].
pub struct NetworkGraph {
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    csr: WeightedCsr,

    /// Geometry of each edge.  Indexed by `EdgeId`.
    edge_line: Vec<LineString>,

    spatial_idx: RTree<NodeEntry>,
}

impl std::fmt::Debug for NetworkGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

impl NetworkGraph {
    /// A graph with no nodes.  Every routing request against it fails.
    pub fn empty() -> Self {
        NetworkGraphBuilder::new().build()
    }

    /// Build from line geometries weighted by their length.  With
    /// `directed = false` every line is usable in both directions.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a LineString>, directed: bool) -> Self {
        let mut b = NetworkGraphBuilder::new();
        for line in lines {
            b.add_line(line.clone(), None, directed);
        }
        b.build()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.csr.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    pub fn csr(&self) -> &WeightedCsr {
        &self.csr
    }

    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.csr.out_edges(node)
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.csr.out_degree(node)
    }

    #[inline]
    pub fn edge_line(&self, edge: EdgeId) -> &LineString {
        &self.edge_line[edge.index()]
    }

    #[inline]
    pub fn edge_weight(&self, edge: EdgeId) -> f64 {
        self.csr.edge_weight[edge.index()]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest node to `pos`; `None` only for an empty graph.
    pub fn snap_to_node(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Shortest path between the nodes nearest `source` and `target`.
    ///
    /// The path starts at `source` and ends at `target`; its edges are the
    /// network edges between the two snapped nodes.
    pub fn path_between<R: Router + ?Sized>(
        self: &Arc<Self>,
        router: &R,
        source: Point,
        target: Point,
    ) -> SpatialResult<Path> {
        let from = self.snap_to_node(source).ok_or(SpatialError::EmptyGraph)?;
        let to = self.snap_to_node(target).ok_or(SpatialError::EmptyGraph)?;
        let route = router.route(&self.csr, from, to)?;
        tracing::debug!(%from, %to, edges = route.edges.len(), weight = route.total_weight, "network route");
        let edges = route
            .edges
            .iter()
            .map(|&e| PathEdge::weighted(self.edge_line[e.index()].clone(), self.edge_weight(e), e))
            .collect();
        Ok(Path::new(source, target, edges).with_graph(GraphRef::Network(Arc::clone(self))))
    }
}

/// Walk `path` edge by edge from `source`, carrying unspent budget from one
/// edge to the next.
///
/// Every edge but the last is followed to its end node; the last is followed
/// toward the true `target`.  A path without edges is a straight walk to
/// `target`.  Returns `None` when the cursor has already consumed every edge.
pub fn advance(
    path:   &Path,
    cursor: Option<PathCursor>,
    source: Point,
    target: Point,
    budget: f64,
    extent: Extent,
) -> Option<(Walk, PathCursor)> {
    let mut cursor = cursor
        .filter(|c| c.is_for(path))
        .unwrap_or(PathCursor { path: path.id, edge: 0, vertex: 0 });

    if path.edges.is_empty() {
        let mut walk = follow::straight(source, target, budget);
        walk.clamp_into(extent);
        return Some((walk, cursor));
    }
    if cursor.is_exhausted(path) {
        return None;
    }

    let last = path.edges.len() - 1;
    let mut here = source;
    let mut left = budget.max(0.0);
    let mut out = Walk::stay(source, left);
    while cursor.edge < path.edges.len() {
        let edge = &path.edges[cursor.edge];
        let line = &edge.line;
        let aim = if cursor.edge == last { target } else { line.last() };
        let walk = follow::advance(line.coords(), here, aim, left, extent);
        for p in walk.trail.into_iter().skip(1) {
            out.step(p, edge.edge);
        }
        here = walk.location;
        left = walk.remaining;
        if !here.approx_eq(aim) {
            cursor.vertex = line.nearest_segment(here) + 1;
            break;
        }
        cursor.edge += 1;
        cursor.vertex = 0;
        if left <= 0.0 {
            break;
        }
    }
    out.location = here;
    out.remaining = left;
    Some((out, cursor))
}

// ── NetworkGraphBuilder ───────────────────────────────────────────────────────

/// Construct a [`NetworkGraph`] incrementally, then call [`build`](Self::build).
///
/// Line endpoints with identical coordinates are merged into one node.
///
/// # Example
///
/// ```
/// use mv_core::Point;
/// use mv_geom::LineString;
/// use mv_spatial::NetworkGraphBuilder;
///
/// let mut b = NetworkGraphBuilder::new();
/// b.add_line(LineString::straight(Point::new(0.0, 0.0), Point::new(5.0, 0.0)), None, false);
/// b.add_line(LineString::straight(Point::new(5.0, 0.0), Point::new(5.0, 5.0)), None, false);
/// let net = b.build();
/// assert_eq!(net.node_count(), 3);
/// assert_eq!(net.edge_count(), 4); // both directions
/// ```
pub struct NetworkGraphBuilder {
    nodes:     Vec<Point>,
    index:     FxHashMap<(u64, u64), NodeId>,
    raw_lines: Vec<RawLine>,
}

struct RawLine {
    from:   NodeId,
    to:     NodeId,
    line:   LineString,
    weight: f64,
}

impl NetworkGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), index: FxHashMap::default(), raw_lines: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            index:     FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            raw_lines: Vec::with_capacity(edges),
        }
    }

    /// Return the node at `pos`, adding it if no node has these coordinates.
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let next = NodeId(self.nodes.len() as u32);
        let id = *self.index.entry(coord_key(pos)).or_insert(next);
        if id == next {
            self.nodes.push(pos);
        }
        id
    }

    /// Add `line` as an edge between the nodes at its endpoints.
    ///
    /// `weight` defaults to the line's length.  An undirected line adds the
    /// reversed geometry as the return edge.
    pub fn add_line(&mut self, line: LineString, weight: Option<f64>, directed: bool) {
        let from = self.add_node(line.first());
        let to = self.add_node(line.last());
        let weight = weight.unwrap_or_else(|| line.length());
        if !directed {
            self.raw_lines.push(RawLine { from: to, to: from, line: line.reversed(), weight });
        }
        self.raw_lines.push(RawLine { from, to, line, weight });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_lines.len()
    }

    /// Consume the builder and produce a [`NetworkGraph`].
    pub fn build(self) -> NetworkGraph {
        let raw = self
            .raw_lines
            .iter()
            .enumerate()
            .map(|(i, l)| (i, RawEdge { from: l.from, to: l.to, weight: l.weight }))
            .collect();
        let (csr, order) = WeightedCsr::from_edges(self.nodes.len(), raw);

        let mut lines: Vec<Option<LineString>> = self.raw_lines.into_iter().map(|l| Some(l.line)).collect();
        let edge_line: Vec<LineString> = order.iter().filter_map(|&k| lines[k].take()).collect();

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, p)| NodeEntry { point: [p.x, p.y], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        NetworkGraph { node_pos: self.nodes, csr, edge_line, spatial_idx }
    }
}

impl Default for NetworkGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
