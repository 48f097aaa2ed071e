//! Weighted CSR graphs, the routing trait, and the default Dijkstra.
//!
//! # Data layout
//!
//! Both the network and the corridor graphs store their adjacency in
//! **Compressed Sparse Row (CSR)** form.  Given a `NodeId n`, its outgoing
//! edges occupy the `EdgeId` range
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! and all edge arrays are sorted by source node, so iterating a node's
//! neighbours is a contiguous scan.
//!
//! # Pluggability
//!
//! The movement engine calls routing through the [`Router`] trait, so an
//! application can swap in A* or a precomputed table without touching the
//! pathfinders.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use mv_core::{EdgeId, NodeId};

use crate::{SpatialError, SpatialResult};

// ── WeightedCsr ───────────────────────────────────────────────────────────────

/// Directed graph with non-negative `f64` edge weights in CSR form.
#[derive(Clone, Debug, Default)]
pub struct WeightedCsr {
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each edge; needed to walk `prev_edge` back to the source.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Traversal cost of each edge.
    pub edge_weight: Vec<f64>,
}

/// An edge handed to [`WeightedCsr::from_edges`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawEdge {
    pub from:   NodeId,
    pub to:     NodeId,
    pub weight: f64,
}

impl WeightedCsr {
    /// Build the CSR arrays from edges in any order.
    ///
    /// Returns the permutation as well: `order[k]` is the input index of the
    /// edge that ended up at `EdgeId(k)`, so callers can reorder per-edge
    /// payloads (geometries) to match.
    pub fn from_edges(node_count: usize, mut raw: Vec<(usize, RawEdge)>) -> (Self, Vec<usize>) {
        raw.sort_by_key(|(i, e)| (e.from.0, *i));

        let order: Vec<usize>        = raw.iter().map(|(i, _)| *i).collect();
        let edge_from: Vec<NodeId>   = raw.iter().map(|(_, e)| e.from).collect();
        let edge_to: Vec<NodeId>     = raw.iter().map(|(_, e)| e.to).collect();
        let edge_weight: Vec<f64>    = raw.iter().map(|(_, e)| e.weight.max(0.0)).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for (_, e) in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_from.len());

        (Self { node_out_start, edge_from, edge_to, edge_weight }, order)
    }

    pub fn node_count(&self) -> usize {
        self.node_out_start.len().saturating_sub(1)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// The edge `from → to`, if any (first one when parallel edges exist).
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Edges to traverse in order, from source to destination.
    pub edges: Vec<EdgeId>,
    /// Sum of the edge weights.
    pub total_weight: f64,
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync` so they can be shared across Rayon
/// workers when many agents move in parallel.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to`.  `from == to` is an empty route,
    /// not an error.
    fn route(&self, graph: &WeightedCsr, from: NodeId, to: NodeId) -> SpatialResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over a [`WeightedCsr`].
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &WeightedCsr, from: NodeId, to: NodeId) -> SpatialResult<Route> {
        dijkstra(graph, from, to)
    }
}

fn dijkstra(graph: &WeightedCsr, from: NodeId, to: NodeId) -> SpatialResult<Route> {
    let n = graph.node_count();
    for node in [from, to] {
        if node.index() >= n {
            return Err(SpatialError::NodeNotFound(node));
        }
    }
    if from == to {
        return Ok(Route { edges: vec![], total_weight: 0.0 });
    }

    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    dist[from.index()] = 0.0;

    // Min-heap via Reverse; NodeId as secondary key for deterministic ties.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), from)));

    while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost + graph.edge_weight[edge.index()];
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((OrderedFloat(new_cost), neighbor)));
            }
        }
    }

    Err(SpatialError::NoRoute { from, to })
}

fn reconstruct(graph: &WeightedCsr, prev_edge: &[EdgeId], to: NodeId, total: f64) -> Route {
    let mut edges = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();
    Route { edges, total_weight: total }
}
