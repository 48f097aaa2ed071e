//! Lazily built, shared structures derived from governing geometries.
//!
//! Grids, corridor graphs, line networks and topology adapters are costly to
//! build and never change once built, so each is built on first use and
//! handed out as an `Arc` afterwards.  Every map sits behind its own
//! `RwLock`: lookups take the read lock; a miss builds outside any lock and
//! then inserts under the write lock.  If two threads race, the first value
//! inserted is kept.

use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use mv_core::{MoveError, MoveResult, ShapeId};
use mv_geom::{Geometry, LineString, Polygon, Shape};
use mv_spatial::{CorridorGraph, Extent, Grid, NetworkGraph, discretize};

use crate::topology::{GraphTopology, RegionTopology, Topology};

/// Grid key: shape, polygon index within it, cell size bits.
type GridKey = (ShapeId, usize, u64);

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
enum TopologyKey {
    Shape(ShapeId),
    /// Address of a caller-owned graph.  The cached adapter holds an `Arc`
    /// to that graph, so the address cannot be reused while the entry lives.
    Graph(usize),
}

#[derive(Default)]
pub struct GeometryCache {
    grids:      RwLock<FxHashMap<GridKey, Arc<Grid>>>,
    corridors:  RwLock<FxHashMap<(ShapeId, usize), Arc<CorridorGraph>>>,
    networks:   RwLock<FxHashMap<ShapeId, Arc<NetworkGraph>>>,
    topologies: RwLock<FxHashMap<TopologyKey, Arc<dyn Topology>>>,
}

fn lookup<K: Eq + Hash, V: Clone>(map: &RwLock<FxHashMap<K, V>>, key: &K) -> Option<V> {
    map.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
}

/// Insert `value` unless another thread got there first; return the winner.
fn insert<K: Eq + Hash, V: Clone>(map: &RwLock<FxHashMap<K, V>>, key: K, value: V, what: &'static str) -> V {
    tracing::debug!(what, "built and cached");
    let mut guard = map.write().unwrap_or_else(PoisonError::into_inner);
    match guard.entry(key) {
        Entry::Occupied(e) => e.get().clone(),
        Entry::Vacant(e) => e.insert(value).clone(),
    }
}

/// Run `op` on `polygon`; on a geometry fault retry once on its repaired
/// copy.  A fault that survives the repair is logged and returned.
pub(crate) fn with_repair<T>(
    polygon: &Polygon,
    what:    &'static str,
    op:      impl Fn(&Polygon) -> MoveResult<T>,
) -> MoveResult<T> {
    match op(polygon) {
        Err(e) if e.is_fatal() => {
            tracing::warn!(error = %e, what, "geometry fault; retrying on repaired polygon");
            match polygon.repaired().map_err(MoveError::from).and_then(|fixed| op(&fixed)) {
                Ok(v) => Ok(v),
                Err(e) => {
                    tracing::error!(error = %e, what, "geometry fault persists after repair");
                    Err(e)
                }
            }
        }
        other => other,
    }
}

fn cast(shape: &Shape, extent: Extent) -> MoveResult<Arc<dyn Topology>> {
    let topology: Arc<dyn Topology> = match &shape.geometry {
        Geometry::Polygon(p) => Arc::new(RegionTopology::new(p.clone(), extent)?),
        Geometry::MultiPolygon(ps) if ps.len() == 1 => Arc::new(RegionTopology::new(ps[0].clone(), extent)?),
        Geometry::LineString(l) => {
            Arc::new(GraphTopology::new(Arc::new(NetworkGraph::from_lines([l], false)), extent))
        }
        Geometry::MultiLineString(ls) => {
            Arc::new(GraphTopology::new(Arc::new(NetworkGraph::from_lines(ls, false)), extent))
        }
        Geometry::Point(_) | Geometry::MultiPolygon(_) => {
            return Err(MoveError::InvalidArgument(format!(
                "a {} cannot act as a topology",
                shape.geometry.kind()
            )));
        }
    };
    Ok(topology)
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid for polygon `part` of shape `id` at `cell_size`.
    pub fn grid(
        &self,
        id:            ShapeId,
        part:          usize,
        polygon:       &Polygon,
        cell_size:     f64,
        coarse_factor: usize,
        extent:        Extent,
    ) -> Arc<Grid> {
        let key = (id, part, cell_size.to_bits());
        if let Some(grid) = lookup(&self.grids, &key) {
            return grid;
        }
        let grid = Arc::new(discretize(polygon, cell_size, coarse_factor, extent));
        insert(&self.grids, key, grid, "grid")
    }

    /// Corridor graph for polygon `part` of shape `id`, repairing the
    /// polygon once if it cannot be triangulated.
    pub fn corridor(&self, id: ShapeId, part: usize, polygon: &Polygon) -> MoveResult<Arc<CorridorGraph>> {
        let key = (id, part);
        if let Some(corridor) = lookup(&self.corridors, &key) {
            return Ok(corridor);
        }
        let corridor = with_repair(polygon, "triangulation", |p| Ok(Arc::new(CorridorGraph::build(p)?)))?;
        Ok(insert(&self.corridors, key, corridor, "corridor graph"))
    }

    /// Directed network over the parts of a multi-line shape.
    pub fn network(&self, id: ShapeId, lines: &[LineString]) -> Arc<NetworkGraph> {
        if let Some(net) = lookup(&self.networks, &id) {
            return net;
        }
        let net = Arc::new(NetworkGraph::from_lines(lines, true));
        insert(&self.networks, id, net, "network graph")
    }

    /// Topology adapter restricting movement to `graph`.
    pub fn graph_topology(&self, graph: &Arc<NetworkGraph>, extent: Extent) -> Arc<dyn Topology> {
        let key = TopologyKey::Graph(Arc::as_ptr(graph) as usize);
        if let Some(t) = lookup(&self.topologies, &key) {
            return t;
        }
        let topology: Arc<dyn Topology> = Arc::new(GraphTopology::new(Arc::clone(graph), extent));
        insert(&self.topologies, key, topology, "graph topology")
    }

    /// Topology cast from a shape: polygons become a [`RegionTopology`],
    /// lines an undirected [`GraphTopology`].  `None` when the shape cannot
    /// act as a topology (a point, several polygons, or an invalid polygon).
    pub fn shape_topology(&self, shape: &Shape, extent: Extent) -> Option<Arc<dyn Topology>> {
        let key = TopologyKey::Shape(shape.id);
        if let Some(t) = lookup(&self.topologies, &key) {
            return Some(t);
        }
        match cast(shape, extent) {
            Ok(t) => Some(insert(&self.topologies, key, t, "shape topology")),
            Err(e) => {
                tracing::trace!(error = %e, shape = %shape.id, "shape cast to topology failed");
                None
            }
        }
    }

    /// Drop every cached structure derived from shape `id`.
    pub fn evict(&self, id: ShapeId) {
        self.grids.write().unwrap_or_else(PoisonError::into_inner).retain(|k, _| k.0 != id);
        self.corridors.write().unwrap_or_else(PoisonError::into_inner).retain(|k, _| k.0 != id);
        self.networks.write().unwrap_or_else(PoisonError::into_inner).remove(&id);
        self.topologies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TopologyKey::Shape(id));
    }

    /// Number of cached grids, corridor graphs and networks.
    pub fn len(&self) -> usize {
        self.grids.read().unwrap_or_else(PoisonError::into_inner).len()
            + self.corridors.read().unwrap_or_else(PoisonError::into_inner).len()
            + self.networks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
