//! Corridor graphs: routing through a polygon over its triangulation.
//!
//! Each triangle face is a vertex; two faces are joined (both directions)
//! when they share an edge, the *portal*.  Edge weight is the distance
//! between face centroids.  A corridor path is the sequence of portals
//! crossed, each stored as a two-point [`PathEdge`].

use std::sync::Arc;

use rustc_hash::FxHashMap;

use mv_core::{EdgeId, FaceId, NodeId, Point};
use mv_geom::{LineString, Polygon, Segment, Triangle, triangulate};

use crate::follow::{Extent, Walk};
use crate::router::RawEdge;
use crate::{GraphRef, Path, PathCursor, PathEdge, Router, SpatialError, SpatialResult, WeightedCsr};

/// Bit-exact key for a vertex; `-0.0` and `0.0` collapse to one key.
#[inline]
pub(crate) fn coord_key(p: Point) -> (u64, u64) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

fn edge_key(s: &Segment) -> ((u64, u64), (u64, u64)) {
    let (a, b) = (coord_key(s.a), coord_key(s.b));
    if a <= b { (a, b) } else { (b, a) }
}

/// Face-adjacency graph over a triangulated polygon.
pub struct CorridorGraph {
    faces:     Vec<Triangle>,
    centroids: Vec<Point>,
    csr:       WeightedCsr,
    /// Shared edge of each graph edge, indexed by `EdgeId`.
    portals:   Vec<Segment>,
}

impl CorridorGraph {
    /// Triangulate `polygon` and build its corridor graph.
    pub fn build(polygon: &Polygon) -> SpatialResult<Self> {
        let faces = triangulate(polygon)?;
        let graph = Self::from_triangles(faces);
        tracing::debug!(
            faces = graph.face_count(),
            portals = graph.csr.edge_count() / 2,
            "corridor graph built"
        );
        Ok(graph)
    }

    /// Build from an existing triangulation.  Faces sharing an edge must use
    /// bit-identical coordinates for it.
    pub fn from_triangles(faces: Vec<Triangle>) -> Self {
        let mut by_edge: FxHashMap<_, Vec<usize>> = FxHashMap::default();
        for (f, tri) in faces.iter().enumerate() {
            for e in tri.edges() {
                by_edge.entry(edge_key(&e)).or_default().push(f);
            }
        }

        let centroids: Vec<Point> = faces.iter().map(Triangle::centroid).collect();
        let mut raw = Vec::new();
        let mut portal_of = Vec::new();
        for (f, tri) in faces.iter().enumerate() {
            for e in tri.edges() {
                let Some(sharing) = by_edge.get(&edge_key(&e)) else { continue };
                for &g in sharing.iter().filter(|&&g| g != f) {
                    let weight = centroids[f].distance(centroids[g]);
                    raw.push((raw.len(), RawEdge { from: NodeId(f as u32), to: NodeId(g as u32), weight }));
                    portal_of.push(e);
                }
            }
        }

        let (csr, order) = WeightedCsr::from_edges(faces.len(), raw);
        let portals = order.into_iter().map(|k| portal_of[k]).collect();
        Self { faces, centroids, csr, portals }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn faces(&self) -> &[Triangle] {
        &self.faces
    }

    pub fn csr(&self) -> &WeightedCsr {
        &self.csr
    }

    #[inline]
    pub fn centroid(&self, face: FaceId) -> Point {
        self.centroids[face.index()]
    }

    #[inline]
    pub fn portal(&self, edge: EdgeId) -> Segment {
        self.portals[edge.index()]
    }

    /// First face containing `p` (boundaries included).
    pub fn locate(&self, p: Point) -> Option<FaceId> {
        self.faces.iter().position(|t| t.contains(p)).map(|f| FaceId(f as u32))
    }

    /// Shortest face path from the face of `source` to the face of `target`.
    ///
    /// The returned path starts at `source`, ends at `target` and has one
    /// edge per portal crossed; it is empty when both lie in the same face.
    pub fn path_between<R: Router + ?Sized>(
        self: &Arc<Self>,
        router: &R,
        source: Point,
        target: Point,
    ) -> SpatialResult<Path> {
        let from = self.locate(source).ok_or(SpatialError::OutsideRegion(source))?;
        let to = self.locate(target).ok_or(SpatialError::OutsideRegion(target))?;
        let route = router.route(&self.csr, NodeId(from.0), NodeId(to.0))?;
        let edges = route
            .edges
            .iter()
            .map(|&e| {
                let portal = self.portals[e.index()];
                let line = LineString::straight(portal.a, portal.b);
                PathEdge::weighted(line, self.csr.edge_weight[e.index()], e)
            })
            .collect();
        Ok(Path::new(source, target, edges).with_graph(GraphRef::Corridor(Arc::clone(self))))
    }

    /// Points a walker aims at after crossing `skip` portals of `path`.
    ///
    /// Each portal is crossed at its point nearest the centroid of the face
    /// beyond it (nearest the target for the last portal).  The flag is
    /// `true` for portal crossings and `false` for the final `target`.
    fn aims(&self, path: &Path, skip: usize, target: Point) -> Vec<(Point, bool)> {
        let last = path.edges.len().saturating_sub(1);
        let mut aims: Vec<(Point, bool)> = path
            .edges
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(k, e)| {
                let portal = Segment::new(e.line.first(), e.line.last());
                let toward = match e.edge {
                    Some(id) if k < last && id.index() < self.csr.edge_count() => {
                        self.centroids[self.csr.edge_to[id.index()].index()]
                    }
                    _ => target,
                };
                (portal.closest_point(toward), true)
            })
            .collect();
        aims.push((target, false));
        aims
    }

    /// The whole corridor walk as a polyline: `source`, every portal
    /// crossing, then `target`.  Consecutive duplicates are dropped.
    pub fn waypoints(&self, path: &Path, source: Point, target: Point) -> Vec<Point> {
        let mut pts = vec![source];
        for (p, _) in self.aims(path, 0, target) {
            if pts.last().is_none_or(|q| !q.approx_eq(p)) {
                pts.push(p);
            }
        }
        pts
    }

    /// Walk from `source` toward `target` through the portals of `path`.
    ///
    /// Portals are crossed at the points [`waypoints`](Self::waypoints)
    /// lists; after the last portal the walk heads straight for `target`.
    /// The cursor's edge index counts portals already crossed, so the next
    /// call resumes after them.  Each leg up to a portal is tagged with that
    /// portal's edge, and the stopping point is clamped into `extent`.
    pub fn advance(
        &self,
        path:   &Path,
        cursor: Option<PathCursor>,
        source: Point,
        target: Point,
        budget: f64,
        extent: Extent,
    ) -> (Walk, PathCursor) {
        let mut cursor = cursor
            .filter(|c| c.is_for(path))
            .unwrap_or(PathCursor { path: path.id, edge: 0, vertex: 0 });

        let mut here = source;
        let mut left = budget.max(0.0);
        let mut walk = Walk::stay(source, left);
        for (aim, is_portal) in self.aims(path, cursor.edge, target) {
            let via = if is_portal { path.edges.get(cursor.edge).and_then(|e| e.edge) } else { None };
            let d = here.distance(aim);
            if left < d {
                here = here.lerp(aim, left / d);
                walk.step(here, via);
                left = 0.0;
                break;
            }
            here = aim;
            walk.step(aim, via);
            left = if left > d { left - d } else { 0.0 };
            if is_portal {
                cursor.edge += 1;
            }
            if left == 0.0 {
                break;
            }
        }
        walk.location = here;
        walk.remaining = left;
        walk.clamp_into(extent);
        (walk, cursor)
    }
}
