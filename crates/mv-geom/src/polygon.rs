//! Polygons with holes.
//!
//! Rings are stored open (the closing vertex is not repeated).  The exterior
//! ring is the first ring; every other ring is a hole.  Containment is
//! *closed*: points on any ring count as inside, which is what coverage tests
//! and "is the target inside this region" checks both want.

use mv_core::Point;
use mv_core::point::EPSILON;

use crate::segment::cross;
use crate::{GeomError, GeomResult, Segment};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    rings: Vec<Vec<Point>>,
}

/// Drop a repeated closing vertex, if present.
fn open_ring(mut ring: Vec<Point>) -> Vec<Point> {
    if ring.len() > 1 && ring[0].approx_eq(ring[ring.len() - 1]) {
        ring.pop();
    }
    ring
}

/// Twice the signed area of a ring; positive when counter-clockwise.
fn ring_area2(ring: &[Point]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (p, q) = (ring[i], ring[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum()
}

fn ring_edges(ring: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    let n = ring.len();
    (0..n).map(move |i| Segment::new(ring[i], ring[(i + 1) % n]))
}

impl Polygon {
    /// Build a polygon without validating it.  Closed or open rings are both
    /// accepted.  Call [`validate`](Self::validate) before trusting queries.
    pub fn new(exterior: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        let mut rings = Vec::with_capacity(1 + holes.len());
        rings.push(open_ring(exterior));
        rings.extend(holes.into_iter().map(open_ring));
        Self { rings }
    }

    /// Axis-aligned rectangle `[x0, x1] × [y0, y1]`, counter-clockwise.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(
            vec![Point::new(x0, y0), Point::new(x1, y0), Point::new(x1, y1), Point::new(x0, y1)],
            vec![],
        )
    }

    #[inline]
    pub fn exterior(&self) -> &[Point] {
        &self.rings[0]
    }

    pub fn holes(&self) -> &[Vec<Point>] {
        &self.rings[1..]
    }

    #[inline]
    pub fn rings(&self) -> &[Vec<Point>] {
        &self.rings
    }

    /// All boundary edges of all rings.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.rings.iter().flat_map(|r| ring_edges(r))
    }

    /// Area of the exterior minus the holes.
    pub fn area(&self) -> f64 {
        let outer = ring_area2(self.exterior()).abs();
        let holes: f64 = self.holes().iter().map(|h| ring_area2(h).abs()).sum();
        0.5 * (outer - holes)
    }

    /// `true` if `p` is on the boundary.
    pub fn on_boundary(&self, p: Point) -> bool {
        self.edges().any(|e| e.touches(p))
    }

    /// Closed containment test (boundary counts as inside).
    pub fn contains(&self, p: Point) -> bool {
        if self.on_boundary(p) {
            return true;
        }
        self.contains_interior(p)
    }

    /// Even-odd ray cast; boundary points are unspecified.
    fn contains_interior(&self, p: Point) -> bool {
        let mut inside = false;
        for e in self.edges() {
            let (a, b) = (e.a, e.b);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
        }
        inside
    }

    /// Nearest point on the boundary to `p`.
    pub fn closest_boundary_point(&self, p: Point) -> Point {
        let mut best = self.exterior()[0];
        let mut best_d = f64::MAX;
        for e in self.edges() {
            let c = e.closest_point(p);
            let d = c.distance_2(p);
            if d < best_d {
                best_d = d;
                best = c;
            }
        }
        best
    }

    /// `true` if the closed square `[min, min + size]²` lies inside the
    /// polygon, testing only the boundary `edges` relevant to the square.
    ///
    /// `edges` must contain every polygon edge that can reach the square; the
    /// grid discretiser passes the edges pre-filtered for the coarse cell the
    /// square falls in.
    pub fn covers_square_with(
        &self,
        edges: &[Segment],
        min: Point,
        size: f64,
    ) -> GeomResult<bool> {
        if !min.is_finite() || !size.is_finite() {
            return Err(GeomError::NonFinite(0));
        }
        let max = Point::new(min.x + size, min.y + size);
        if edges.iter().any(|e| e.crosses_open_box(min, max)) {
            return Ok(false);
        }
        // No boundary passes through the open square, so the whole square is
        // on one side: its center decides.
        Ok(self.contains_interior(Point::new(min.x + 0.5 * size, min.y + 0.5 * size)))
    }

    /// [`covers_square_with`](Self::covers_square_with) against all edges.
    pub fn covers_square(&self, min: Point, size: f64) -> GeomResult<bool> {
        let edges: Vec<Segment> = self.edges().collect();
        self.covers_square_with(&edges, min, size)
    }

    /// Check the polygon is usable: finite, non-degenerate, simple rings
    /// that do not cross each other.
    pub fn validate(&self) -> GeomResult<()> {
        let mut offset = 0;
        for ring in &self.rings {
            if let Some(i) = ring.iter().position(|p| !p.is_finite()) {
                return Err(GeomError::NonFinite(offset + i));
            }
            offset += ring.len();
        }
        for (r, ring) in self.rings.iter().enumerate() {
            if ring.len() < 3 || ring_area2(ring).abs() <= EPSILON {
                return Err(GeomError::DegenerateRing(ring.len()));
            }
            let edges: Vec<Segment> = ring_edges(ring).collect();
            let n = edges.len();
            for a in 0..n {
                for b in a + 1..n {
                    let adjacent = b == a + 1 || (a == 0 && b == n - 1);
                    let bad = if adjacent {
                        edges[a].crosses(&edges[b])
                    } else {
                        edges[a].intersects(&edges[b])
                    };
                    if bad {
                        return Err(GeomError::SelfIntersection { ring: r, a, b });
                    }
                }
            }
        }
        for r1 in 0..self.rings.len() {
            for r2 in r1 + 1..self.rings.len() {
                let crossing = ring_edges(&self.rings[r1])
                    .any(|e1| ring_edges(&self.rings[r2]).any(|e2| e1.intersects(&e2)));
                if crossing {
                    return Err(GeomError::RingsIntersect(r1, r2));
                }
            }
        }
        Ok(())
    }

    /// Zero-buffer analogue: drop duplicate and spike vertices, normalise
    /// orientation (exterior CCW, holes CW), then validate the result.
    pub fn repaired(&self) -> GeomResult<Polygon> {
        let mut rings = Vec::with_capacity(self.rings.len());
        for (r, ring) in self.rings.iter().enumerate() {
            let mut clean: Vec<Point> = Vec::with_capacity(ring.len());
            for &p in ring.iter().filter(|p| p.is_finite()) {
                if clean.last().is_none_or(|q| !q.approx_eq(p)) {
                    clean.push(p);
                }
            }
            let mut clean = open_ring(clean);
            // Remove spikes and collinear vertices until stable.
            let mut changed = true;
            while changed && clean.len() >= 3 {
                changed = false;
                let n = clean.len();
                for i in 0..n {
                    let prev = clean[(i + n - 1) % n];
                    let next = clean[(i + 1) % n];
                    if cross(prev, clean[i], next).abs() <= EPSILON {
                        clean.remove(i);
                        changed = true;
                        break;
                    }
                }
            }
            let ccw = ring_area2(&clean) > 0.0;
            if (r == 0) != ccw {
                clean.reverse();
            }
            rings.push(clean);
        }
        let fixed = Polygon { rings };
        fixed.validate()?;
        Ok(fixed)
    }

    /// `true` if the exterior ring winds counter-clockwise.
    pub fn is_ccw(&self) -> bool {
        ring_area2(self.exterior()) > 0.0
    }
}
