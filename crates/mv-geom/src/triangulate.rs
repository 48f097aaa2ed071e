//! Ear-clipping triangulation.
//!
//! Holes are first merged into the exterior ring through a zero-width bridge
//! from each hole's right-most vertex to the nearest visible exterior vertex,
//! then the resulting single ring is clipped ear by ear.  O(n²) per polygon,
//! which is fine for the corridor polygons agents walk through; graphs built
//! from the triangles are cached by the caller.

use mv_core::Point;
use mv_core::point::EPSILON;

use crate::segment::cross;
use crate::{GeomError, GeomResult, Polygon, Segment};

/// A counter-clockwise triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

impl Triangle {
    pub fn centroid(&self) -> Point {
        Point::new(
            (self.a.x + self.b.x + self.c.x) / 3.0,
            (self.a.y + self.b.y + self.c.y) / 3.0,
        )
    }

    pub fn area(&self) -> f64 {
        0.5 * cross(self.a, self.b, self.c).abs()
    }

    pub fn vertices(&self) -> [Point; 3] {
        [self.a, self.b, self.c]
    }

    pub fn edges(&self) -> [Segment; 3] {
        [
            Segment::new(self.a, self.b),
            Segment::new(self.b, self.c),
            Segment::new(self.c, self.a),
        ]
    }

    /// Closed containment (edges included, with a small tolerance).
    pub fn contains(&self, p: Point) -> bool {
        let d1 = cross(self.a, self.b, p);
        let d2 = cross(self.b, self.c, p);
        let d3 = cross(self.c, self.a, p);
        let tol = 1e-9;
        (d1 >= -tol && d2 >= -tol && d3 >= -tol) || self.edges().iter().any(|e| e.touches(p))
    }

    /// Closed test used to reject ears.  A vertex on the would-be diagonal
    /// counts, so every emitted edge runs vertex to vertex.
    fn covers(&self, p: Point) -> bool {
        cross(self.a, self.b, p) >= -EPSILON
            && cross(self.b, self.c, p) >= -EPSILON
            && cross(self.c, self.a, p) >= -EPSILON
    }
}

/// Triangulate a simple polygon (holes allowed).
pub fn triangulate(polygon: &Polygon) -> GeomResult<Vec<Triangle>> {
    polygon.validate()?;

    let mut ring = polygon.exterior().to_vec();
    if !polygon.is_ccw() {
        ring.reverse();
    }

    let mut holes: Vec<Vec<Point>> = polygon
        .holes()
        .iter()
        .map(|h| {
            let mut h = h.clone();
            if signed_area2(&h) > 0.0 {
                h.reverse();
            }
            h
        })
        .collect();
    // Right-most holes first, so later bridges never have to cross earlier ones.
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));

    for k in 0..holes.len() {
        ring = bridge(polygon, &ring, &holes[k], &holes[k + 1..])?;
    }
    ear_clip(ring)
}

fn signed_area2(ring: &[Point]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (p, q) = (ring[i], ring[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum()
}

fn max_x(ring: &[Point]) -> f64 {
    ring.iter().map(|p| p.x).fold(f64::MIN, f64::max)
}

fn ring_segments(ring: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    let n = ring.len();
    (0..n).map(move |i| Segment::new(ring[i], ring[(i + 1) % n]))
}

/// Splice `hole` into `ring` through its right-most vertex.
fn bridge(
    polygon:   &Polygon,
    ring:      &[Point],
    hole:      &[Point],
    remaining: &[Vec<Point>],
) -> GeomResult<Vec<Point>> {
    let mi = (0..hole.len())
        .max_by(|&i, &j| hole[i].x.total_cmp(&hole[j].x))
        .ok_or_else(|| GeomError::Triangulation("empty hole".into()))?;
    let m = hole[mi];

    let mut candidates: Vec<usize> = (0..ring.len()).collect();
    candidates.sort_by(|&i, &j| ring[i].distance_2(m).total_cmp(&ring[j].distance_2(m)));

    let visible = |v: Point| {
        let s = Segment::new(m, v);
        let blocked = |e: Segment| {
            let incident = e.a.approx_eq(v)
                || e.b.approx_eq(v)
                || e.a.approx_eq(m)
                || e.b.approx_eq(m);
            !incident && s.intersects(&e)
        };
        polygon.contains(s.midpoint())
            && !ring_segments(ring).any(&blocked)
            && !ring_segments(hole).any(&blocked)
            && !remaining.iter().any(|h| ring_segments(h).any(&blocked))
    };

    let vi = candidates
        .into_iter()
        .find(|&i| visible(ring[i]))
        .ok_or_else(|| GeomError::Triangulation("no visible bridge vertex for hole".into()))?;

    let mut out = Vec::with_capacity(ring.len() + hole.len() + 2);
    out.extend_from_slice(&ring[..=vi]);
    out.extend_from_slice(&hole[mi..]);
    out.extend_from_slice(&hole[..=mi]);
    out.push(ring[vi]);
    out.extend_from_slice(&ring[vi + 1..]);
    Ok(out)
}

fn ear_clip(ring: Vec<Point>) -> GeomResult<Vec<Triangle>> {
    let mut idx: Vec<usize> = (0..ring.len()).collect();
    let mut out = Vec::with_capacity(ring.len().saturating_sub(2));

    while idx.len() > 3 {
        let n = idx.len();
        let mut clipped = false;
        for i in 0..n {
            let (pi, ci, ni) = (idx[(i + n - 1) % n], idx[i], idx[(i + 1) % n]);
            let (p, c, q) = (ring[pi], ring[ci], ring[ni]);
            if c.approx_eq(p) || c.approx_eq(q) || p.approx_eq(q) {
                // Zero-length corner or spike left over from a bridge seam.
                idx.remove(i);
                clipped = true;
                break;
            }
            // Collinear corners stay; a neighbouring ear absorbs them.
            if cross(p, c, q) <= EPSILON {
                continue;
            }
            let tri = Triangle { a: p, b: c, c: q };
            let swallows = idx.iter().any(|&k| {
                let v = ring[k];
                k != pi
                    && k != ci
                    && k != ni
                    && !v.approx_eq(p)
                    && !v.approx_eq(c)
                    && !v.approx_eq(q)
                    && tri.covers(v)
            });
            if !swallows {
                out.push(tri);
                idx.remove(i);
                clipped = true;
                break;
            }
        }
        if !clipped {
            return Err(GeomError::Triangulation(format!(
                "no ear found with {} vertices left",
                idx.len()
            )));
        }
    }

    if idx.len() == 3 {
        let tri = Triangle { a: ring[idx[0]], b: ring[idx[1]], c: ring[idx[2]] };
        if tri.area() > EPSILON {
            out.push(tri);
        }
    }
    Ok(out)
}
