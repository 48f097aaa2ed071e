//! Straight segments and the low-level predicates everything else is built on.

use mv_core::Point;
use mv_core::point::EPSILON;

/// A directed straight segment `a → b`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

/// Twice the signed area of triangle `(a, b, c)`; positive when counter-clockwise.
#[inline]
pub fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

impl Segment {
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        self.a.lerp(self.b, 0.5)
    }

    /// Parameter `t ∈ [0, 1]` of the point on the segment nearest to `p`.
    pub fn project(&self, p: Point) -> f64 {
        let dx = self.b.x - self.a.x;
        let dy = self.b.y - self.a.y;
        let len2 = dx * dx + dy * dy;
        if len2 <= EPSILON * EPSILON {
            // Degenerate segment.
            return 0.0;
        }
        (((p.x - self.a.x) * dx + (p.y - self.a.y) * dy) / len2).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn closest_point(&self, p: Point) -> Point {
        self.a.lerp(self.b, self.project(p))
    }

    /// Perpendicular (or endpoint) distance from `p`.
    #[inline]
    pub fn distance(&self, p: Point) -> f64 {
        self.closest_point(p).distance(p)
    }

    /// `true` if `p` lies on the segment within tolerance.
    #[inline]
    pub fn touches(&self, p: Point) -> bool {
        self.distance(p) <= 1e-7
    }

    /// Closed intersection test, collinear overlaps included.
    pub fn intersects(&self, other: &Segment) -> bool {
        let (p, q, r, s) = (self.a, self.b, other.a, other.b);
        let d1 = cross(r, s, p);
        let d2 = cross(r, s, q);
        let d3 = cross(p, q, r);
        let d4 = cross(p, q, s);

        if ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
            && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
        {
            return true;
        }
        other.touches(p) || other.touches(q) || self.touches(r) || self.touches(s)
    }

    /// Intersection that is more than a shared endpoint: the segments cross at
    /// an interior point of at least one of them, or overlap collinearly.
    pub fn crosses(&self, other: &Segment) -> bool {
        if !self.intersects(other) {
            return false;
        }
        let shared = |p: Point| p.approx_eq(other.a) || p.approx_eq(other.b);
        match (shared(self.a), shared(self.b)) {
            (true, true) => true,
            (true, false) => {
                // Only a crossing if something other than `a` is on the other segment.
                other.touches(self.b) || self.touches_interior(other)
            }
            (false, true) => other.touches(self.a) || self.touches_interior(other),
            (false, false) => true,
        }
    }

    fn touches_interior(&self, other: &Segment) -> bool {
        [other.a, other.b].iter().any(|&p| {
            let t = self.project(p);
            t > 1e-9 && t < 1.0 - 1e-9 && self.touches(p)
        })
    }

    /// The part of this segment inside the closed disk `(center, radius)`.
    pub fn clip_to_disk(&self, center: Point, radius: f64) -> Option<Segment> {
        let dx = self.b.x - self.a.x;
        let dy = self.b.y - self.a.y;
        let fx = self.a.x - center.x;
        let fy = self.a.y - center.y;
        let a = dx * dx + dy * dy;
        let c = fx * fx + fy * fy - radius * radius;
        if a <= EPSILON * EPSILON {
            return (c <= 0.0).then_some(*self);
        }
        let b = 2.0 * (fx * dx + fy * dy);
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t0 = ((-b - sq) / (2.0 * a)).max(0.0);
        let t1 = ((-b + sq) / (2.0 * a)).min(1.0);
        if t0 > t1 {
            return None;
        }
        Some(Segment::new(self.a.lerp(self.b, t0), self.a.lerp(self.b, t1)))
    }

    /// `true` if some part of the segment passes through the *open* interior
    /// of the axis-aligned box `[min, max]`.  Segments running along the
    /// box boundary do not count.
    pub fn crosses_open_box(&self, min: Point, max: Point) -> bool {
        // Liang–Barsky clip against the closed box.
        let dx = self.b.x - self.a.x;
        let dy = self.b.y - self.a.y;
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        for (p, q) in [
            (-dx, self.a.x - min.x),
            (dx, max.x - self.a.x),
            (-dy, self.a.y - min.y),
            (dy, max.y - self.a.y),
        ] {
            if p.abs() <= f64::EPSILON {
                if q < 0.0 {
                    return false;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
            }
        }
        if t1 - t0 <= 1e-12 {
            return false;
        }
        let mid = self.a.lerp(self.b, 0.5 * (t0 + t1));
        let eps = 1e-9;
        mid.x > min.x + eps && mid.x < max.x - eps && mid.y > min.y + eps && mid.y < max.y - eps
    }
}
