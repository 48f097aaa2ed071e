//! Polylines.

use mv_core::Point;

use crate::{GeomError, GeomResult, Segment};

/// An ordered polyline of at least two coordinates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineString {
    coords: Vec<Point>,
}

impl LineString {
    /// Build a polyline, rejecting fewer than two or non-finite coordinates.
    pub fn new(coords: Vec<Point>) -> GeomResult<Self> {
        if coords.len() < 2 {
            return Err(GeomError::ShortLine(coords.len()));
        }
        if let Some(i) = coords.iter().position(|p| !p.is_finite()) {
            return Err(GeomError::NonFinite(i));
        }
        Ok(Self { coords })
    }

    /// Two-point line; used for traveled segments and straight fallbacks.
    pub fn straight(a: Point, b: Point) -> Self {
        Self { coords: vec![a, b] }
    }

    #[inline]
    pub fn coords(&self) -> &[Point] {
        &self.coords
    }

    #[inline]
    pub fn first(&self) -> Point {
        self.coords[0]
    }

    #[inline]
    pub fn last(&self) -> Point {
        self.coords[self.coords.len() - 1]
    }

    /// Consecutive coordinate pairs as segments.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.coords.windows(2).map(|w| Segment::new(w[0], w[1]))
    }

    /// Perimeter (total length).
    pub fn length(&self) -> f64 {
        self.segments().map(|s| s.length()).sum()
    }

    /// Index of the segment nearest to `p`; ties go to the first one found.
    pub fn nearest_segment(&self, p: Point) -> usize {
        let mut best = 0;
        let mut best_d = f64::MAX;
        for (i, s) in self.segments().enumerate() {
            let d = s.distance(p);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best
    }

    pub fn closest_point(&self, p: Point) -> Point {
        let i = self.nearest_segment(p);
        Segment::new(self.coords[i], self.coords[i + 1]).closest_point(p)
    }

    pub fn distance(&self, p: Point) -> f64 {
        self.closest_point(p).distance(p)
    }

    /// `true` if the line passes within `tolerance` of `p`.
    #[inline]
    pub fn passes_near(&self, p: Point, tolerance: f64) -> bool {
        self.distance(p) <= tolerance
    }

    pub fn reversed(&self) -> LineString {
        let mut coords = self.coords.clone();
        coords.reverse();
        Self { coords }
    }
}
