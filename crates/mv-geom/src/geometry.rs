//! The closed set of geometry kinds the engine understands.

use mv_core::{Point, ShapeId};

use crate::{LineString, Polygon};

/// Tagged geometry variant.  Anything that dispatches on geometry kind does
/// so with a single exhaustive `match` on this enum.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    MultiLineString(Vec<LineString>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    /// Closed point-in-geometry test.  Lines use a fixed tolerance.
    pub fn intersects_point(&self, p: Point) -> bool {
        match self {
            Geometry::Point(q) => q.approx_eq(p),
            Geometry::LineString(l) => l.passes_near(p, 1e-7),
            Geometry::MultiLineString(ls) => ls.iter().any(|l| l.passes_near(p, 1e-7)),
            Geometry::Polygon(poly) => poly.contains(p),
            Geometry::MultiPolygon(ps) => ps.iter().any(|poly| poly.contains(p)),
        }
    }

    /// Nearest point of the geometry to `p` (boundary for polygons that do not
    /// contain `p`).
    pub fn closest_point(&self, p: Point) -> Point {
        let nearest = |cands: &mut dyn Iterator<Item = Point>| {
            cands
                .min_by(|a, b| a.distance_2(p).total_cmp(&b.distance_2(p)))
                .unwrap_or(p)
        };
        match self {
            Geometry::Point(q) => *q,
            Geometry::LineString(l) => l.closest_point(p),
            Geometry::MultiLineString(ls) => nearest(&mut ls.iter().map(|l| l.closest_point(p))),
            Geometry::Polygon(poly) if poly.contains(p) => p,
            Geometry::Polygon(poly) => poly.closest_boundary_point(p),
            Geometry::MultiPolygon(ps) => nearest(&mut ps.iter().map(|poly| {
                if poly.contains(p) { p } else { poly.closest_boundary_point(p) }
            })),
        }
    }

    /// Short kind label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_)           => "point",
            Geometry::LineString(_)      => "line_string",
            Geometry::MultiLineString(_) => "multi_line_string",
            Geometry::Polygon(_)         => "polygon",
            Geometry::MultiPolygon(_)    => "multi_polygon",
        }
    }
}

/// A geometry paired with a stable identity.
///
/// The id keys the lazily built grids and graphs derived from the geometry,
/// so two `Shape`s with equal coordinates still get separate caches.
#[derive(Clone, Debug)]
pub struct Shape {
    pub id:       ShapeId,
    pub geometry: Geometry,
}

impl Shape {
    pub fn new(geometry: Geometry) -> Self {
        Self { id: ShapeId::fresh(), geometry }
    }
}

impl From<Geometry> for Shape {
    fn from(geometry: Geometry) -> Self {
        Shape::new(geometry)
    }
}
