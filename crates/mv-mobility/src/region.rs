//! The governing geometry of `goto_inside`.

use std::sync::Arc;

use mv_core::ShapeId;
use mv_geom::{Geometry, LineString, Polygon, Shape};
use mv_spatial::{Grid, NetworkGraph};

/// Closed set of geometries `goto_inside` can move within.
///
/// Shape-derived variants carry the shape's id: grids, corridor graphs and
/// networks built from them are cached under it.
#[derive(Copy, Clone, Debug)]
pub enum Region<'a> {
    Polygon(ShapeId, &'a Polygon),
    MultiPolygon(ShapeId, &'a [Polygon]),
    LineString(&'a LineString),
    MultiLineString(ShapeId, &'a [LineString]),
    Graph(&'a Arc<NetworkGraph>),
    Grid(&'a Grid),
}

impl<'a> Region<'a> {
    /// View a shape as a region.  A point has no inside, so it gives `None`.
    pub fn of(shape: &'a Shape) -> Option<Self> {
        match &shape.geometry {
            Geometry::Point(_) => None,
            Geometry::LineString(l) => Some(Region::LineString(l)),
            Geometry::MultiLineString(ls) => Some(Region::MultiLineString(shape.id, ls)),
            Geometry::Polygon(p) => Some(Region::Polygon(shape.id, p)),
            Geometry::MultiPolygon(ps) => Some(Region::MultiPolygon(shape.id, ps)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Region::Polygon(..)         => "polygon",
            Region::MultiPolygon(..)    => "multi_polygon",
            Region::LineString(_)       => "line_string",
            Region::MultiLineString(..) => "multi_line_string",
            Region::Graph(_)            => "graph",
            Region::Grid(_)             => "grid",
        }
    }
}
