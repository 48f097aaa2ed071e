//! Argument structs of the movement actions.
//!
//! Every field is optional in the same way the action's keys are; `Default`
//! gives "no overrides".  Borrowed fields (`bounds`, `path`, `on`,
//! `region`) tie the struct to the call.

use mv_core::Point;
use mv_geom::Geometry;
use mv_spatial::Path;

use crate::{On, Region};

/// `wander`: random heading change, then one step.
#[derive(Clone, Debug, Default)]
pub struct WanderArgs<'a> {
    /// Distance for this call instead of the agent's speed.
    pub speed: Option<f64>,
    /// Full width of the heading perturbation, in degrees.  Defaults to the
    /// engine's configured amplitude.
    pub amplitude_deg: Option<f64>,
    /// Polygonal area the step must stay in.
    pub bounds: Option<&'a Geometry>,
}

/// `move`: one step along the current (or given) heading.
#[derive(Clone, Debug, Default)]
pub struct MoveArgs<'a> {
    pub speed:   Option<f64>,
    pub heading: Option<f64>,
    pub bounds:  Option<&'a Geometry>,
}

/// `follow`: advance along a caller-supplied path.
#[derive(Clone, Debug, Default)]
pub struct FollowArgs<'a> {
    pub speed: Option<f64>,
    pub path:  Option<&'a Path>,
}

/// `goto`: route to a target and advance along the route.
#[derive(Clone, Debug, Default)]
pub struct GotoArgs<'a> {
    pub target: Option<Point>,
    pub speed:  Option<f64>,
    pub on:     Option<&'a On>,
}

impl GotoArgs<'_> {
    /// Go to `target` on the default topology.
    pub fn to(target: Point) -> Self {
        Self { target: Some(target), ..Self::default() }
    }
}

/// `goto_inside`: move toward a target inside a governing geometry.
#[derive(Clone, Debug)]
pub struct GotoInsideArgs<'a> {
    pub target: Option<Point>,
    pub speed:  Option<f64>,
    pub region: Region<'a>,
    /// Route through a triangulation instead of a grid.  Defaults to the
    /// engine's configuration.  Polygon regions only.
    pub triangulation: Option<bool>,
    /// Grid cell side.  Defaults to the engine's configuration.  Polygon
    /// regions only.
    pub cell_size: Option<f64>,
}

impl<'a> GotoInsideArgs<'a> {
    pub fn new(target: Point, region: Region<'a>) -> Self {
        Self { target: Some(target), speed: None, region, triangulation: None, cell_size: None }
    }
}
