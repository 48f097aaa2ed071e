//! Bounded walks along polylines and paths.
//!
//! Every follower in the engine is built on [`advance`]: pick the segments
//! nearest to the source and the target, walk the vertices between them, and
//! stop when the budget runs out.  [`follow_path`] is the multi-edge,
//! cursor-driven variant used by `follow` and `goto`.
//!
//! Both functions are pure: they take a budget and return what is left of it
//! instead of mutating an accumulator.

use mv_core::{EdgeId, Point};
use mv_geom::Segment;

use crate::{Path, PathCursor};

/// Environment extent results are clamped into: `[0, width] × [0, height]`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    pub width:  f64,
    pub height: f64,
}

impl Extent {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn clamp(&self, p: Point) -> Point {
        p.clamp_to(self.width, self.height)
    }
}

/// Outcome of one bounded walk.
#[derive(Clone, Debug, PartialEq)]
pub struct Walk {
    /// Where the walker stopped.
    pub location: Point,

    /// Budget left over.  Zero unless the walk reached its target early.
    pub remaining: f64,

    /// Every point the walker stood on, the start first and `location` last.
    pub trail: Vec<Point>,

    /// Path edge each point of `trail` was reached along, index-aligned
    /// with `trail`.  The first entry is always `None`.
    pub via: Vec<Option<EdgeId>>,
}

impl Walk {
    /// A walk whose legs belong to no path edge.
    pub fn new(location: Point, remaining: f64, trail: Vec<Point>) -> Self {
        let via = vec![None; trail.len()];
        Self { location, remaining, trail, via }
    }

    /// A walk that never left `at`.
    pub fn stay(at: Point, budget: f64) -> Self {
        Self::new(at, budget, vec![at])
    }

    pub(crate) fn step(&mut self, to: Point, via: Option<EdgeId>) {
        self.trail.push(to);
        self.via.push(via);
    }

    /// Clamp the stopping point into `extent`, keeping the trail's last
    /// point in step with it.
    pub(crate) fn clamp_into(&mut self, extent: Extent) {
        self.location = extent.clamp(self.location);
        if let Some(last) = self.trail.last_mut() {
            *last = self.location;
        }
    }
}

/// Walk from `source` toward `target` along `coords`, consuming at most
/// `budget`.
///
/// The vertices strictly between the segment nearest `source` and the one
/// nearest `target` are visited in order (backwards if the target's segment
/// comes first), bracketed by the exact `source` and `target` points.  The
/// result is clamped into `extent`.
pub fn advance(coords: &[Point], source: Point, target: Point, budget: f64, extent: Extent) -> Walk {
    let budget = budget.max(0.0);
    if coords.len() < 2 || source.approx_eq(target) {
        let mut walk = Walk::new(target, budget, vec![source, target]);
        walk.clamp_into(extent);
        return walk;
    }

    let mut index_source = 0;
    let mut index_target = 0;
    let mut best_source = f64::MAX;
    let mut best_target = f64::MAX;
    for (i, w) in coords.windows(2).enumerate() {
        let seg = Segment::new(w[0], w[1]);
        let ds = seg.distance(source);
        if ds < best_source {
            best_source = ds;
            index_source = i;
        }
        let dt = seg.distance(target);
        if dt < best_target {
            best_target = dt;
            index_target = i;
        }
    }

    let mut hops: Vec<Point> = Vec::with_capacity(index_source.abs_diff(index_target) + 1);
    if index_source <= index_target {
        hops.extend_from_slice(&coords[index_source + 1..=index_target]);
    } else {
        hops.extend((index_target + 1..=index_source).rev().map(|k| coords[k]));
    }
    hops.push(target);

    let mut walk = walk_hops(source, hops, budget);
    walk.clamp_into(extent);
    walk
}

/// Consume `budget` over a sequence of straight hops starting at `from`.
fn walk_hops(from: Point, hops: impl IntoIterator<Item = Point>, budget: f64) -> Walk {
    let mut here = from;
    let mut left = budget;
    let mut trail = vec![from];
    for pt in hops {
        let d = here.distance(pt);
        if left < d {
            here = here.lerp(pt, left / d);
            trail.push(here);
            left = 0.0;
            break;
        }
        here = pt;
        trail.push(pt);
        if left > d {
            left -= d;
        } else {
            left = 0.0;
            break;
        }
    }
    Walk::new(here, left, trail)
}

/// Straight walk from `source` toward `target`.
pub fn straight(source: Point, target: Point, budget: f64) -> Walk {
    walk_hops(source, [target], budget.max(0.0))
}

/// Advance an agent at `location` along `path` by up to `budget`.
///
/// `cursor` resumes a previous traversal of the same path; any other cursor
/// (or none) starts a fresh one seeded from the nearest edge.  Distances on
/// each edge are scaled by [`PathEdge::scale`](crate::PathEdge::scale).  The
/// walk aims at the point of the last edge nearest the path's end vertex and,
/// on reaching it, snaps to the end vertex itself.
///
/// The stopping point is clamped into `extent`.  Returns `None` if no
/// segment could be walked (empty path, or a cursor that already consumed
/// every edge).
pub fn follow_path(
    path:     &Path,
    cursor:   Option<PathCursor>,
    location: Point,
    budget:   f64,
    extent:   Extent,
) -> Option<(Walk, PathCursor)> {
    let last = path.edges.last()?;
    let (mut cursor, mut here) = match cursor.filter(|c| c.is_for(path)) {
        Some(c) => (c, location),
        None => PathCursor::seed(path, location),
    };

    let goal = Point { z: path.end.z, ..last.line.closest_point(path.end) };
    let goal_vertex = last.line.nearest_segment(goal) + 1;
    let last_edge = path.edges.len() - 1;

    let mut walk = Walk::stay(location, budget.max(0.0));
    if !here.approx_eq(location) {
        walk.step(here, None);
    }
    let mut left = walk.remaining;
    let mut hops = 0usize;

    'edges: while cursor.edge < path.edges.len() {
        let edge = &path.edges[cursor.edge];
        let coords = edge.line.coords();
        let scale = edge.scale();
        while cursor.vertex < coords.len() {
            let at_goal = cursor.edge == last_edge && cursor.vertex == goal_vertex;
            let pt = if at_goal { goal } else { coords[cursor.vertex] };
            let d = scale * here.distance(pt);
            hops += 1;
            if left < d {
                here = here.lerp(pt, left / d);
                walk.step(here, edge.edge);
                left = 0.0;
                break 'edges;
            }
            here = pt;
            walk.step(pt, edge.edge);
            left = if left > d { left - d } else { 0.0 };
            if at_goal {
                cursor.edge = path.edges.len();
                cursor.vertex = 1;
                break 'edges;
            }
            if cursor.vertex + 1 < coords.len() {
                cursor.vertex += 1;
            } else {
                cursor.edge += 1;
                cursor.vertex = 1;
                if left == 0.0 {
                    break 'edges;
                }
                continue 'edges;
            }
            if left == 0.0 {
                break 'edges;
            }
        }
        cursor.edge += 1;
        cursor.vertex = 1;
    }

    if hops == 0 {
        return None;
    }
    if here.approx_eq(goal) {
        here = path.end;
        if walk.trail.last().is_none_or(|p| !p.approx_eq(here)) {
            walk.step(here, last.edge);
        }
    }
    walk.location = here;
    walk.remaining = left;
    walk.clamp_into(extent);
    Some((walk, cursor))
}
