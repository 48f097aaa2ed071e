//! Keeping a free move inside a bounding polygon.
//!
//! `wander` and `move` compute a raw destination and, when the agent is
//! bounded, replace it with the nearest point of
//! `disk(location, distance) ∩ bounds`.  The nearest point of that region to
//! a point outside it lies on its boundary, which is made of polygon edges
//! clipped to the disk and circle arcs inside the polygon; both families are
//! enumerated as candidates.

use mv_core::Point;

use crate::{GeomResult, Polygon};

/// Nearest point to `raw` in `disk(center, radius) ∩ bounds`.
///
/// Returns `Ok(None)` when the intersection is empty.  Returns `Err` when
/// `bounds` is not a valid polygon; callers retry once with
/// [`Polygon::repaired`].
pub fn project_into_reach(
    bounds: &Polygon,
    center: Point,
    radius: f64,
    raw:    Point,
) -> GeomResult<Option<Point>> {
    bounds.validate()?;

    let radius = radius.max(0.0);
    let in_disk = |p: Point| p.distance(center) <= radius + 1e-9;

    if in_disk(raw) && bounds.contains(raw) {
        return Ok(Some(raw));
    }

    let mut best: Option<Point> = None;
    let mut consider = |p: Point| {
        let closer = best.is_none_or(|b| p.distance_2(raw) < b.distance_2(raw));
        if closer {
            best = Some(Point { z: raw.z, ..p });
        }
    };

    // Polygon boundary pieces inside the disk.
    for edge in bounds.edges() {
        if let Some(piece) = edge.clip_to_disk(center, radius) {
            consider(piece.closest_point(raw));
        }
    }

    // Circle arcs inside the polygon: the arc point nearest `raw` is its
    // radial projection; arc endpoints are already covered by the clipped
    // edges above.
    let d = raw.distance(center);
    if d > 1e-12 {
        let on_circle = center.lerp(raw, radius / d);
        if bounds.contains(on_circle) {
            consider(on_circle);
        }
    }

    // Degenerate disk: only the center itself can remain.
    if radius <= 1e-12 && bounds.contains(center) {
        consider(center);
    }

    Ok(best)
}
