//! Per-agent progress along a shared [`Path`].

use mv_core::{PathId, Point};

use crate::Path;

/// Resumable position on one path: the edge being walked and the index of
/// the next vertex to reach on that edge.
///
/// A cursor is owned by an agent, never by the path, and is only meaningful
/// for the path whose id it records.  Within one uninterrupted traversal
/// `(edge, vertex)` never decreases.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathCursor {
    pub path:   PathId,
    pub edge:   usize,
    pub vertex: usize,
}

impl PathCursor {
    /// Cursor at the first vertex after the start of `path`.
    pub fn start(path: &Path) -> Self {
        Self { path: path.id, edge: 0, vertex: 1 }
    }

    /// First-visit cursor for an agent standing at `location`: the nearest
    /// edge and, on that edge, the segment nearest to `location` projected
    /// onto the edge.  Also returns that projection, where the walk starts.
    ///
    /// `path` must have at least one edge.
    pub fn seed(path: &Path, location: Point) -> (Self, Point) {
        let mut edge = 0;
        let mut best = f64::MAX;
        for (i, e) in path.edges.iter().enumerate() {
            let d = e.line.distance(location);
            if d < best {
                best = d;
                edge = i;
            }
        }
        let Some(e) = path.edges.get(edge) else {
            return (Self::start(path), location);
        };
        let projected = Point { z: location.z, ..e.line.closest_point(location) };
        let vertex = e.line.nearest_segment(projected) + 1;
        (Self { path: path.id, edge, vertex }, projected)
    }

    /// `true` if this cursor was issued for `path`.
    #[inline]
    pub fn is_for(&self, path: &Path) -> bool {
        self.path == path.id
    }

    /// `true` once every edge of `path` has been consumed.
    #[inline]
    pub fn is_exhausted(&self, path: &Path) -> bool {
        self.edge >= path.edges.len()
    }
}
