//! Polygon discretisation and wavefront routing on a square grid.
//!
//! # Layout
//!
//! A [`Grid`] of `cols × rows` square cells of side `cell_size`, origin at
//! `(0, 0)`.  Cell `(i, j)` covers `[i·s, (i+1)·s] × [j·s, (j+1)·s]` and is
//! stored at `cells[i * rows + j]`.
//!
//! # Routing
//!
//! [`find_path`] labels cells by hop distance from the target, breadth first
//! over the von Neumann neighbourhood, and stops as soon as the source is
//! labelled.  Labels live in a vector private to the call, so a built grid
//! is read-only and can be shared by any number of agents.

use mv_core::Point;
use mv_geom::{Polygon, Segment};

use crate::{Extent, SpatialError, SpatialResult};

/// Integer grid coordinate: `i` is the column (x), `j` the row (y).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntPoint {
    pub i: usize,
    pub j: usize,
}

impl IntPoint {
    #[inline]
    pub const fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

impl std::fmt::Display for IntPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.i, self.j)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    Blocked,
    Traversable,
}

// ── Grid ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    cols:      usize,
    rows:      usize,
    cell_size: f64,
    cells:     Vec<Cell>,
}

impl Grid {
    /// Wrap a precomputed cell array (`cells[i * rows + j]`).
    ///
    /// Returns `None` if `cells` does not hold exactly `cols * rows` entries
    /// or `cell_size` is not positive.
    pub fn new(cols: usize, rows: usize, cell_size: f64, cells: Vec<Cell>) -> Option<Self> {
        (cells.len() == cols * rows && cell_size > 0.0 && cell_size.is_finite())
            .then_some(Self { cols, rows, cell_size, cells })
    }

    /// A grid with every cell traversable.
    pub fn open(cols: usize, rows: usize, cell_size: f64) -> Option<Self> {
        Self::new(cols, rows, cell_size, vec![Cell::Traversable; cols * rows])
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    fn index(&self, p: IntPoint) -> usize {
        p.i * self.rows + p.j
    }

    /// Cell at `p`; out-of-range coordinates read as blocked.
    #[inline]
    pub fn cell(&self, p: IntPoint) -> Cell {
        if p.i < self.cols && p.j < self.rows {
            self.cells[self.index(p)]
        } else {
            Cell::Blocked
        }
    }

    pub fn set(&mut self, p: IntPoint, cell: Cell) {
        if p.i < self.cols && p.j < self.rows {
            let k = self.index(p);
            self.cells[k] = cell;
        }
    }

    pub fn traversable_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Traversable).count()
    }

    /// The cell containing `p`, if it is on the grid.
    pub fn locate(&self, p: Point) -> Option<IntPoint> {
        if !(p.x >= 0.0 && p.y >= 0.0) {
            return None;
        }
        let i = (p.x / self.cell_size) as usize;
        let j = (p.y / self.cell_size) as usize;
        (i < self.cols && j < self.rows).then_some(IntPoint::new(i, j))
    }

    /// Center of cell `p`.
    #[inline]
    pub fn center(&self, p: IntPoint) -> Point {
        Point::new((p.i as f64 + 0.5) * self.cell_size, (p.j as f64 + 0.5) * self.cell_size)
    }

    /// Von Neumann neighbours of `p` in the order `i-1, j-1, i+1, j+1`.
    fn neighbours(&self, p: IntPoint) -> impl Iterator<Item = IntPoint> {
        let (cols, rows) = (self.cols, self.rows);
        [
            (p.i > 0).then(|| IntPoint::new(p.i - 1, p.j)),
            (p.j > 0).then(|| IntPoint::new(p.i, p.j - 1)),
            (p.i + 1 < cols).then(|| IntPoint::new(p.i + 1, p.j)),
            (p.j + 1 < rows).then(|| IntPoint::new(p.i, p.j + 1)),
        ]
        .into_iter()
        .flatten()
    }

    /// One call of grid-based movement: route from the cell of `source` to
    /// the cell of `target` and step `budget` along the route.
    pub fn next_location(&self, source: Point, target: Point, budget: f64) -> SpatialResult<Point> {
        let from = self.locate(source).ok_or(SpatialError::OutsideRegion(source))?;
        let to = self.locate(target).ok_or(SpatialError::OutsideRegion(target))?;
        let path = find_path(self, from, to)?;
        Ok(step_along(self, &path, budget, source, target))
    }
}

// ── Discretisation ────────────────────────────────────────────────────────────

/// `true` if the closed bounding box of `e` meets the closed box `[min, max]`.
fn bbox_overlaps(e: &Segment, min: Point, max: Point) -> bool {
    let eps = 1e-9;
    e.a.x.min(e.b.x) <= max.x + eps
        && e.a.x.max(e.b.x) >= min.x - eps
        && e.a.y.min(e.b.y) <= max.y + eps
        && e.a.y.max(e.b.y) >= min.y - eps
}

/// Rasterise `polygon` over the environment `extent`.
///
/// The grid is `(1 + ⌊w/s⌋) × (1 + ⌊h/s⌋)`.  Coverage is decided per coarse
/// block of `coarse_factor × coarse_factor` cells: blocks no polygon edge
/// reaches are classified whole, the others cell by cell against only the
/// edges that reach the block.  A cell is traversable iff its square is
/// covered by the polygon; a cell whose coverage test fails is blocked, as
/// are the cells starting at or beyond the environment edge.
///
/// `cell_size` must be positive and finite.
pub fn discretize(polygon: &Polygon, cell_size: f64, coarse_factor: usize, extent: Extent) -> Grid {
    let cols = 1 + (extent.width / cell_size) as usize;
    let rows = 1 + (extent.height / cell_size) as usize;
    let factor = coarse_factor.max(1);
    let coarse = cell_size * factor as f64;

    let edges: Vec<Segment> = polygon.edges().collect();
    let mut cells = vec![Cell::Blocked; cols * rows];
    let mut faults = 0usize;

    for ci in 0..cols.div_ceil(factor) {
        for cj in 0..rows.div_ceil(factor) {
            let min = Point::new(ci as f64 * coarse, cj as f64 * coarse);
            let max = Point::new(min.x + coarse, min.y + coarse);
            let local: Vec<Segment> =
                edges.iter().filter(|e| bbox_overlaps(e, min, max)).copied().collect();
            // No boundary inside the block: it is wholly in or wholly out.
            let uniform = local
                .is_empty()
                .then(|| polygon.contains(Point::new(min.x + 0.5 * coarse, min.y + 0.5 * coarse)));

            for i in ci * factor..((ci + 1) * factor).min(cols) {
                let x = i as f64 * cell_size;
                if x >= extent.width {
                    continue;
                }
                for j in cj * factor..((cj + 1) * factor).min(rows) {
                    let y = j as f64 * cell_size;
                    if y >= extent.height {
                        continue;
                    }
                    let covered = match uniform {
                        Some(inside) => Ok(inside),
                        None => polygon.covers_square_with(&local, Point::new(x, y), cell_size),
                    };
                    cells[i * rows + j] = match covered {
                        Ok(true) => Cell::Traversable,
                        Ok(false) => Cell::Blocked,
                        Err(_) => {
                            faults += 1;
                            Cell::Blocked
                        }
                    };
                }
            }
        }
    }

    if faults > 0 {
        tracing::warn!(faults, "coverage test failed for some cells; marked blocked");
    }
    let grid = Grid { cols, rows, cell_size, cells };
    tracing::debug!(cols, rows, traversable = grid.traversable_count(), "polygon discretised");
    grid
}

// ── Wavefront routing ─────────────────────────────────────────────────────────

/// Shortest 4-connected hop path from `source` to `target`, both inclusive.
///
/// Source and target are treated as traversable whatever their cell says.
/// Propagation runs at most `rows + cols` rounds, so a returned path never
/// has more hops than that; a longer detour yields
/// [`SpatialError::Exhausted`].
pub fn find_path(grid: &Grid, source: IntPoint, target: IntPoint) -> SpatialResult<Vec<IntPoint>> {
    for p in [source, target] {
        if p.i >= grid.cols || p.j >= grid.rows {
            return Err(SpatialError::OutsideRegion(grid.center(p)));
        }
    }
    if source == target {
        return Ok(vec![source]);
    }

    let open = |p: IntPoint| p == source || p == target || grid.cell(p) == Cell::Traversable;
    let mut label: Vec<Option<u32>> = vec![None; grid.cols * grid.rows];
    label[grid.index(target)] = Some(0);

    let bound = grid.rows + grid.cols;
    let mut frontier = vec![target];
    for round in 1..=bound {
        let mut next = Vec::new();
        for p in frontier {
            for q in grid.neighbours(p) {
                let k = grid.index(q);
                if label[k].is_none() && open(q) {
                    label[k] = Some(round as u32);
                    if q == source {
                        return reconstruct(grid, &label, source);
                    }
                    next.push(q);
                }
            }
        }
        if next.is_empty() {
            return Err(SpatialError::NoGridPath { from: source, to: target });
        }
        frontier = next;
    }
    Err(SpatialError::Exhausted { rounds: bound })
}

/// Walk from `source` down the labels to the target (label 0).
fn reconstruct(grid: &Grid, label: &[Option<u32>], source: IntPoint) -> SpatialResult<Vec<IntPoint>> {
    let mut cur = source;
    let mut level = label[grid.index(source)].unwrap_or(0);
    let mut path = Vec::with_capacity(level as usize + 1);
    path.push(cur);
    while level > 0 {
        level -= 1;
        let Some(q) = grid.neighbours(cur).find(|&q| label[grid.index(q)] == Some(level)) else {
            return Err(SpatialError::NoGridPath { from: source, to: cur });
        };
        path.push(q);
        cur = q;
    }
    Ok(path)
}

/// Point reached after spending `budget` on `path` (from [`find_path`]).
///
/// Hops this call: `⌊budget / cell_size⌋`.  Zero hops stays at `source`;
/// reaching the last cell returns the exact `target`; anything in between
/// lands on a cell center.
pub fn step_along(grid: &Grid, path: &[IntPoint], budget: f64, source: Point, target: Point) -> Point {
    if path.len() <= 1 {
        return target;
    }
    let hops = (budget.max(0.0) / grid.cell_size).floor() as usize;
    if hops == 0 {
        return source;
    }
    if hops >= path.len() - 1 {
        return target;
    }
    grid.center(path[hops])
}
