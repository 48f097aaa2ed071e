//! Core agent storage: `AgentStore` (SoA data), `AgentMut` (one agent's
//! split-borrowed view) and `AgentRngs` (per-agent RNG).
//!
//! # RNG columns
//!
//! Wandering needs `&mut AgentRng` for one agent while the engine holds a
//! mutable view into that agent's store columns.  Keeping RNGs outside
//! `AgentStore` lets both borrows coexist:
//!
//! ```ignore
//! let mut agent = store.agent_mut(id)?;
//! engine.wander(&mut agent, rngs.get_mut(id), &WanderArgs::default())?;
//! ```

use std::sync::Arc;

use mv_core::{AgentId, AgentRng, Point, Status};
use mv_spatial::{Path, PathCursor};

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, separated from [`AgentStore`].
pub struct AgentRngs {
    pub inner: Vec<AgentRng>,
}

impl AgentRngs {
    /// Allocate and seed `count` per-agent RNGs from `global_seed`.
    pub(crate) fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| AgentRng::new(global_seed, AgentId(i)))
            .collect();
        Self { inner }
    }

    /// Mutable reference to one agent's RNG.
    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.inner[agent.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for every agent's movement state.
///
/// Every `Vec` field has exactly `count` elements; the `AgentId` value is the
/// index into all of them.
pub struct AgentStore {
    /// Number of agents.  Equals the length of every SoA `Vec`.
    pub count: usize,

    /// Current location.
    pub location: Vec<Point>,

    /// Heading in degrees, counter-clockwise from the +x axis.
    pub heading: Vec<f64>,

    /// Persisted speed: the distance covered per movement call unless the
    /// call overrides it.
    pub speed: Vec<f64>,

    /// Path cached by the last `goto`, shared read-only with any other
    /// agent that cached the same path.
    pub current_path: Vec<Option<Arc<Path>>>,

    /// Progress on `current_path` (or on the last followed path).
    pub cursor: Vec<Option<PathCursor>>,

    /// Outcome of the most recent movement call.
    pub status: Vec<Status>,
}

impl AgentStore {
    /// `true` if there are no agents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// Mutable view of one agent, or `None` if `agent` is out of range.
    pub fn agent_mut(&mut self, agent: AgentId) -> Option<AgentMut<'_>> {
        let i = agent.index();
        if i >= self.count {
            return None;
        }
        Some(AgentMut {
            id:           agent,
            location:     &mut self.location[i],
            heading:      &mut self.heading[i],
            speed:        self.speed[i],
            current_path: &mut self.current_path[i],
            cursor:       &mut self.cursor[i],
            status:       &mut self.status[i],
        })
    }

    /// Mutable views of every agent, in ascending `AgentId` order.
    pub fn views_mut(&mut self) -> impl Iterator<Item = AgentMut<'_>> {
        self.location
            .iter_mut()
            .zip(self.heading.iter_mut())
            .zip(self.speed.iter())
            .zip(self.current_path.iter_mut())
            .zip(self.cursor.iter_mut())
            .zip(self.status.iter_mut())
            .enumerate()
            .map(|(i, (((((location, heading), speed), current_path), cursor), status))| AgentMut {
                id: AgentId(i as u32),
                location,
                heading,
                speed: *speed,
                current_path,
                cursor,
                status,
            })
    }

    /// Parallel counterpart of [`views_mut`](Self::views_mut).
    #[cfg(feature = "parallel")]
    pub fn par_views_mut(&mut self) -> impl rayon::iter::IndexedParallelIterator<Item = AgentMut<'_>> {
        use rayon::prelude::*;
        (
            self.location.par_iter_mut(),
            self.heading.par_iter_mut(),
            self.speed.par_iter(),
            self.current_path.par_iter_mut(),
            self.cursor.par_iter_mut(),
            self.status.par_iter_mut(),
        )
            .into_par_iter()
            .enumerate()
            .map(|(i, (location, heading, speed, current_path, cursor, status))| AgentMut {
                id: AgentId(i as u32),
                location,
                heading,
                speed: *speed,
                current_path,
                cursor,
                status,
            })
    }

    // ── Package-private constructor used by AgentStoreBuilder ─────────────

    pub(crate) fn new(count: usize, location: Vec<Point>, heading: f64, speed: f64) -> Self {
        Self {
            count,
            location,
            heading: vec![heading; count],
            speed: vec![speed; count],
            current_path: vec![None; count],
            cursor: vec![None; count],
            status: vec![Status::Idle; count],
        }
    }
}

// ── AgentMut ──────────────────────────────────────────────────────────────────

/// Split borrow of one agent's columns in an [`AgentStore`].
///
/// This is what movement actions operate on: it exposes exactly the state
/// an action may read or write, and two views never alias.
pub struct AgentMut<'a> {
    pub id:           AgentId,
    pub location:     &'a mut Point,
    pub heading:      &'a mut f64,
    pub speed:        f64,
    pub current_path: &'a mut Option<Arc<Path>>,
    pub cursor:       &'a mut Option<PathCursor>,
    pub status:       &'a mut Status,
}

impl AgentMut<'_> {
    /// Cache `path` as the agent's current path.
    ///
    /// The cursor is kept only if it already belongs to `path`.
    pub fn cache_path(&mut self, path: Arc<Path>) {
        if !self.cursor.is_some_and(|c| c.is_for(&path)) {
            *self.cursor = None;
        }
        *self.current_path = Some(path);
    }

    /// Cursor for `path`, if the stored cursor belongs to it.
    pub fn cursor_for(&self, path: &Path) -> Option<PathCursor> {
        self.cursor.filter(|c| c.is_for(path))
    }
}
