//! The movement engine: wander / move / follow / goto / goto_inside.

use std::sync::Arc;

use mv_agent::AgentMut;
#[cfg(feature = "parallel")]
use mv_agent::AgentStore;
use mv_core::{AgentRng, MoveConfig, MoveError, MoveResult, Point, ShapeId, Status, normalize_heading};
use mv_geom::{Geometry, Polygon, project_into_reach};
use mv_spatial::{Extent, Path, PathOwner, Router, TraveledPath, Walk, follow, follow_path, network};

use crate::cache::{GeometryCache, with_repair};
use crate::select::{resolve_heading, resolve_speed, resolve_target, select_topology};
use crate::topology::{ContinuousTopology, Topology};
use crate::{FollowArgs, GotoArgs, GotoInsideArgs, MoveArgs, Region, WanderArgs};

/// Runs movement actions for agents against a default topology.
///
/// # Type parameter
///
/// `R` is the shortest-path algorithm used by every routing topology and
/// pathfinder (e.g. [`mv_spatial::DijkstraRouter`]).
///
/// # Outcomes
///
/// Each action writes the agent's [`Status`] and returns the walked
/// [`TraveledPath`] on success, `Ok(None)` on a recoverable failure (the
/// agent stays where it was), or `Err` on a geometry fault that survived
/// repair.
pub struct MovementEngine<R: Router> {
    pub router: R,
    pub config: MoveConfig,
    topology:   Arc<dyn Topology>,
    cache:      GeometryCache,
    #[cfg(feature = "parallel")]
    pool:       Option<rayon::ThreadPool>,
}

impl<R: Router> MovementEngine<R> {
    /// Engine over open continuous space sized by `config`.
    pub fn new(router: R, config: MoveConfig) -> MoveResult<Self> {
        let extent = Extent::new(config.env_width, config.env_height);
        Self::with_topology(router, config, Arc::new(ContinuousTopology::new(extent)))
    }

    /// Engine whose agents move on `topology` unless a call says otherwise.
    pub fn with_topology(router: R, config: MoveConfig, topology: Arc<dyn Topology>) -> MoveResult<Self> {
        config.validate()?;
        #[cfg(feature = "parallel")]
        let pool = build_pool(config.parallel_threads);
        Ok(Self {
            router,
            config,
            topology,
            cache: GeometryCache::new(),
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn topology(&self) -> &Arc<dyn Topology> {
        &self.topology
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.config.env_width, self.config.env_height)
    }

    /// Where the agent would end up with its current speed and heading,
    /// without clamping into the environment.
    pub fn destination(&self, agent: &AgentMut<'_>) -> Option<Point> {
        self.topology.destination(*agent.location, *agent.heading, agent.speed, false)
    }

    // ── Free movement ─────────────────────────────────────────────────────

    /// Turn by a random offset within `±amplitude/2` and take one step.
    ///
    /// When the topology has no destination along the new heading, the
    /// agent is turned around (`heading - 180`) and the call fails.  The
    /// reversed heading is kept; callers that wander on every tick therefore
    /// walk back the way they came.  This may not be intended.
    pub fn wander(
        &self,
        agent: &mut AgentMut<'_>,
        rng:   &mut AgentRng,
        args:  &WanderArgs<'_>,
    ) -> MoveResult<Option<TraveledPath>> {
        let amplitude = args.amplitude_deg.unwrap_or(self.config.default_amplitude_deg);
        let heading = normalize_heading(*agent.heading + rng.heading_offset(amplitude));
        let distance = resolve_speed(args.speed, agent.speed);
        let outcome = self.step(agent, heading, distance, args.bounds);
        self.settle(agent, "wander", false, outcome)
    }

    /// Take one step along the given heading, or the current one.
    ///
    /// Fails the same way as [`wander`](Self::wander), reversed heading
    /// included.
    pub fn move_forward(&self, agent: &mut AgentMut<'_>, args: &MoveArgs<'_>) -> MoveResult<Option<TraveledPath>> {
        let heading = normalize_heading(resolve_heading(args.heading, *agent.heading));
        let distance = resolve_speed(args.speed, agent.speed);
        let outcome = self.step(agent, heading, distance, args.bounds);
        self.settle(agent, "move", false, outcome)
    }

    fn step(
        &self,
        agent:    &mut AgentMut<'_>,
        heading:  f64,
        distance: f64,
        bounds:   Option<&Geometry>,
    ) -> MoveResult<Walk> {
        *agent.heading = heading;
        let from = *agent.location;
        let Some(raw) = self.topology.destination(from, heading, distance, true) else {
            *agent.heading = normalize_heading(heading - 180.0);
            return Err(MoveError::Unreachable);
        };
        let to = match bounds {
            None => raw,
            Some(geometry) => keep_within(geometry, from, distance, raw)?,
        };
        Ok(hop(from, to, distance))
    }

    // ── Path following ────────────────────────────────────────────────────

    /// Advance along a caller-supplied path, resuming where the agent's
    /// cursor left off.
    pub fn follow(&self, agent: &mut AgentMut<'_>, args: &FollowArgs<'_>) -> MoveResult<Option<TraveledPath>> {
        let outcome = self.follow_walk(agent, args);
        self.settle(agent, "follow", true, outcome)
    }

    fn follow_walk(&self, agent: &mut AgentMut<'_>, args: &FollowArgs<'_>) -> MoveResult<Walk> {
        let path = args
            .path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| MoveError::InvalidArgument("`path` is missing or has no edges".into()))?;
        let budget = resolve_speed(args.speed, agent.speed);
        let (walk, cursor) =
            follow_path(path, agent.cursor_for(path), *agent.location, budget, self.extent())
                .ok_or(MoveError::Unreachable)?;
        *agent.cursor = Some(cursor);
        Ok(walk)
    }

    /// Route to `target` on the selected topology and advance along the
    /// route.  The route is cached on the agent and reused by later calls
    /// with the same topology and target.
    pub fn goto(&self, agent: &mut AgentMut<'_>, args: &GotoArgs<'_>) -> MoveResult<Option<TraveledPath>> {
        let outcome = self.goto_walk(agent, args);
        self.settle(agent, "goto", true, outcome)
    }

    fn goto_walk(&self, agent: &mut AgentMut<'_>, args: &GotoArgs<'_>) -> MoveResult<Walk> {
        let target = resolve_target(args.target)?;
        let topology = select_topology(&self.topology, args.on, &self.cache, self.extent())
            .ok_or_else(|| MoveError::InvalidArgument("`on` cannot act as a topology".into()))?;
        let source = *agent.location;
        let budget = resolve_speed(args.speed, agent.speed);
        if source.approx_eq(target) {
            return Ok(Walk::stay(source, budget));
        }

        let owner = PathOwner::Topology(topology.id());
        let path = self.route(agent, owner, target, || topology.path_between(&self.router, source, target))?;
        if path.is_empty() {
            return Ok(follow::straight(source, target, budget));
        }
        let (walk, cursor) =
            follow_path(&path, agent.cursor_for(&path), source, budget, self.extent())
                .ok_or(MoveError::Unreachable)?;
        *agent.cursor = Some(cursor);
        Ok(walk)
    }

    // ── Movement inside a governing geometry ──────────────────────────────

    /// Move toward a target lying inside `args.region`, using the
    /// pathfinder that matches the region's kind.
    pub fn goto_inside(&self, agent: &mut AgentMut<'_>, args: &GotoInsideArgs<'_>) -> MoveResult<Option<TraveledPath>> {
        let outcome = self.inside_walk(agent, args);
        self.settle(agent, "goto_inside", true, outcome)
    }

    fn inside_walk(&self, agent: &mut AgentMut<'_>, args: &GotoInsideArgs<'_>) -> MoveResult<Walk> {
        let target = resolve_target(args.target)?;
        let source = *agent.location;
        let budget = resolve_speed(args.speed, agent.speed);
        if source.approx_eq(target) {
            return Ok(Walk::stay(source, budget));
        }
        let extent = self.extent();

        match args.region {
            Region::Graph(graph) => {
                let owner = PathOwner::Topology(self.cache.graph_topology(graph, extent).id());
                let path = self.route(agent, owner, target, || {
                    Ok(graph.path_between(&self.router, source, target)?.owned_by(owner))
                })?;
                self.network_walk(agent, &path, source, target, budget)
            }
            Region::MultiLineString(id, lines) => {
                let net = self.cache.network(id, lines);
                let owner = PathOwner::Shape(id);
                let path = self.route(agent, owner, target, || {
                    Ok(net.path_between(&self.router, source, target)?.owned_by(owner))
                })?;
                self.network_walk(agent, &path, source, target, budget)
            }
            Region::LineString(line) => {
                let tolerance = budget / 1000.0;
                if !(line.passes_near(source, tolerance) && line.passes_near(target, tolerance)) {
                    return Err(MoveError::Unreachable);
                }
                Ok(follow::advance(line.coords(), source, target, budget, extent))
            }
            Region::Grid(grid) => Ok(hop(source, grid.next_location(source, target, budget)?, budget)),
            Region::Polygon(id, polygon) => {
                self.polygon_walk(agent, id, std::slice::from_ref(polygon), args, source, target, budget)
            }
            Region::MultiPolygon(id, polygons) => {
                self.polygon_walk(agent, id, polygons, args, source, target, budget)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn polygon_walk(
        &self,
        agent:    &mut AgentMut<'_>,
        id:       ShapeId,
        polygons: &[Polygon],
        args:     &GotoInsideArgs<'_>,
        source:   Point,
        target:   Point,
        budget:   f64,
    ) -> MoveResult<Walk> {
        let Some((part, polygon)) =
            polygons.iter().enumerate().find(|(_, p)| p.contains(source) && p.contains(target))
        else {
            return Err(MoveError::Unreachable);
        };

        if args.triangulation.unwrap_or(self.config.triangulation) {
            let corridor = self.cache.corridor(id, part, polygon)?;
            let owner = PathOwner::Shape(id);
            let path = self.route(agent, owner, target, || {
                Ok(corridor.path_between(&self.router, source, target)?.owned_by(owner))
            })?;
            let (walk, cursor) =
                corridor.advance(&path, agent.cursor_for(&path), source, target, budget, self.extent());
            *agent.cursor = Some(cursor);
            return Ok(walk);
        }

        let cell_size = args.cell_size.unwrap_or(self.config.grid_cell_size);
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(MoveError::InvalidArgument(format!("cell size {cell_size} must be positive")));
        }
        let grid = self.cache.grid(id, part, polygon, cell_size, self.config.coarse_factor, self.extent());
        Ok(hop(source, grid.next_location(source, target, budget)?, budget))
    }

    fn network_walk(
        &self,
        agent:  &mut AgentMut<'_>,
        path:   &Path,
        source: Point,
        target: Point,
        budget: f64,
    ) -> MoveResult<Walk> {
        let (walk, cursor) = network::advance(path, agent.cursor_for(path), source, target, budget, self.extent())
            .ok_or(MoveError::Unreachable)?;
        *agent.cursor = Some(cursor);
        Ok(walk)
    }

    // ── Shared plumbing ───────────────────────────────────────────────────

    /// The agent's cached path if it still serves `owner` and `target` and
    /// has edges left to walk; otherwise a freshly built one, cached.
    fn route(
        &self,
        agent:  &mut AgentMut<'_>,
        owner:  PathOwner,
        target: Point,
        build:  impl FnOnce() -> MoveResult<Path>,
    ) -> MoveResult<Arc<Path>> {
        if let Some(path) = reusable(agent, owner, target) {
            return Ok(path);
        }
        let path = Arc::new(build()?);
        tracing::debug!(agent = %agent.id, ?owner, edges = path.edges.len(), "path computed");
        agent.cache_path(Arc::clone(&path));
        Ok(path)
    }

    /// Apply the outcome of one action to the agent.  With `steer`, the
    /// agent also turns to face along the last leg it walked.
    fn settle(
        &self,
        agent:   &mut AgentMut<'_>,
        action:  &'static str,
        steer:   bool,
        outcome: MoveResult<Walk>,
    ) -> MoveResult<Option<TraveledPath>> {
        match outcome {
            Ok(walk) => {
                if steer {
                    face_along(agent.heading, &walk.trail);
                }
                *agent.location = walk.location;
                *agent.status = Status::Success;
                Ok(Some(TraveledPath::from_walk(&walk)))
            }
            Err(e) if e.is_fatal() => {
                *agent.status = Status::Failure;
                Err(e)
            }
            Err(e) => {
                tracing::trace!(agent = %agent.id, action, error = %e, "movement failed");
                *agent.status = Status::Failure;
                Ok(None)
            }
        }
    }
}

#[cfg(feature = "parallel")]
impl<R: Router> MovementEngine<R> {
    /// `goto` for many agents at once: agent `i` heads for `targets[i]` on
    /// the default topology.  Agents without a target are left untouched.
    ///
    /// Runs on the engine's own pool when `parallel_threads` is configured,
    /// otherwise on Rayon's global pool.
    pub fn goto_all(
        &self,
        store:   &mut AgentStore,
        targets: &[Point],
        speed:   Option<f64>,
    ) -> Vec<MoveResult<Option<TraveledPath>>> {
        use rayon::prelude::*;

        let mut run = || -> Vec<MoveResult<Option<TraveledPath>>> {
            store
                .par_views_mut()
                .zip(targets.par_iter())
                .map(|(mut agent, &target)| {
                    let args = GotoArgs { target: Some(target), speed, on: None };
                    self.goto(&mut agent, &args)
                })
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

#[cfg(feature = "parallel")]
fn build_pool(threads: Option<usize>) -> Option<rayon::ThreadPool> {
    let n = threads?;
    match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!(error = %e, threads = n, "falling back to the global thread pool");
            None
        }
    }
}

fn reusable(agent: &AgentMut<'_>, owner: PathOwner, target: Point) -> Option<Arc<Path>> {
    let path = agent.current_path.as_ref()?;
    let spent = agent.cursor_for(path).is_some_and(|c| c.is_exhausted(path));
    (path.serves(owner, target) && !spent).then(|| Arc::clone(path))
}

/// A direct jump from `from` to `to` paid out of `budget`.
fn hop(from: Point, to: Point, budget: f64) -> Walk {
    Walk::new(to, (budget - from.distance(to)).max(0.0), vec![from, to])
}

fn face_along(heading: &mut f64, trail: &[Point]) {
    if let Some(leg) = trail.windows(2).rev().find(|w| !w[0].approx_eq(w[1])) {
        *heading = leg[0].heading_to(leg[1]);
    }
}

/// Nearest point to `raw` within `radius` of `center` and inside the
/// polygonal `bounds`.  With no such point the agent stays at `center`.
fn keep_within(bounds: &Geometry, center: Point, radius: f64, raw: Point) -> MoveResult<Point> {
    let polygons: &[Polygon] = match bounds {
        Geometry::Polygon(p) => std::slice::from_ref(p),
        Geometry::MultiPolygon(ps) => ps,
        other => {
            return Err(MoveError::InvalidArgument(format!("`bounds` must be polygonal, not a {}", other.kind())));
        }
    };
    let mut best: Option<Point> = None;
    for polygon in polygons {
        let candidate = with_repair(polygon, "bounds projection", |p| {
            Ok(project_into_reach(p, center, radius, raw)?)
        })?;
        if let Some(c) = candidate {
            if best.is_none_or(|b| c.distance_2(raw) < b.distance_2(raw)) {
                best = Some(c);
            }
        }
    }
    Ok(best.unwrap_or(center))
}
