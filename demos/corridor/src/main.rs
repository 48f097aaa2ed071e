//! corridor — a small tour of the rust_move movement engine.
//!
//! Eight agents share a 60 × 40 environment holding an L-shaped hall and a
//! ring of streets.  Each agent exercises one movement action or governing
//! geometry for a fixed number of ticks, then everyone regroups in parallel.
//!
//! ```text
//! cargo run -p corridor                       # built-in configuration
//! cargo run -p corridor -- my_config.toml     # custom configuration
//! RUST_LOG=debug cargo run -p corridor        # per-step output
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use mv_agent::AgentStoreBuilder;
use mv_core::{AgentId, MoveConfig, MoveResult, Point};
use mv_geom::{Geometry, LineString, Polygon, Shape};
use mv_mobility::{
    FollowArgs, GotoArgs, GotoInsideArgs, MoveArgs, MovementEngine, On, Region, WanderArgs,
};
use mv_spatial::{DijkstraRouter, NetworkGraph, Path, TraveledPath};

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT: usize = 8;
const TICKS:       usize = 40;
const REGROUP:     usize = 10;
const SPEED:       f64   = 1.5;

const DEFAULT_CONFIG: &str = include_str!("../corridor.toml");

// ── World ─────────────────────────────────────────────────────────────────────

struct World {
    hall:    Shape,
    streets: Shape,
    graph:   On,
    avenue:  LineString,
    patrol:  Path,
}

fn build_world() -> Result<World> {
    let hall = Polygon::new(
        vec![
            Point::new(5.0, 5.0),
            Point::new(35.0, 5.0),
            Point::new(35.0, 15.0),
            Point::new(15.0, 15.0),
            Point::new(15.0, 35.0),
            Point::new(5.0, 35.0),
        ],
        vec![],
    );
    hall.validate().context("hall polygon")?;

    let ring = vec![
        LineString::new(vec![Point::new(40.0, 5.0), Point::new(55.0, 5.0)])?,
        LineString::new(vec![Point::new(55.0, 5.0), Point::new(55.0, 35.0)])?,
        LineString::new(vec![Point::new(55.0, 35.0), Point::new(40.0, 35.0)])?,
    ];
    let graph = On::Graph(Arc::new(NetworkGraph::from_lines(&ring, false)));
    let avenue = ring[0].clone();
    let patrol = Path::along(LineString::new(vec![
        Point::new(6.0, 6.0),
        Point::new(34.0, 6.0),
        Point::new(34.0, 14.0),
        Point::new(6.0, 14.0),
    ])?);

    Ok(World {
        hall: Shape::new(Geometry::Polygon(hall)),
        streets: Shape::new(Geometry::MultiLineString(ring)),
        graph,
        avenue,
        patrol,
    })
}

fn starts() -> [Point; AGENT_COUNT] {
    [
        Point::new(10.0, 10.0), // 0: wanders inside the hall
        Point::new(6.0, 6.0),   // 1: hall, grid routing
        Point::new(33.0, 6.0),  // 2: hall, triangulated routing
        Point::new(40.0, 5.0),  // 3: directed streets
        Point::new(40.0, 35.0), // 4: undirected street graph
        Point::new(6.0, 6.0),   // 5: follows the patrol path
        Point::new(6.0, 20.0),  // 6: walks east, bounded by the hall
        Point::new(41.0, 5.0),  // 7: stays on the avenue
    ]
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config() -> Result<MoveConfig> {
    let config = match std::env::args().nth(1) {
        Some(path) => MoveConfig::from_file(&path).with_context(|| format!("loading {path}"))?,
        None => MoveConfig::from_toml_str(DEFAULT_CONFIG)?,
    };
    Ok(config)
}

fn report(agent: AgentId, outcome: MoveResult<Option<TraveledPath>>) {
    match outcome {
        Ok(Some(walked)) => debug!(%agent, length = walked.length(), end = ?walked.end(), "moved"),
        Ok(None) => debug!(%agent, "did not move"),
        Err(e) => warn!(%agent, error = %e, "action aborted"),
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let config = load_config()?;
    info!(?config, "configuration loaded");

    let world = build_world()?;
    let engine = MovementEngine::new(DijkstraRouter, config.clone())?;
    let (mut store, mut rngs) = AgentStoreBuilder::new(AGENT_COUNT, config.seed)
        .speed(SPEED)
        .place(starts())
        .build();

    let hall = Region::of(&world.hall).context("hall has no inside")?;
    let streets = Region::of(&world.streets).context("streets have no inside")?;
    let bounds = world.hall.geometry.clone();

    info!(agents = AGENT_COUNT, ticks = TICKS, "touring");
    for _tick in 0..TICKS {
        for i in 0..AGENT_COUNT as u32 {
            let id = AgentId(i);
            let Some(mut agent) = store.agent_mut(id) else { continue };
            let outcome = match i {
                0 => engine.wander(
                    &mut agent,
                    rngs.get_mut(id),
                    &WanderArgs { bounds: Some(&bounds), ..WanderArgs::default() },
                ),
                1 => engine.goto_inside(&mut agent, &GotoInsideArgs::new(Point::new(8.0, 33.0), hall)),
                2 => engine.goto_inside(
                    &mut agent,
                    &GotoInsideArgs { triangulation: Some(true), ..GotoInsideArgs::new(Point::new(6.0, 33.0), hall) },
                ),
                3 => engine.goto_inside(&mut agent, &GotoInsideArgs::new(Point::new(40.0, 35.0), streets)),
                4 => engine.goto(
                    &mut agent,
                    &GotoArgs { target: Some(Point::new(55.0, 5.0)), on: Some(&world.graph), ..GotoArgs::default() },
                ),
                5 => engine.follow(&mut agent, &FollowArgs { path: Some(&world.patrol), ..FollowArgs::default() }),
                6 => engine.move_forward(&mut agent, &MoveArgs { bounds: Some(&bounds), ..MoveArgs::default() }),
                _ => engine.goto_inside(
                    &mut agent,
                    &GotoInsideArgs::new(Point::new(52.0, 5.0), Region::LineString(&world.avenue)),
                ),
            };
            report(id, outcome);
        }
    }

    for id in store.agent_ids() {
        let i = id.index();
        info!(agent = %id, location = %store.location[i], status = store.status[i].as_str(), "after tour");
    }

    // Everyone walks to the middle of the map in open space.
    let meeting: Vec<Point> = (0..AGENT_COUNT)
        .map(|i| Point::new(30.0 + i as f64, 20.0))
        .collect();
    for _ in 0..REGROUP {
        for (i, outcome) in engine.goto_all(&mut store, &meeting, None).into_iter().enumerate() {
            report(AgentId(i as u32), outcome);
        }
    }

    let arrived = store
        .location
        .iter()
        .zip(&meeting)
        .filter(|(p, m)| p.approx_eq(**m))
        .count();
    info!(arrived, of = AGENT_COUNT, grids_and_graphs = engine.cache().len(), "regrouped");
    Ok(())
}
