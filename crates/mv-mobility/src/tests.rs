//! Unit tests for mv-mobility.

use std::sync::Arc;

use mv_agent::{AgentRngs, AgentStore, AgentStoreBuilder};
use mv_core::{MoveConfig, Point};
use mv_geom::{LineString, Polygon};
use mv_spatial::{DijkstraRouter, NetworkGraph};

use crate::MovementEngine;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn assert_at(p: Point, x: f64, y: f64) {
    assert!(approx(p.x, x) && approx(p.y, y), "expected ({x}, {y}), got {p}");
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn line(coords: &[(f64, f64)]) -> LineString {
    LineString::new(coords.iter().map(|&(x, y)| pt(x, y)).collect()).unwrap()
}

/// 100 × 100 continuous space.
fn engine() -> MovementEngine<DijkstraRouter> {
    MovementEngine::new(DijkstraRouter, MoveConfig::with_env(100.0, 100.0)).unwrap()
}

/// One agent at `at` with persisted `speed`, heading 0.
fn one_agent(at: Point, speed: f64) -> (AgentStore, AgentRngs) {
    AgentStoreBuilder::new(1, 7).speed(speed).place([at]).build()
}

/// `(0,0) → (5,0) → (5,5)` as two lines.
fn two_legs() -> [LineString; 2] {
    [line(&[(0.0, 0.0), (5.0, 0.0)]), line(&[(5.0, 0.0), (5.0, 5.0)])]
}

/// L-shaped room: the 10 × 10 square minus its upper-right 6 × 6 corner.
fn l_room() -> Polygon {
    Polygon::new(
        vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 4.0), pt(4.0, 4.0), pt(4.0, 10.0), pt(0.0, 10.0)],
        vec![],
    )
}

// ── Topologies ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod topology {
    use super::*;
    use mv_spatial::{Extent, PathOwner};
    use crate::{ContinuousTopology, GraphTopology, RegionTopology, Topology};

    const EXT: Extent = Extent::new(100.0, 100.0);

    #[test]
    fn continuous_destination_clamps_on_request() {
        let t = ContinuousTopology::new(Extent::new(10.0, 10.0));
        assert_at(t.destination(pt(5.0, 5.0), 0.0, 10.0, false).unwrap(), 15.0, 5.0);
        assert_at(t.destination(pt(5.0, 5.0), 0.0, 10.0, true).unwrap(), 10.0, 5.0);
    }

    #[test]
    fn continuous_path_is_straight_and_owned() {
        let t = ContinuousTopology::new(EXT);
        let path = t.path_between(&DijkstraRouter, pt(0.0, 0.0), pt(3.0, 4.0)).unwrap();
        assert_eq!(path.edges.len(), 1);
        assert!(approx(path.length(), 5.0));
        assert_eq!(path.owner, PathOwner::Topology(t.id()));
    }

    #[test]
    fn graph_destination_takes_best_aligned_edge() {
        let lines = [line(&[(0.0, 0.0), (10.0, 0.0)]), line(&[(0.0, 0.0), (0.0, 10.0)])];
        let t = GraphTopology::new(Arc::new(NetworkGraph::from_lines(&lines, false)), EXT);
        assert_at(t.destination(pt(0.0, 0.0), 80.0, 4.0, false).unwrap(), 0.0, 4.0);
        assert_at(t.destination(pt(0.0, 0.0), 10.0, 4.0, false).unwrap(), 4.0, 0.0);
    }

    #[test]
    fn graph_distance_runs_over_the_network() {
        let t = GraphTopology::new(Arc::new(NetworkGraph::from_lines(&two_legs(), false)), EXT);
        assert!(approx(t.distance_between(pt(0.0, 0.0), pt(5.0, 5.0)).unwrap(), 10.0));
    }

    #[test]
    fn empty_graph_has_no_destination() {
        let t = GraphTopology::new(Arc::new(NetworkGraph::empty()), EXT);
        assert!(t.destination(pt(0.0, 0.0), 0.0, 1.0, false).is_none());
    }

    #[test]
    fn region_destination_stays_inside() {
        let t = RegionTopology::new(Polygon::rect(0.0, 0.0, 10.0, 10.0), EXT).unwrap();
        assert_at(t.destination(pt(5.0, 5.0), 0.0, 3.0, false).unwrap(), 8.0, 5.0);
        assert!(t.destination(pt(5.0, 5.0), 0.0, 10.0, false).is_none());
    }

    #[test]
    fn region_path_stays_in_the_room() {
        let room = l_room();
        let t = RegionTopology::new(room.clone(), EXT).unwrap();
        let path = t.path_between(&DijkstraRouter, pt(8.0, 2.0), pt(2.0, 8.0)).unwrap();
        assert_eq!(path.owner, PathOwner::Topology(t.id()));
        let coords = path.edges[0].line.coords();
        assert_at(coords[0], 8.0, 2.0);
        assert_at(*coords.last().unwrap(), 2.0, 8.0);
        assert!(coords.windows(2).all(|w| room.contains(w[0].lerp(w[1], 0.5))));
    }

    #[test]
    fn invalid_region_is_rejected() {
        let bow_tie = Polygon::new(vec![pt(0.0, 0.0), pt(10.0, 10.0), pt(10.0, 0.0), pt(0.0, 10.0)], vec![]);
        assert!(RegionTopology::new(bow_tie, EXT).is_err());
    }
}

// ── DistanceStepper / TopologySelector ────────────────────────────────────────

#[cfg(test)]
mod select {
    use super::*;
    use mv_core::MoveError;
    use mv_geom::{Geometry, Shape};
    use mv_spatial::Extent;
    use crate::{GeometryCache, Topology};
    use crate::select::{resolve_heading, resolve_speed, resolve_target};

    const EXT: Extent = Extent::new(100.0, 100.0);

    #[test]
    fn explicit_speed_wins() {
        assert_eq!(resolve_speed(Some(3.0), 1.0), 3.0);
        assert_eq!(resolve_speed(None, 1.0), 1.0);
    }

    #[test]
    fn explicit_heading_replaces() {
        assert_eq!(resolve_heading(Some(270.0), 90.0), 270.0);
        assert_eq!(resolve_heading(None, 90.0), 90.0);
    }

    #[test]
    fn target_must_be_a_location() {
        assert!(matches!(resolve_target(None), Err(MoveError::InvalidArgument(_))));
        assert!(matches!(resolve_target(Some(pt(f64::NAN, 0.0))), Err(MoveError::InvalidArgument(_))));
        assert_eq!(resolve_target(Some(pt(1.0, 2.0))).unwrap(), pt(1.0, 2.0));
    }

    #[test]
    fn point_and_multi_polygon_do_not_cast() {
        let cache = GeometryCache::new();
        let point = Shape::new(Geometry::Point(pt(1.0, 1.0)));
        let two_rooms = Shape::new(Geometry::MultiPolygon(vec![
            Polygon::rect(0.0, 0.0, 1.0, 1.0),
            Polygon::rect(2.0, 0.0, 3.0, 1.0),
        ]));
        assert!(cache.shape_topology(&point, EXT).is_none());
        assert!(cache.shape_topology(&two_rooms, EXT).is_none());
    }

    #[test]
    fn shape_cast_is_cached() {
        let cache = GeometryCache::new();
        let room = Shape::new(Geometry::Polygon(Polygon::rect(0.0, 0.0, 10.0, 10.0)));
        let a = cache.shape_topology(&room, EXT).unwrap();
        let b = cache.shape_topology(&room, EXT).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let road = Shape::new(Geometry::LineString(line(&[(0.0, 0.0), (5.0, 0.0)])));
        assert!(cache.shape_topology(&road, EXT).is_some());
    }

    #[test]
    fn graph_adapter_is_shared_per_graph() {
        let cache = GeometryCache::new();
        let graph = Arc::new(NetworkGraph::from_lines(&two_legs(), false));
        let a = cache.graph_topology(&graph, EXT);
        let b = cache.graph_topology(&graph, EXT);
        assert_eq!(a.id(), b.id());
    }
}

// ── wander / move ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod wander {
    use super::*;
    use mv_core::{AgentId, Status};
    use crate::{RegionTopology, WanderArgs};
    use mv_spatial::Extent;

    #[test]
    fn zero_amplitude_keeps_heading() {
        let (mut store, mut rngs) = AgentStoreBuilder::new(1, 7)
            .speed(5.0)
            .heading(90.0)
            .place([pt(50.0, 50.0)])
            .build();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = WanderArgs { amplitude_deg: Some(0.0), ..WanderArgs::default() };
        let walked = engine().wander(&mut agent, rngs.get_mut(AgentId(0)), &args).unwrap().unwrap();
        assert_eq!(*agent.heading, 90.0);
        assert_at(*agent.location, 50.0, 55.0);
        assert_eq!(*agent.status, Status::Success);
        assert!(approx(walked.length(), 5.0));
    }

    #[test]
    fn heading_stays_within_amplitude() {
        let (mut store, mut rngs) = AgentStoreBuilder::new(1, 3).heading(180.0).place([pt(50.0, 50.0)]).build();
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = WanderArgs { amplitude_deg: Some(20.0), ..WanderArgs::default() };
        for _ in 0..20 {
            *agent.heading = 180.0;
            e.wander(&mut agent, rngs.get_mut(AgentId(0)), &args).unwrap();
            assert!((170.0..=190.0).contains(&*agent.heading), "heading {}", agent.heading);
        }
    }

    #[test]
    fn same_seed_same_walk() {
        let e = engine();
        let run = || {
            let (mut store, mut rngs) = AgentStoreBuilder::new(1, 42).place([pt(50.0, 50.0)]).build();
            let mut agent = store.agent_mut(AgentId(0)).unwrap();
            for _ in 0..10 {
                e.wander(&mut agent, rngs.get_mut(AgentId(0)), &WanderArgs::default()).unwrap();
            }
            *agent.location
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn no_destination_reverses_heading_and_fails() {
        let room = RegionTopology::new(Polygon::rect(0.0, 0.0, 10.0, 10.0), Extent::new(100.0, 100.0)).unwrap();
        let e = MovementEngine::with_topology(DijkstraRouter, MoveConfig::with_env(100.0, 100.0), Arc::new(room))
            .unwrap();
        let (mut store, mut rngs) = one_agent(pt(5.0, 5.0), 20.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = WanderArgs { amplitude_deg: Some(0.0), ..WanderArgs::default() };
        assert!(e.wander(&mut agent, rngs.get_mut(AgentId(0)), &args).unwrap().is_none());
        assert_eq!(*agent.heading, 180.0);
        assert_eq!(*agent.status, Status::Failure);
        assert_eq!(*agent.location, pt(5.0, 5.0));
    }
}

#[cfg(test)]
mod move_forward {
    use super::*;
    use mv_core::{AgentId, MoveError, Status};
    use mv_geom::Geometry;
    use crate::MoveArgs;

    #[test]
    fn explicit_heading_and_speed() {
        let (mut store, _) = one_agent(pt(10.0, 10.0), 1.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = MoveArgs { heading: Some(180.0), speed: Some(4.0), ..MoveArgs::default() };
        engine().move_forward(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 6.0, 10.0);
        assert_eq!(*agent.heading, 180.0);
    }

    #[test]
    fn clamped_to_environment() {
        let (mut store, _) = one_agent(pt(98.0, 50.0), 5.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        engine().move_forward(&mut agent, &MoveArgs::default()).unwrap().unwrap();
        assert_at(*agent.location, 100.0, 50.0);
    }

    #[test]
    fn bounds_keep_agent_inside() {
        let bounds = Geometry::Polygon(Polygon::rect(0.0, 0.0, 10.0, 10.0));
        let (mut store, _) = one_agent(pt(8.0, 5.0), 5.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = MoveArgs { bounds: Some(&bounds), ..MoveArgs::default() };
        let walked = engine().move_forward(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 10.0, 5.0);
        assert_at(walked.start().unwrap(), 8.0, 5.0);
        assert_at(walked.end().unwrap(), 10.0, 5.0);
    }

    #[test]
    fn bounds_picks_nearest_part() {
        let bounds = Geometry::MultiPolygon(vec![
            Polygon::rect(0.0, 0.0, 10.0, 10.0),
            Polygon::rect(11.0, 0.0, 20.0, 10.0),
        ]);
        let (mut store, _) = one_agent(pt(8.0, 5.0), 5.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = MoveArgs { bounds: Some(&bounds), ..MoveArgs::default() };
        engine().move_forward(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 13.0, 5.0);
    }

    #[test]
    fn line_bounds_are_rejected() {
        let bounds = Geometry::LineString(line(&[(0.0, 0.0), (10.0, 0.0)]));
        let (mut store, _) = one_agent(pt(8.0, 5.0), 5.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = MoveArgs { bounds: Some(&bounds), ..MoveArgs::default() };
        assert!(engine().move_forward(&mut agent, &args).unwrap().is_none());
        assert_eq!(*agent.status, Status::Failure);
        assert_eq!(*agent.location, pt(8.0, 5.0));
    }

    #[test]
    fn corrupt_bounds_abort_the_action() {
        let bow_tie = Geometry::Polygon(Polygon::new(
            vec![pt(0.0, 0.0), pt(10.0, 10.0), pt(10.0, 0.0), pt(0.0, 10.0)],
            vec![],
        ));
        let (mut store, _) = one_agent(pt(2.0, 5.0), 1.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = MoveArgs { bounds: Some(&bow_tie), ..MoveArgs::default() };
        let err = engine().move_forward(&mut agent, &args).unwrap_err();
        assert!(matches!(err, MoveError::GeometryFault(_)));
        assert_eq!(*agent.status, Status::Failure);
        assert_eq!(*agent.location, pt(2.0, 5.0));
    }

    #[test]
    fn destination_query_is_unclamped() {
        let (mut store, _) = one_agent(pt(98.0, 50.0), 5.0);
        let agent = store.agent_mut(AgentId(0)).unwrap();
        assert_at(engine().destination(&agent).unwrap(), 103.0, 50.0);
    }
}

// ── follow ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod follow {
    use super::*;
    use mv_core::{AgentId, Status};
    use mv_spatial::Path;
    use crate::FollowArgs;

    #[test]
    fn missing_path_fails() {
        let (mut store, _) = one_agent(pt(0.0, 0.0), 1.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        assert!(engine().follow(&mut agent, &FollowArgs::default()).unwrap().is_none());
        assert_eq!(*agent.status, Status::Failure);
    }

    #[test]
    fn edgeless_path_fails() {
        let empty = Path::new(pt(0.0, 0.0), pt(5.0, 0.0), vec![]);
        let (mut store, _) = one_agent(pt(0.0, 0.0), 1.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = FollowArgs { path: Some(&empty), ..FollowArgs::default() };
        assert!(engine().follow(&mut agent, &args).unwrap().is_none());
    }

    #[test]
    fn resumes_across_calls() {
        let path = Path::along(line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));
        let (mut store, _) = one_agent(pt(0.0, 0.0), 4.0);
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = FollowArgs { path: Some(&path), ..FollowArgs::default() };

        e.follow(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 4.0, 0.0);
        assert!(approx(*agent.heading, 0.0));

        e.follow(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 8.0, 0.0);

        let walked = e.follow(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 10.0, 2.0);
        assert!(approx(walked.length(), 4.0));
        assert!(approx(*agent.heading, 90.0));
    }

    #[test]
    fn path_leaving_environment_is_clamped() {
        let path = Path::along(line(&[(90.0, 50.0), (120.0, 50.0)]));
        let (mut store, _) = one_agent(pt(90.0, 50.0), 20.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = FollowArgs { path: Some(&path), ..FollowArgs::default() };
        let walked = engine().follow(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 100.0, 50.0);
        assert_eq!(walked.end(), Some(*agent.location));
    }
}

// ── goto ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod goto {
    use super::*;
    use mv_core::{AgentId, Status};
    use mv_geom::{Geometry, Shape};
    use mv_spatial::Extent;
    use crate::{GotoArgs, On, RegionTopology};

    #[test]
    fn reaches_target_in_open_space() {
        let (mut store, _) = one_agent(pt(0.0, 0.0), 5.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let walked = engine().goto(&mut agent, &GotoArgs::to(pt(3.0, 4.0))).unwrap().unwrap();
        assert_at(*agent.location, 3.0, 4.0);
        assert_eq!(*agent.status, Status::Success);
        assert!(approx(walked.length(), 5.0));
    }

    #[test]
    fn cached_path_is_reused() {
        let (mut store, _) = one_agent(pt(0.0, 0.0), 3.0);
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoArgs::to(pt(10.0, 0.0));

        e.goto(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 3.0, 0.0);
        let first = Arc::clone(agent.current_path.as_ref().unwrap());

        e.goto(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 6.0, 0.0);
        assert!(Arc::ptr_eq(&first, agent.current_path.as_ref().unwrap()));
    }

    #[test]
    fn new_target_replaces_path() {
        let (mut store, _) = one_agent(pt(0.0, 0.0), 3.0);
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        e.goto(&mut agent, &GotoArgs::to(pt(10.0, 0.0))).unwrap();
        let first = Arc::clone(agent.current_path.as_ref().unwrap());
        e.goto(&mut agent, &GotoArgs::to(pt(3.0, 10.0))).unwrap();
        assert!(!Arc::ptr_eq(&first, agent.current_path.as_ref().unwrap()));
        assert_at(*agent.location, 3.0, 3.0);
    }

    #[test]
    fn network_budget_carries_across_edges() {
        let on = On::Graph(Arc::new(NetworkGraph::from_lines(&two_legs(), false)));
        let (mut store, _) = one_agent(pt(0.0, 0.0), 7.0);
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoArgs { target: Some(pt(5.0, 5.0)), on: Some(&on), ..GotoArgs::default() };

        let walked = e.goto(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 5.0, 2.0);
        assert_eq!(agent.cursor.unwrap().edge, 1);
        assert_eq!(walked.segments.len(), 2);
        assert!(walked.edges.iter().all(Option::is_some));
        assert_ne!(walked.edges[0], walked.edges[1], "one segment per network edge");

        e.goto(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 5.0, 5.0);
    }

    #[test]
    fn region_with_collinear_walls_is_crossed() {
        let u = Polygon::new(
            vec![
                pt(0.0, 0.0), pt(3.0, 0.0), pt(6.0, 0.0), pt(9.0, 0.0), pt(9.0, 9.0), pt(6.0, 9.0),
                pt(6.0, 3.0), pt(3.0, 3.0), pt(3.0, 9.0), pt(0.0, 9.0), pt(0.0, 6.0), pt(0.0, 3.0),
            ],
            vec![],
        );
        let room = RegionTopology::new(u, Extent::new(100.0, 100.0)).unwrap();
        let e = MovementEngine::with_topology(DijkstraRouter, MoveConfig::with_env(100.0, 100.0), Arc::new(room))
            .unwrap();
        let (mut store, _) = one_agent(pt(1.5, 8.0), 100.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        e.goto(&mut agent, &GotoArgs::to(pt(7.5, 8.0))).unwrap().unwrap();
        assert_at(*agent.location, 7.5, 8.0);
        assert_eq!(*agent.status, Status::Success);
    }

    #[test]
    fn unreachable_target_leaves_agent_in_place() {
        let lines = [line(&[(0.0, 0.0), (5.0, 0.0)]), line(&[(20.0, 20.0), (25.0, 20.0)])];
        let on = On::Graph(Arc::new(NetworkGraph::from_lines(&lines, false)));
        let (mut store, _) = one_agent(pt(0.0, 0.0), 7.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoArgs { target: Some(pt(25.0, 20.0)), on: Some(&on), ..GotoArgs::default() };
        assert!(engine().goto(&mut agent, &args).unwrap().is_none());
        assert_eq!(*agent.status, Status::Failure);
        assert_eq!(*agent.location, pt(0.0, 0.0));
    }

    #[test]
    fn missing_target_fails() {
        let (mut store, _) = one_agent(pt(0.0, 0.0), 1.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        assert!(engine().goto(&mut agent, &GotoArgs::default()).unwrap().is_none());
        assert_eq!(*agent.status, Status::Failure);
    }

    #[test]
    fn point_shape_fails_gracefully() {
        let on = On::Shape(Arc::new(Shape::new(Geometry::Point(pt(1.0, 1.0)))));
        let (mut store, _) = one_agent(pt(0.0, 0.0), 1.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoArgs { target: Some(pt(1.0, 1.0)), on: Some(&on), ..GotoArgs::default() };
        assert!(engine().goto(&mut agent, &args).unwrap().is_none());
        assert_eq!(*agent.status, Status::Failure);
    }

    #[test]
    fn region_shape_routes_around_the_notch() {
        let on = On::Shape(Arc::new(Shape::new(Geometry::Polygon(l_room()))));
        let (mut store, _) = one_agent(pt(8.0, 2.0), 100.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoArgs { target: Some(pt(2.0, 8.0)), on: Some(&on), ..GotoArgs::default() };
        engine().goto(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 2.0, 8.0);
    }

    #[test]
    fn already_there_is_a_success() {
        let (mut store, _) = one_agent(pt(4.0, 4.0), 1.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let walked = engine().goto(&mut agent, &GotoArgs::to(pt(4.0, 4.0))).unwrap().unwrap();
        assert_eq!(*agent.status, Status::Success);
        assert_eq!(walked.length(), 0.0);
    }
}

// ── goto_inside ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod goto_inside {
    use super::*;
    use mv_core::{AgentId, Status};
    use mv_geom::{Geometry, Shape};
    use mv_spatial::Grid;
    use crate::{GotoInsideArgs, Region};

    #[test]
    fn polygon_steps_over_grid_cells() {
        let room = Shape::new(Geometry::Polygon(Polygon::rect(0.0, 0.0, 10.0, 10.0)));
        let (mut store, _) = one_agent(pt(0.5, 0.5), 2.0);
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(5.5, 0.5), Region::of(&room).unwrap());

        e.goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 2.5, 0.5);
        e.goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 4.5, 0.5);
        e.goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 5.5, 0.5);
        assert_eq!(e.cache().len(), 1);
    }

    #[test]
    fn polygon_triangulation_reaches_target() {
        let room = Shape::new(Geometry::Polygon(l_room()));
        let (mut store, _) = one_agent(pt(8.0, 2.0), 100.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs { triangulation: Some(true), ..GotoInsideArgs::new(pt(2.0, 8.0), Region::of(&room).unwrap()) };
        engine().goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 2.0, 8.0);
    }

    #[test]
    fn triangulation_steps_stay_inside() {
        let polygon = l_room();
        let room = Shape::new(Geometry::Polygon(polygon.clone()));
        let (mut store, _) = one_agent(pt(8.0, 2.0), 1.5);
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs { triangulation: Some(true), ..GotoInsideArgs::new(pt(2.0, 8.0), Region::of(&room).unwrap()) };
        for _ in 0..30 {
            e.goto_inside(&mut agent, &args).unwrap().unwrap();
            assert!(polygon.contains(*agent.location), "left the room at {}", agent.location);
        }
        assert_at(*agent.location, 2.0, 8.0);
    }

    #[test]
    fn line_string_walks_along() {
        let road = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let (mut store, _) = one_agent(pt(1.0, 0.0), 3.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(9.0, 0.0), Region::LineString(&road));
        engine().goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 4.0, 0.0);
    }

    #[test]
    fn line_string_far_from_agent_fails() {
        let road = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let (mut store, _) = one_agent(pt(1.0, 1.0), 3.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(9.0, 0.0), Region::LineString(&road));
        assert!(engine().goto_inside(&mut agent, &args).unwrap().is_none());
        assert_eq!(*agent.status, Status::Failure);
        assert_eq!(*agent.location, pt(1.0, 1.0));
    }

    #[test]
    fn multi_line_string_routes_over_network() {
        let roads = Shape::new(Geometry::MultiLineString(two_legs().to_vec()));
        let (mut store, _) = one_agent(pt(0.0, 0.0), 7.0);
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(5.0, 5.0), Region::of(&roads).unwrap());

        e.goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 5.0, 2.0);
        assert_eq!(agent.cursor.unwrap().edge, 1);

        e.goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 5.0, 5.0);
    }

    #[test]
    fn graph_region_reuses_path() {
        let graph = Arc::new(NetworkGraph::from_lines(&two_legs(), false));
        let (mut store, _) = one_agent(pt(0.0, 0.0), 3.0);
        let e = engine();
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(5.0, 5.0), Region::Graph(&graph));

        e.goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 3.0, 0.0);
        let first = Arc::clone(agent.current_path.as_ref().unwrap());
        e.goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 5.0, 1.0);
        assert!(Arc::ptr_eq(&first, agent.current_path.as_ref().unwrap()));
    }

    #[test]
    fn precomputed_grid_is_used_directly() {
        let grid = Grid::open(10, 10, 1.0).unwrap();
        let (mut store, _) = one_agent(pt(0.5, 0.5), 3.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(0.5, 5.5), Region::Grid(&grid));
        engine().goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 0.5, 3.5);
    }

    #[test]
    fn target_at_location_is_a_no_op() {
        let road = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let (mut store, _) = one_agent(pt(20.0, 20.0), 3.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(20.0, 20.0), Region::LineString(&road));
        assert!(engine().goto_inside(&mut agent, &args).unwrap().is_some());
        assert_eq!(*agent.status, Status::Success);
        assert_eq!(*agent.location, pt(20.0, 20.0));
    }

    #[test]
    fn no_polygon_holds_both_ends() {
        let rooms = Shape::new(Geometry::MultiPolygon(vec![
            Polygon::rect(0.0, 0.0, 10.0, 10.0),
            Polygon::rect(20.0, 0.0, 30.0, 10.0),
        ]));
        let (mut store, _) = one_agent(pt(5.0, 5.0), 3.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(25.0, 5.0), Region::of(&rooms).unwrap());
        assert!(engine().goto_inside(&mut agent, &args).unwrap().is_none());
        assert_eq!(*agent.location, pt(5.0, 5.0));
    }

    #[test]
    fn second_polygon_part_is_used() {
        let rooms = Shape::new(Geometry::MultiPolygon(vec![
            Polygon::rect(0.0, 0.0, 10.0, 10.0),
            Polygon::rect(20.0, 0.0, 30.0, 10.0),
        ]));
        let (mut store, _) = one_agent(pt(20.5, 0.5), 100.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs::new(pt(25.5, 0.5), Region::of(&rooms).unwrap());
        engine().goto_inside(&mut agent, &args).unwrap().unwrap();
        assert_at(*agent.location, 25.5, 0.5);
    }

    #[test]
    fn non_positive_cell_size_fails() {
        let room = Shape::new(Geometry::Polygon(Polygon::rect(0.0, 0.0, 10.0, 10.0)));
        let (mut store, _) = one_agent(pt(0.5, 0.5), 2.0);
        let mut agent = store.agent_mut(AgentId(0)).unwrap();
        let args = GotoInsideArgs { cell_size: Some(0.0), ..GotoInsideArgs::new(pt(5.5, 0.5), Region::of(&room).unwrap()) };
        assert!(engine().goto_inside(&mut agent, &args).unwrap().is_none());
        assert_eq!(*agent.status, Status::Failure);
    }

    #[test]
    fn point_has_no_region() {
        let spot = Shape::new(Geometry::Point(pt(1.0, 1.0)));
        assert!(Region::of(&spot).is_none());
    }
}

// ── GeometryCache ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use super::*;
    use mv_core::ShapeId;
    use mv_spatial::Extent;
    use crate::GeometryCache;

    const EXT: Extent = Extent::new(100.0, 100.0);

    #[test]
    fn builds_once_per_key() {
        let cache = GeometryCache::new();
        let room = Polygon::rect(0.0, 0.0, 10.0, 10.0);
        let a = cache.grid(ShapeId(1), 0, &room, 1.0, 10, EXT);
        let b = cache.grid(ShapeId(1), 0, &room, 1.0, 10, EXT);
        assert!(Arc::ptr_eq(&a, &b));
        let c = cache.grid(ShapeId(1), 0, &room, 2.0, 10, EXT);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn evict_drops_shape_entries() {
        let cache = GeometryCache::new();
        let room = Polygon::rect(0.0, 0.0, 10.0, 10.0);
        cache.grid(ShapeId(1), 0, &room, 1.0, 10, EXT);
        cache.corridor(ShapeId(1), 0, &room).unwrap();
        cache.network(ShapeId(2), &two_legs());
        assert_eq!(cache.len(), 3);

        cache.evict(ShapeId(1));
        assert_eq!(cache.len(), 1);
        cache.evict(ShapeId(2));
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_polygon_is_not_cached() {
        let cache = GeometryCache::new();
        let bow_tie = Polygon::new(vec![pt(0.0, 0.0), pt(10.0, 10.0), pt(10.0, 0.0), pt(0.0, 10.0)], vec![]);
        assert!(cache.corridor(ShapeId(3), 0, &bow_tie).is_err());
        assert!(cache.is_empty());
    }
}

// ── Parallel stepping ─────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parallel"))]
mod parallel {
    use super::*;
    use mv_core::Status;

    #[test]
    fn goto_all_moves_every_agent() {
        let starts: Vec<Point> = (0..16).map(|i| pt(i as f64, 0.0)).collect();
        let targets: Vec<Point> = (0..16).map(|i| pt(i as f64, 10.0)).collect();
        let (mut store, _) = AgentStoreBuilder::new(16, 0).speed(4.0).place(starts).build();
        let e = engine();

        let results = e.goto_all(&mut store, &targets, None);
        assert_eq!(results.len(), 16);
        assert!(results.iter().all(|r| matches!(r, Ok(Some(_)))));
        for (i, p) in store.location.iter().enumerate() {
            assert_at(*p, i as f64, 4.0);
        }

        e.goto_all(&mut store, &targets, Some(100.0));
        assert_eq!(store.location, targets);
        assert!(store.status.iter().all(|s| *s == Status::Success));
    }

    #[test]
    fn agents_without_target_are_untouched() {
        let (mut store, _) = AgentStoreBuilder::new(3, 0).place([pt(0.0, 0.0); 3]).build();
        let results = engine().goto_all(&mut store, &[pt(1.0, 0.0)], None);
        assert_eq!(results.len(), 1);
        assert_at(store.location[0], 1.0, 0.0);
        assert_eq!(store.status[2], Status::Idle);
    }
}
