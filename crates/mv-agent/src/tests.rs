//! Unit tests for mv-agent.

#[cfg(test)]
mod builder {
    use mv_core::{Point, Status};
    use crate::AgentStoreBuilder;

    #[test]
    fn correct_count() {
        let (store, rngs) = AgentStoreBuilder::new(500, 1).build();
        assert_eq!(store.count, 500);
        assert_eq!(rngs.len(), 500);
        assert_eq!(store.location.len(), 500);
        assert_eq!(store.cursor.len(), 500);
    }

    #[test]
    fn zero_agents() {
        let (store, rngs) = AgentStoreBuilder::new(0, 0).build();
        assert!(store.is_empty());
        assert!(rngs.is_empty());
    }

    #[test]
    fn defaults_applied() {
        let (store, _) = AgentStoreBuilder::new(2, 0).speed(3.0).heading(90.0).build();
        assert_eq!(store.speed, vec![3.0, 3.0]);
        assert_eq!(store.heading, vec![90.0, 90.0]);
        assert!(store.current_path.iter().all(Option::is_none));
        assert!(store.status.iter().all(|s| *s == Status::Idle));
    }

    #[test]
    fn place_pads_and_truncates() {
        let (store, _) = AgentStoreBuilder::new(2, 0)
            .place([Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)])
            .build();
        assert_eq!(store.location, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);

        let (store, _) = AgentStoreBuilder::new(2, 0).place([Point::new(1.0, 2.0)]).build();
        assert_eq!(store.location[1], Point::default());
    }
}

#[cfg(test)]
mod store {
    use std::sync::Arc;

    use mv_core::{AgentId, Point, Status};
    use mv_spatial::{Path, PathCursor};
    use crate::AgentStoreBuilder;

    #[test]
    fn agent_ids_iterator() {
        let (store, _) = AgentStoreBuilder::new(5, 0).build();
        let ids: Vec<AgentId> = store.agent_ids().collect();
        assert_eq!(ids, vec![AgentId(0), AgentId(1), AgentId(2), AgentId(3), AgentId(4)]);
    }

    #[test]
    fn agent_mut_writes_through() {
        let (mut store, _) = AgentStoreBuilder::new(3, 0).build();
        {
            let agent = store.agent_mut(AgentId(1)).unwrap();
            *agent.location = Point::new(7.0, 8.0);
            *agent.heading = 45.0;
            *agent.status = Status::Success;
        }
        assert_eq!(store.location[1], Point::new(7.0, 8.0));
        assert_eq!(store.heading[1], 45.0);
        assert_eq!(store.status[1], Status::Success);
        assert_eq!(store.location[0], Point::default());
    }

    #[test]
    fn agent_mut_out_of_range() {
        let (mut store, _) = AgentStoreBuilder::new(3, 0).build();
        assert!(store.agent_mut(AgentId(3)).is_none());
    }

    #[test]
    fn views_cover_every_agent() {
        let (mut store, _) = AgentStoreBuilder::new(4, 0).build();
        for view in store.views_mut() {
            *view.location = Point::new(view.id.0 as f64, 0.0);
        }
        assert_eq!(store.location[3], Point::new(3.0, 0.0));
    }

    #[test]
    fn cache_path_resets_foreign_cursor() {
        let (mut store, _) = AgentStoreBuilder::new(1, 0).build();
        let a = Arc::new(Path::straight(Point::new(0.0, 0.0), Point::new(1.0, 0.0)));
        let b = Arc::new(Path::straight(Point::new(0.0, 0.0), Point::new(2.0, 0.0)));
        let mut agent = store.agent_mut(AgentId(0)).unwrap();

        agent.cache_path(Arc::clone(&a));
        *agent.cursor = Some(PathCursor::start(&a));
        agent.cache_path(Arc::clone(&a));
        assert!(agent.cursor_for(&a).is_some(), "same path keeps its cursor");

        agent.cache_path(Arc::clone(&b));
        assert!(agent.cursor.is_none());
        assert!(agent.cursor_for(&b).is_none());
    }

    #[test]
    fn shared_path_keeps_cursors_apart() {
        let (mut store, _) = AgentStoreBuilder::new(2, 0).build();
        let shared = Arc::new(Path::straight(Point::new(0.0, 0.0), Point::new(1.0, 0.0)));
        for mut view in store.views_mut() {
            view.cache_path(Arc::clone(&shared));
        }
        store.cursor[0] = Some(PathCursor { path: shared.id, edge: 1, vertex: 0 });
        assert!(store.cursor[1].is_none());
        assert_eq!(Arc::strong_count(&shared), 3);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn par_views_cover_every_agent() {
        use rayon::prelude::*;
        let (mut store, _) = AgentStoreBuilder::new(64, 0).build();
        store.par_views_mut().for_each(|view| *view.heading = view.id.0 as f64);
        assert_eq!(store.heading[63], 63.0);
    }
}

#[cfg(test)]
mod rngs {
    use mv_core::AgentId;
    use crate::AgentStoreBuilder;

    #[test]
    fn per_agent_determinism() {
        let (_, mut rngs1) = AgentStoreBuilder::new(10, 999).build();
        let (_, mut rngs2) = AgentStoreBuilder::new(10, 999).build();
        for i in 0..10u32 {
            let a: f64 = rngs1.get_mut(AgentId(i)).gen_range(0.0..1.0);
            let b: f64 = rngs2.get_mut(AgentId(i)).gen_range(0.0..1.0);
            assert_eq!(a, b, "agent {i} RNG should be deterministic");
        }
    }

    #[test]
    fn different_seeds_differ() {
        let (_, mut rngs_a) = AgentStoreBuilder::new(1, 1).build();
        let (_, mut rngs_b) = AgentStoreBuilder::new(1, 2).build();
        let a: u64 = rngs_a.get_mut(AgentId(0)).gen_range(0..u64::MAX);
        let b: u64 = rngs_b.get_mut(AgentId(0)).gen_range(0..u64::MAX);
        assert_ne!(a, b);
    }

    #[test]
    fn adjacent_agents_differ() {
        let (_, mut rngs) = AgentStoreBuilder::new(2, 0).build();
        let a: u64 = rngs.get_mut(AgentId(0)).gen_range(0..u64::MAX);
        let b: u64 = rngs.get_mut(AgentId(1)).gen_range(0..u64::MAX);
        assert_ne!(a, b);
    }
}
