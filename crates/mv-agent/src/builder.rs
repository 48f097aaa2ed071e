//! Fluent builder for constructing `AgentStore` + `AgentRngs` in one step.
//!
//! # Usage
//!
//! ```rust
//! use mv_core::Point;
//! use mv_agent::AgentStoreBuilder;
//!
//! let (store, rngs) = AgentStoreBuilder::new(3, /*seed=*/ 42)
//!     .speed(1.5)
//!     .place([Point::new(1.0, 1.0), Point::new(2.0, 2.0)])
//!     .build();
//!
//! assert_eq!(store.count, 3);
//! assert_eq!(rngs.len(),  3);
//! assert_eq!(store.location[1], Point::new(2.0, 2.0));
//! assert_eq!(store.location[2], Point::default());
//! ```

use mv_core::Point;

use crate::{AgentRngs, AgentStore};

/// Fluent builder for [`AgentStore`] + [`AgentRngs`].
pub struct AgentStoreBuilder {
    count:     usize,
    seed:      u64,
    speed:     f64,
    heading:   f64,
    locations: Vec<Point>,
}

impl AgentStoreBuilder {
    /// Create a builder for `count` agents using `seed` as the global RNG seed.
    pub fn new(count: usize, seed: u64) -> Self {
        Self { count, seed, speed: 1.0, heading: 0.0, locations: Vec::new() }
    }

    /// Persisted speed every agent starts with (default `1.0`).
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Heading in degrees every agent starts with (default `0.0`).
    pub fn heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    /// Initial locations for agents `0, 1, …`.  Agents without one start at
    /// the origin; extra locations are ignored.
    pub fn place(mut self, locations: impl IntoIterator<Item = Point>) -> Self {
        self.locations = locations.into_iter().take(self.count).collect();
        self
    }

    /// Construct `AgentStore` and `AgentRngs`.
    pub fn build(mut self) -> (AgentStore, AgentRngs) {
        self.locations.resize(self.count, Point::default());
        let store = AgentStore::new(self.count, self.locations, self.heading, self.speed);
        let rngs = AgentRngs::new(self.count, self.seed);
        (store, rngs)
    }
}
