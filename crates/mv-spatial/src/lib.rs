//! `mv-spatial` — paths, line following, and the three pathfinders.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`path`]     | `Path`, `PathEdge`, `PathOwner`, `GraphRef`, `TraveledPath`      |
//! | [`cursor`]   | `PathCursor` — per-agent resumable progress on a path            |
//! | [`follow`]   | LineFollower `advance`, `follow_path`, `Walk`, `Extent`          |
//! | [`router`]   | `WeightedCsr`, `Router` trait, `Route`, `DijkstraRouter`         |
//! | [`grid`]     | `Grid`, `IntPoint`, `discretize`, `find_path`, `step_along`      |
//! | [`corridor`] | `CorridorGraph` — triangulation face-adjacency routing           |
//! | [`network`]  | `NetworkGraph` (CSR + R-tree), `NetworkGraphBuilder`, `advance`  |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                               |
//!
//! Graphs and grids are immutable once built and are shared behind `Arc`s;
//! all traversal state is returned to the caller as a [`PathCursor`].
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on grid and cursor types.  |

pub mod corridor;
pub mod cursor;
pub mod error;
pub mod follow;
pub mod grid;
pub mod network;
pub mod path;
pub mod router;


pub use corridor::CorridorGraph;
pub use cursor::PathCursor;
pub use error::{SpatialError, SpatialResult};
pub use follow::{Extent, Walk, follow_path};
pub use grid::{Cell, Grid, IntPoint, discretize, find_path, step_along};
pub use network::{NetworkGraph, NetworkGraphBuilder};
pub use path::{GraphRef, Path, PathEdge, PathOwner, TraveledPath};
pub use router::{DijkstraRouter, Route, Router, WeightedCsr};
