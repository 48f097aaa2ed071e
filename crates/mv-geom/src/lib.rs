//! `mv-geom` — the planar geometry the movement engine runs over.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`segment`]     | `Segment` — nearest point, intersection, disk/box clipping    |
//! | [`line`]        | `LineString`                                                  |
//! | [`polygon`]     | `Polygon` — containment, square coverage, validation, repair  |
//! | [`geometry`]    | `Geometry` tagged variant, `Shape` (geometry + cache id)      |
//! | [`triangulate`] | `Triangle`, ear-clipping `triangulate` (holes bridged)        |
//! | [`reach`]       | `project_into_reach` — nearest point of disk ∩ bounds         |
//! | [`error`]       | `GeomError`, `GeomResult<T>`                                  |
//!
//! All queries are planar; `z` coordinates ride along untouched.

pub mod error;
pub mod geometry;
pub mod line;
pub mod polygon;
pub mod reach;
pub mod segment;
pub mod triangulate;


pub use error::{GeomError, GeomResult};
pub use geometry::{Geometry, Shape};
pub use line::LineString;
pub use polygon::Polygon;
pub use reach::project_into_reach;
pub use segment::Segment;
pub use triangulate::{Triangle, triangulate};
