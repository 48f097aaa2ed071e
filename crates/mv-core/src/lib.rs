//! `mv-core` — foundational types for the `rust_move` agent movement engine.
//!
//! This crate is a dependency of every other `mv-*` crate.  It intentionally
//! has no `mv-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`/`toml`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `EdgeId`, `FaceId`, `PathId`, …    |
//! | [`point`]       | `Point` (agent location), heading helpers               |
//! | [`rng`]         | `AgentRng` (per-agent, injectable)                      |
//! | [`status`]      | `Status` — per-call success / failure signal            |
//! | [`config`]      | `MoveConfig`                                            |
//! | [`error`]       | `MoveError`, `MoveResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types   |
//! |         | and enables `MoveConfig::from_toml_str` / `from_file`.     |

pub mod config;
pub mod error;
pub mod ids;
pub mod point;
pub mod rng;
pub mod status;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::MoveConfig;
pub use error::{MoveError, MoveResult};
pub use ids::{AgentId, EdgeId, FaceId, NodeId, PathId, ShapeId, TopologyId};
pub use point::{Point, normalize_heading};
pub use rng::AgentRng;
pub use status::Status;
