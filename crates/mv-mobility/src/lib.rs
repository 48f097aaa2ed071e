//! `mv-mobility` — the movement actions and the topologies they run over.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                           |
//! |--------------|--------------------------------------------------------------------|
//! | [`topology`] | `Topology` trait, `ContinuousTopology`, `GraphTopology`, `RegionTopology` |
//! | [`select`]   | `On`, speed / heading / target resolution                          |
//! | [`args`]     | Per-action argument structs                                        |
//! | [`region`]   | `Region` — governing geometry of `goto_inside`                     |
//! | [`cache`]    | `GeometryCache` — lazily built grids, corridors, networks          |
//! | [`engine`]   | `MovementEngine<R>` — wander / move / follow / goto / goto_inside  |
//!
//! # Outcome model
//!
//! Every action writes a [`Status`][mv_core::Status] on the agent and
//! returns `MoveResult<Option<TraveledPath>>`:
//!
//! * `Ok(Some(path))`: the action succeeded; `path` is what was walked.
//! * `Ok(None)`: the action failed in a recoverable way (bad argument,
//!   unreachable target, exhausted grid search).  The agent did not move.
//! * `Err(MoveError::GeometryFault(_))`: a geometry was corrupt even after
//!   one repair attempt.  Only the current action is aborted.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Adds `MovementEngine::goto_all` (Rayon).               |
//! | `serde`    | Propagates `Serialize`/`Deserialize` to value types.   |

pub mod args;
pub mod cache;
pub mod engine;
pub mod region;
pub mod select;
pub mod topology;

#[cfg(test)]
mod tests;

pub use args::{FollowArgs, GotoArgs, GotoInsideArgs, MoveArgs, WanderArgs};
pub use cache::GeometryCache;
pub use engine::MovementEngine;
pub use region::Region;
pub use select::On;
pub use topology::{ContinuousTopology, GraphTopology, RegionTopology, Topology};
