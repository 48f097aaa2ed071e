//! `mv-agent` — Structure-of-Arrays agent storage for the `rust_move` engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`store`]   | `AgentStore` (SoA arrays), `AgentMut` view, `AgentRngs`     |
//! | [`builder`] | `AgentStoreBuilder` (fluent construction)                   |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Adds `AgentStore::par_views_mut` (Rayon).                  |
//! | `serde`    | Propagates `Serialize`/`Deserialize` to the value types.   |

pub mod builder;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::AgentStoreBuilder;
pub use store::{AgentMut, AgentRngs, AgentStore};
