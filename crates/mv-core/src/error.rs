//! Engine error taxonomy.
//!
//! Sub-crates define their own error enums (`GeomError`, `SpatialError`) and
//! convert them into `MoveError` via `From` impls so that movement actions
//! have a single error type to classify.
//!
//! Only [`MoveError::GeometryFault`] is fatal to a movement action; the other
//! movement categories are absorbed by the engine, which records a failure
//! status instead of propagating them.

use thiserror::Error;


/// The top-level error type for `mv-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum MoveError {
    /// Missing or mistyped `target`, `bounds`, `path` or `on` argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The topology or graph yields no destination or no path.
    #[error("target is unreachable")]
    Unreachable,

    /// An invalid or self-intersecting geometry broke a spatial query.
    #[error("geometry fault: {0}")]
    GeometryFault(String),

    /// Wavefront propagation hit its `rows + cols` round bound.
    #[error("wavefront propagation exhausted after {rounds} rounds")]
    Exhausted { rounds: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MoveError {
    /// `true` for errors a movement action must propagate to its caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MoveError::GeometryFault(_))
    }
}

/// Shorthand result type for all `mv-*` crates.
pub type MoveResult<T> = Result<T, MoveError>;
