//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into SoA `Vec`s via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID": `<inner>::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

/// Generate a process-wide `fresh()` allocator for an ID whose values must be
/// unique across independently built objects (paths, shapes, topologies).
macro_rules! fresh_id {
    ($name:ident, $counter:ident) => {
        static $counter: AtomicU32 = AtomicU32::new(0);

        impl $name {
            /// Allocate a new, never-before-issued ID.
            pub fn fresh() -> Self {
                $name($counter.fetch_add(1, Ordering::Relaxed))
            }
        }
    };
}

typed_id! {
    /// Index of an agent in SoA storage.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a network-graph vertex.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed graph edge (network segment or corridor portal).
    pub struct EdgeId(u32);
}

typed_id! {
    /// Index of a triangle face in a corridor graph.
    pub struct FaceId(u32);
}

typed_id! {
    /// Identity of a computed path.  A path cursor is only valid for the
    /// path whose id it records.
    pub struct PathId(u32);
}

typed_id! {
    /// Identity of a governing geometry, used as the lazy-cache key for the
    /// grids and graphs built from it.
    pub struct ShapeId(u32);
}

typed_id! {
    /// Identity of a topology instance.
    pub struct TopologyId(u32);
}

fresh_id!(PathId, NEXT_PATH_ID);
fresh_id!(ShapeId, NEXT_SHAPE_ID);
fresh_id!(TopologyId, NEXT_TOPOLOGY_ID);
