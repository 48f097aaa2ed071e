//! Agent location type and planar helpers.
//!
//! `Point` carries an optional third coordinate (`z`) so that locations read
//! from 3-D environments survive a movement step, but every distance in the
//! engine is planar: `z` is interpolated, never measured.

use std::fmt;

/// Tolerance used for "same location" comparisons throughout the engine.
pub const EPSILON: f64 = 1e-9;

/// A mutable 2-D/3-D location in environment units.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    #[inline]
    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar Euclidean distance.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Squared planar distance, for nearest-candidate comparisons.
    #[inline]
    pub fn distance_2(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Linear interpolation: `t = 0` yields `self`, `t = 1` yields `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + t * (other.x - self.x),
            y: self.y + t * (other.y - self.y),
            z: self.z + t * (other.z - self.z),
        }
    }

    /// Move `distance` units along `heading_deg` (0° = +x, 90° = +y).
    pub fn offset(self, heading_deg: f64, distance: f64) -> Point {
        let rad = heading_deg.to_radians();
        Point {
            x: self.x + distance * rad.cos(),
            y: self.y + distance * rad.sin(),
            z: self.z,
        }
    }

    /// Component-wise clamp into `[0, width] × [0, height]`.
    #[inline]
    pub fn clamp_to(self, width: f64, height: f64) -> Point {
        Point {
            x: self.x.clamp(0.0, width),
            y: self.y.clamp(0.0, height),
            z: self.z,
        }
    }

    #[inline]
    pub fn approx_eq(self, other: Point) -> bool {
        self.distance_2(other) <= EPSILON * EPSILON
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Heading in degrees from `self` toward `other`, in `[0, 360)`.
    pub fn heading_to(self, other: Point) -> f64 {
        normalize_heading((other.y - self.y).atan2(other.x - self.x).to_degrees())
    }
}

/// Wrap any angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_heading(deg: f64) -> f64 {
    let h = deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if h >= 360.0 { 0.0 } else { h }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
