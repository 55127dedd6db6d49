//! Plane geometry for rendered positions.

use std::f64::consts::FRAC_PI_2;

/// Distance under which two positions count as the same point.
pub const POSITION_EPSILON: f64 = 1e-6;

/// A point (or offset) in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// Horizontal coordinate, growing to the right.
    pub x: f64,
    /// Vertical coordinate, growing downwards.
    pub y: f64,
}

impl Vec2 {
    /// The canvas origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Build a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert an integer grid position as carried by actor records.
    pub fn from_grid((x, y): (i32, i32)) -> Self {
        Self::new(f64::from(x), f64::from(y))
    }

    /// Linear interpolation: `self` at `t = 0`, `other` at `t = 1`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Whether `other` lies within [`POSITION_EPSILON`] of `self`.
    pub fn approx_eq(self, other: Self) -> bool {
        self.distance(other) <= POSITION_EPSILON
    }

    /// Sprite rotation, in radians, for travel from `self` towards `other`.
    ///
    /// The sprite artwork faces up, so a quarter turn is added to the
    /// direction angle.
    pub fn heading_to(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x) + FRAC_PI_2
    }
}
