//! Fixed-Point 2D Vector
//!
//! Deterministic 2D vector operations for entity positions and sizes.
//! All operations use fixed-point arithmetic.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_ONE, FIXED_SCALE, fixed_clamp};

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16 fixed-point)
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
        }
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Half of each component (box size → center offset).
    #[inline]
    pub fn half(self) -> Self {
        Self {
            x: self.x >> 1,
            y: self.y >> 1,
        }
    }

    /// Squared distance to another point, widened to i64.
    ///
    /// The result is in Q32.32 raw units. Canvas-scale coordinates overflow
    /// a Q16.16 square, so comparisons against a radius go through here.
    #[inline]
    pub fn distance_squared_wide(self, other: Self) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }

    /// True if the distance to `other` is strictly below `radius`.
    #[inline]
    pub fn within_distance(self, other: Self, radius: Fixed) -> bool {
        let r = radius as i64;
        self.distance_squared_wide(other) < r * r
    }

    /// True if the distance to `other` is at most `radius`.
    #[inline]
    pub fn within_distance_inclusive(self, other: Self, radius: Fixed) -> bool {
        let r = radius as i64;
        self.distance_squared_wide(other) <= r * r
    }

    /// Clamp each component into `[min, max]`.
    #[inline]
    pub fn clamp_to_rect(self, min: Self, max: Self) -> Self {
        Self {
            x: fixed_clamp(self.x, min.x, max.x),
            y: fixed_clamp(self.y, min.y, max.y),
        }
    }

    /// Convert to float tuple for rendering.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (
            self.x as f32 / FIXED_ONE as f32,
            self.y as f32 / FIXED_ONE as f32,
        )
    }
}

// Operator overloads for ergonomics
impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        FixedVec2::add(self, rhs)
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        FixedVec2::sub(self, rhs)
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "Vec2({:.3}, {:.3})", fx, fy)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "({:.1}, {:.1})", fx, fy)
    }
}

// =============================================================================
// TESTS
// =============================================================================
