//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the simulation tick.
//! All operations inside the tick loop use integer arithmetic only.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Canvas coordinates (a few hundred units) fit comfortably. Their squares
//! do not, so squared distances are widened to `i64` in [`super::vec2`].

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// CONVERSIONS
// =============================================================================

/// Convert a float to fixed-point.
///
/// # Warning
/// Only use at compile-time or when compiling a config. NEVER in tick loop.
///
/// # Example
/// ```
/// use island_raid::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for display/rendering.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Convert fixed-point to f64 (map generation and reporting only).
#[inline]
pub fn to_f64(f: Fixed) -> f64 {
    f as f64 / FIXED_ONE as f64
}

/// Create a fixed-point value from an integer.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Multiply two fixed-point numbers.
///
/// Uses i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Floor of `a / b` as an integer.
///
/// Rounds toward negative infinity, so a coordinate just left of the origin
/// lands in cell -1 rather than cell 0. Returns 0 for `b <= 0`.
#[inline]
pub fn fixed_floor_div(a: Fixed, b: Fixed) -> i32 {
    if b <= 0 {
        return 0;
    }
    a.div_euclid(b)
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    value.max(min).min(max)
}

// =============================================================================
// TESTS
// =============================================================================
